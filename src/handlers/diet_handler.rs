use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::DietError;
use crate::models::{ActivityLevel, DerivedMetrics, DietSuggestion, IngredientList};
use crate::services::prompt::{build_diet_request, CompletionSettings};
use crate::services::CompletionService;

/// Validates the form snapshot and sends a single diet request at a time.
pub struct DietDispatcher {
    completion: Arc<dyn CompletionService>,
    settings: CompletionSettings,
    in_flight: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

/// Clears the in-flight flag on every exit path, unwinding included.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DietDispatcher {
    pub fn new(completion: Arc<dyn CompletionService>, settings: CompletionSettings) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            completion,
            settings,
            in_flight: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// True while a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Aborts the request in flight (if any) and rejects later ones.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub async fn generate_diet(
        &self,
        ingredients: &IngredientList,
        activity_level: Option<ActivityLevel>,
        metrics: &DerivedMetrics,
    ) -> Result<DietSuggestion, DietError> {
        if ingredients.is_empty() {
            return Err(DietError::EmptyIngredientList);
        }
        if activity_level.is_none() {
            return Err(DietError::MissingActivityLevel);
        }
        let daily_kcal = match metrics.daily_kcal() {
            Some(kcal) if metrics.is_complete() => kcal,
            _ => return Err(DietError::IncompleteProfile),
        };

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let stopped = *shutdown_rx.borrow();
        if stopped {
            return Err(DietError::Cancelled);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("⚠️ Diet generation already in flight, rejecting new trigger");
            return Err(DietError::AlreadyGenerating);
        }
        let _guard = InFlightGuard(&self.in_flight);

        log::info!(
            "🥗 Generating diet: {} ingredients, {} kcal target ({})",
            ingredients.len(),
            daily_kcal,
            activity_level.map(|l| l.to_string()).unwrap_or_default()
        );
        let request = build_diet_request(&self.settings, ingredients, daily_kcal);

        let content = tokio::select! {
            result = self.completion.complete(&request) => result,
            _ = shutdown_rx.wait_for(|stopped| *stopped) => {
                log::warn!("🛑 Diet generation cancelled by shutdown");
                return Err(DietError::Cancelled);
            }
        };

        match content {
            Ok(content) => {
                log::info!("✅ Diet suggestion received");
                Ok(DietSuggestion {
                    content: content.trim().to_string(),
                    generated_at: Utc::now(),
                })
            }
            Err(e) => {
                log::error!("❌ Diet generation failed: {}", e);
                Err(e.into())
            }
        }
    }
}
