use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::DietError;
use crate::handlers::DietDispatcher;
use crate::models::{
    parse_decimal, ActivityLevel, BiologicalSex, DerivedMetrics, DietSuggestion, FormState,
    IngredientList,
};
use crate::services::compute_metrics;

/// A single edit coming from the form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldChange {
    BiologicalSex(Option<BiologicalSex>),
    Weight(String),
    Height(String),
    Age(String),
    ActivityLevel(String),
}

/// What the form renders after each event.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub metrics: DerivedMetrics,
    pub ingredients: IngredientList,
    pub loading: bool,
    pub suggestion: Option<DietSuggestion>,
    pub error: Option<String>,
}

/// Owns the only mutable copy of the form state.
///
/// The lock is never held across the completion request, so edits and
/// renders stay responsive while a diet is being generated.
pub struct FormSession {
    state: RwLock<FormState>,
    dispatcher: Arc<DietDispatcher>,
}

impl FormSession {
    pub fn new(dispatcher: Arc<DietDispatcher>) -> Self {
        Self {
            state: RwLock::new(FormState::default()),
            dispatcher,
        }
    }

    pub async fn view(&self) -> FormView {
        let state = self.state.read().await;
        self.render(&state)
    }

    /// Applies one field edit and recomputes the metrics from scratch.
    pub async fn apply(&self, change: FieldChange) -> FormView {
        let mut state = self.state.write().await;
        let profile = &mut state.profile;
        match change {
            FieldChange::BiologicalSex(sex) => profile.biological_sex = sex,
            FieldChange::Weight(raw) => profile.weight_kg = parse_decimal(&raw),
            FieldChange::Height(raw) => profile.height_cm = parse_decimal(&raw),
            FieldChange::Age(raw) => profile.age_years = parse_decimal(&raw),
            FieldChange::ActivityLevel(raw) => profile.activity_level = ActivityLevel::from_string(&raw),
        }
        state.metrics = compute_metrics(&state.profile);
        log::debug!(
            "📝 Profile updated: BMR {:?} kcal, NDC {:?} kcal",
            state.metrics.basal_kcal(),
            state.metrics.daily_kcal()
        );
        self.render(&state)
    }

    pub async fn add_ingredient(&self, raw: &str) -> FormView {
        let mut state = self.state.write().await;
        state.ingredients = std::mem::take(&mut state.ingredients).added(raw);
        self.render(&state)
    }

    pub async fn remove_ingredient(&self, value: &str) -> FormView {
        let mut state = self.state.write().await;
        state.ingredients = std::mem::take(&mut state.ingredients).removed(value);
        self.render(&state)
    }

    /// Runs one generation attempt against a snapshot of the current state.
    ///
    /// Success stores the suggestion; a failure clears it and records the
    /// user-facing message. Cancelled or rejected attempts leave state alone.
    pub async fn generate(&self) -> Result<FormView, (DietError, FormView)> {
        let (ingredients, activity_level, metrics) = {
            let state = self.state.read().await;
            (state.ingredients.clone(), state.profile.activity_level, state.metrics)
        };

        let result = self
            .dispatcher
            .generate_diet(&ingredients, activity_level, &metrics)
            .await;

        let mut state = self.state.write().await;
        match result {
            Ok(suggestion) => {
                state.suggestion = Some(suggestion);
                state.last_error = None;
                Ok(self.render(&state))
            }
            Err(err @ (DietError::Cancelled | DietError::AlreadyGenerating)) => {
                Err((err, self.render(&state)))
            }
            Err(err) => {
                if !err.is_precondition() {
                    state.suggestion = None;
                }
                state.last_error = Some(err.to_string());
                Err((err, self.render(&state)))
            }
        }
    }

    fn render(&self, state: &FormState) -> FormView {
        FormView {
            metrics: state.metrics,
            ingredients: state.ingredients.clone(),
            loading: self.dispatcher.is_loading(),
            suggestion: state.suggestion.clone(),
            error: state.last_error.clone(),
        }
    }
}
