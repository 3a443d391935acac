use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::DietError;
use crate::handlers::{FieldChange, FormSession, FormView};

#[derive(Debug, Deserialize)]
pub struct AddIngredient {
    pub ingredient: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    view: FormView,
}

pub fn create_form_router(session: Arc<FormSession>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/form", get(get_form))
        .route("/form/profile", post(update_profile))
        .route("/form/ingredients", post(add_ingredient))
        .route("/form/ingredients/:name", delete(remove_ingredient))
        .route("/form/generate", post(generate_diet))
        .with_state(session)
}

async fn get_form(State(session): State<Arc<FormSession>>) -> Json<FormView> {
    Json(session.view().await)
}

async fn update_profile(
    State(session): State<Arc<FormSession>>,
    Json(change): Json<FieldChange>,
) -> Json<FormView> {
    log::debug!("📝 Field change: {:?}", change);
    Json(session.apply(change).await)
}

async fn add_ingredient(
    State(session): State<Arc<FormSession>>,
    Json(body): Json<AddIngredient>,
) -> Json<FormView> {
    Json(session.add_ingredient(&body.ingredient).await)
}

async fn remove_ingredient(
    State(session): State<Arc<FormSession>>,
    Path(name): Path<String>,
) -> Json<FormView> {
    Json(session.remove_ingredient(&name).await)
}

async fn generate_diet(State(session): State<Arc<FormSession>>) -> Response {
    log::info!("🔔 Diet generation requested");
    match session.generate().await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err((err, view)) => {
            let status = status_for(&err);
            log::warn!("⚠️ Diet generation failed ({}): {}", status, err);
            let body = ErrorBody { error: err.to_string(), view };
            (status, Json(body)).into_response()
        }
    }
}

fn status_for(err: &DietError) -> StatusCode {
    match err {
        DietError::EmptyIngredientList
        | DietError::MissingActivityLevel
        | DietError::IncompleteProfile => StatusCode::UNPROCESSABLE_ENTITY,
        DietError::AlreadyGenerating => StatusCode::CONFLICT,
        DietError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        DietError::Network(_) | DietError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn root_handler() -> &'static str {
    "Dieta Generator - Use /form to drive the diet form"
}

async fn health_check() -> &'static str {
    "OK"
}
