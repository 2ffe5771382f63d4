//! Axum route handlers for the questionnaire wizard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::questionnaire::answers::Field;
use crate::questionnaire::wizard::{Wizard, WizardView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub location: String,
    pub query: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/wizard
///
/// Mounts a fresh questionnaire at step 1 with default answers.
pub async fn handle_create_wizard(
    State(state): State<AppState>,
) -> (StatusCode, Json<WizardView>) {
    let view = state.wizards.create();
    info!("Wizard {} created", view.id);
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/wizard/:id
pub async fn handle_get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    state
        .wizards
        .get(id)
        .map(Json)
        .ok_or_else(|| wizard_not_found(id))
}

/// DELETE /api/v1/wizard/:id
pub async fn handle_discard_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.wizards.discard(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(wizard_not_found(id))
    }
}

/// POST /api/v1/wizard/:id/next
///
/// 409 when already at the final step.
pub async fn handle_next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    update(&state, id, |wizard| {
        wizard.advance()?;
        Ok(wizard.view())
    })
}

/// POST /api/v1/wizard/:id/previous
///
/// 409 when already at the first step.
pub async fn handle_previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    update(&state, id, |wizard| {
        wizard.retreat()?;
        Ok(wizard.view())
    })
}

/// PATCH /api/v1/wizard/:id/answers
pub async fn handle_set_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetFieldRequest>,
) -> Result<Json<WizardView>, AppError> {
    update(&state, id, |wizard| {
        wizard.set_field(request.field, &request.value)?;
        Ok(wizard.view())
    })
}

/// POST /api/v1/wizard/:id/submit
///
/// Returns the results location the client should navigate to.
/// The wizard stays mounted with its answers intact.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, AppError> {
    update(&state, id, |wizard| {
        let navigation = wizard.submit()?;
        info!("Wizard {} submitted", wizard.id);
        Ok(SubmitResponse {
            location: navigation.location(),
            query: navigation.query,
        })
    })
}

fn update<T>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut Wizard) -> Result<T, AppError>,
) -> Result<Json<T>, AppError> {
    state
        .wizards
        .with_wizard(id, f)
        .ok_or_else(|| wizard_not_found(id))?
        .map(Json)
}

fn wizard_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Wizard {id} not found"))
}
