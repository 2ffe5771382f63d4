//! Axum route handlers for the results viewer.
//!
//! Every route is scoped to the caller's browser session, identified by the
//! `x-session-id` header.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, RawQuery, State},
    http::{request::Parts, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::questionnaire::query::RecommendationQuery;
use crate::state::AppState;
use crate::viewer::page::{RecommendationDetail, ResultsPage};
use crate::viewer::session::ViewState;

pub const SESSION_HEADER: &str = "x-session-id";

/// Browser-session id taken from the `x-session-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| AppError::Validation(format!("missing {SESSION_HEADER} header")))?
            .to_str()
            .map_err(|_| AppError::Validation(format!("{SESSION_HEADER} must be ASCII")))?;

        Uuid::parse_str(raw.trim())
            .map(SessionId)
            .map_err(|_| AppError::Validation(format!("{SESSION_HEADER} must be a UUID")))
    }
}

/// GET /recommendations?education=..&field=..&environment=..&skills=..&interests=..&values=..
///
/// Activates the session's viewer and waits for it to resolve. Missing
/// parameters are forwarded as null. 409 if a newer activation or a
/// deactivation overtakes this one.
pub async fn handle_activate(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    RawQuery(raw): RawQuery,
) -> Result<Json<ResultsPage>, AppError> {
    let query = RecommendationQuery::parse(raw.as_deref().unwrap_or_default());
    let viewer = state.viewers.get_or_create(session);
    let view = viewer.activate(&query).await?;
    Ok(Json(ResultsPage::from(&view)))
}

/// GET /recommendations/status
///
/// The page as it stands, without triggering a fetch. Shows placeholders
/// while a request is outstanding.
pub async fn handle_status(
    State(state): State<AppState>,
    SessionId(session): SessionId,
) -> Json<ResultsPage> {
    let view = state
        .viewers
        .get(session)
        .map(|viewer| viewer.snapshot())
        .unwrap_or_else(ViewState::idle);
    Json(ResultsPage::from(&view))
}

/// GET /recommendations/items/:id
///
/// Detail overlay for one of the session's current results.
pub async fn handle_item_detail(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Path(item_id): Path<String>,
) -> Result<Json<RecommendationDetail>, AppError> {
    state
        .viewers
        .get(session)
        .and_then(|viewer| viewer.item(&item_id))
        .map(|item| Json(RecommendationDetail::from(&item)))
        .ok_or_else(|| AppError::NotFound(format!("Recommendation {item_id} not found")))
}

/// DELETE /recommendations
///
/// Unmounts the session's viewer, aborting any request still in flight.
pub async fn handle_deactivate(
    State(state): State<AppState>,
    SessionId(session): SessionId,
) -> Result<StatusCode, AppError> {
    if state.viewers.remove(session) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "No active viewer for session {session}"
        )))
    }
}

/// DELETE /recommendations/cache
pub async fn handle_clear_cache(
    State(state): State<AppState>,
    SessionId(session): SessionId,
) -> Result<StatusCode, AppError> {
    state.viewers.clear_cache(session).await?;
    Ok(StatusCode::NO_CONTENT)
}
