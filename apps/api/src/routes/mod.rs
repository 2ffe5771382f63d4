pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::questionnaire::handlers as wizard;
use crate::state::AppState;
use crate::viewer::handlers as viewer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Questionnaire wizard
        .route("/api/v1/wizard", post(wizard::handle_create_wizard))
        .route(
            "/api/v1/wizard/:id",
            get(wizard::handle_get_wizard).delete(wizard::handle_discard_wizard),
        )
        .route("/api/v1/wizard/:id/next", post(wizard::handle_next_step))
        .route("/api/v1/wizard/:id/previous", post(wizard::handle_previous_step))
        .route("/api/v1/wizard/:id/answers", patch(wizard::handle_set_field))
        .route("/api/v1/wizard/:id/submit", post(wizard::handle_submit))
        // Results viewer (session-scoped)
        .route(
            "/recommendations",
            get(viewer::handle_activate).delete(viewer::handle_deactivate),
        )
        .route("/recommendations/status", get(viewer::handle_status))
        .route("/recommendations/items/:id", get(viewer::handle_item_detail))
        .route("/recommendations/cache", delete(viewer::handle_clear_cache))
        .with_state(state)
}
