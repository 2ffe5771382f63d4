use crate::config::Config;
use crate::questionnaire::wizard::WizardRegistry;
use crate::viewer::session::ViewerRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Mounted questionnaires, keyed by wizard id.
    pub wizards: WizardRegistry,
    /// Results viewers keyed by browser session. Owns the injected cache
    /// store and recommender.
    pub viewers: ViewerRegistry,
}
