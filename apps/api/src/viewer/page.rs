//! What the results page shows for a given view state.

use serde::Serialize;

use crate::models::recommendation::RecommendationItem;
use crate::viewer::session::{Notification, Phase, ResultSource, ViewState};

/// Placeholder cards shown while a request is outstanding.
pub const PLACEHOLDER_COUNT: usize = 6;

pub const IDLE_DESCRIPTION: &str = "No recommendations requested yet.";
pub const LOADING_DESCRIPTION: &str = "Loading...";
pub const RESULTS_DESCRIPTION: &str = "Click on a job card to view more details.";
pub const NO_RESULTS_DESCRIPTION: &str = "Could not find any recommendations. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationCard {
    pub id: String,
    pub title: String,
    pub company_name: String,
    pub company_logo: String,
    pub logo_fallback: String,
    pub description_text: String,
}

impl From<&RecommendationItem> for RecommendationCard {
    fn from(item: &RecommendationItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            company_name: item.company_name.clone(),
            company_logo: item.company_logo.clone(),
            logo_fallback: item.logo_fallback(),
            description_text: item.description_text.clone(),
        }
    }
}

/// The detail overlay opened from a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationDetail {
    pub id: String,
    pub title: String,
    pub company_name: String,
    pub company_logo: String,
    pub logo_fallback: String,
    pub formatted_location: String,
    pub description_text: String,
    pub link: String,
}

impl From<&RecommendationItem> for RecommendationDetail {
    fn from(item: &RecommendationItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            company_name: item.company_name.clone(),
            company_logo: item.company_logo.clone(),
            logo_fallback: item.logo_fallback(),
            formatted_location: item.formatted_location.clone(),
            description_text: item.description_text.clone(),
            link: item.link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsPage {
    pub phase: Phase,
    pub description: &'static str,
    pub placeholders: usize,
    pub cards: Vec<RecommendationCard>,
    pub notification: Option<Notification>,
    pub source: Option<ResultSource>,
}

impl From<&ViewState> for ResultsPage {
    fn from(state: &ViewState) -> Self {
        let (description, placeholders) = match state.phase {
            Phase::Idle => (IDLE_DESCRIPTION, 0),
            Phase::Loading => (LOADING_DESCRIPTION, PLACEHOLDER_COUNT),
            Phase::Ready if state.items.is_empty() => (NO_RESULTS_DESCRIPTION, 0),
            Phase::Ready => (RESULTS_DESCRIPTION, 0),
        };

        Self {
            phase: state.phase,
            description,
            placeholders,
            cards: state.items.iter().map(RecommendationCard::from).collect(),
            notification: state.notification.clone(),
            source: state.source,
        }
    }
}
