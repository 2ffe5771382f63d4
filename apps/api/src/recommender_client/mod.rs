/// Recommender client: the single point of entry for calls to the external
/// collaborative-filtering service.
///
/// One POST per call. No retry and no backoff: a failed call is reported to
/// the caller, which decides what the user sees.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::recommendation::RecommendationItem;
use crate::questionnaire::query::RecommendationQuery;

const COLLAB_PATH: &str = "/recommend-collab";

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("request to recommendation service failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("recommendation service returned status {status}")]
    Backend { status: u16, body: String },

    #[error("malformed recommendation payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Body of `POST /recommend-collab`. Absent parameters are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollabRequest {
    pub highest_degree: Option<String>,
    pub field_of_study: Option<String>,
    pub work_env: Option<String>,
    pub skills: Option<String>,
    pub career_interests: Option<String>,
    pub work_values: Option<String>,
}

impl From<&RecommendationQuery> for CollabRequest {
    fn from(query: &RecommendationQuery) -> Self {
        Self {
            highest_degree: query.education.clone(),
            field_of_study: query.field.clone(),
            work_env: query.environment.clone(),
            skills: query.skills.clone(),
            career_interests: query.interests.clone(),
            work_values: query.values.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CollabResponse {
    recommendations: Vec<RecommendationItem>,
}

/// Source of recommendations. `AppState` carries an `Arc<dyn Recommender>`
/// so tests can swap in a fake without a network.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        request: &CollabRequest,
    ) -> Result<Vec<RecommendationItem>, RecommendError>;
}

/// reqwest-backed client for the collaborative-filtering endpoint.
#[derive(Clone)]
pub struct HttpRecommender {
    client: Client,
    endpoint: String,
}

impl HttpRecommender {
    /// `timeout: None` leaves the request unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RecommendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}{COLLAB_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Recommender for HttpRecommender {
    async fn recommend(
        &self,
        request: &CollabRequest,
    ) -> Result<Vec<RecommendationItem>, RecommendError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        // Exactly 200; other 2xx codes are not part of the contract.
        if status != StatusCode::OK {
            warn!("Recommendation service returned {}: {}", status, body);
            return Err(RecommendError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CollabResponse = serde_json::from_str(&body)?;
        debug!(
            "Recommendation call succeeded: {} items",
            parsed.recommendations.len()
        );

        Ok(parsed.recommendations)
    }
}
