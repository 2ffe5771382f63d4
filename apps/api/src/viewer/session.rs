//! Per-session results viewer.
//!
//! Each activation bumps a generation counter and aborts whatever request the
//! previous activation left in flight. The fetch runs in its own task and only
//! writes view state if its generation is still current, so a slow response
//! can never overwrite the results of a newer activation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cache::{session_namespace, CacheError, CacheKey, CacheStore};
use crate::models::recommendation::RecommendationItem;
use crate::questionnaire::query::RecommendationQuery;
use crate::recommender_client::{CollabRequest, Recommender};
use crate::viewer::ViewerError;

// ────────────────────────────────────────────────────────────────────────────
// View state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Never activated, or deactivated.
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Destructive,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn fetch_failed() -> Self {
        Self {
            title: "Error".to_string(),
            description: "Failed to fetch recommendations. Please try again.".to_string(),
            variant: NotificationVariant::Destructive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub phase: Phase,
    pub items: Vec<RecommendationItem>,
    pub source: Option<ResultSource>,
    pub notification: Option<Notification>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ViewState {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            items: Vec::new(),
            source: None,
            notification: None,
            resolved_at: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            ..Self::idle()
        }
    }

    pub fn ready(items: Vec<RecommendationItem>, source: ResultSource) -> Self {
        Self {
            phase: Phase::Ready,
            items,
            source: Some(source),
            notification: None,
            resolved_at: Some(Utc::now()),
        }
    }

    /// Any fetch failure: no items plus an error notification.
    pub fn failed() -> Self {
        Self {
            phase: Phase::Ready,
            notification: Some(Notification::fetch_failed()),
            resolved_at: Some(Utc::now()),
            ..Self::idle()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Viewer
// ────────────────────────────────────────────────────────────────────────────

struct Inner {
    generation: u64,
    in_flight: Option<AbortHandle>,
    state: ViewState,
    touched_at: Instant,
}

impl Inner {
    /// Starts a new generation, aborting any request from the previous one.
    fn supersede(&mut self, next: ViewState) -> u64 {
        self.generation += 1;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.state = next;
        self.touched_at = Instant::now();
        self.generation
    }
}

type SharedInner = Arc<Mutex<Inner>>;

fn lock(inner: &Mutex<Inner>) -> std::sync::MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes `state` only if `generation` is still the latest activation.
fn commit(
    inner: &Mutex<Inner>,
    generation: u64,
    state: ViewState,
) -> Result<ViewState, ViewerError> {
    let mut guard = lock(inner);
    if guard.generation != generation {
        return Err(ViewerError::Superseded);
    }
    guard.in_flight = None;
    guard.state = state.clone();
    Ok(state)
}

pub struct RecommendationViewer {
    session: Uuid,
    cache: Arc<dyn CacheStore>,
    recommender: Arc<dyn Recommender>,
    inner: SharedInner,
}

impl RecommendationViewer {
    pub fn new(
        session: Uuid,
        cache: Arc<dyn CacheStore>,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            session,
            cache,
            recommender,
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                in_flight: None,
                state: ViewState::idle(),
                touched_at: Instant::now(),
            })),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Resolves results for `query`: from the cache when possible, otherwise
    /// with a single request to the recommendation service.
    ///
    /// Returns `ViewerError::Superseded` if another activation or a
    /// deactivation happened before this one resolved.
    pub async fn activate(&self, query: &RecommendationQuery) -> Result<ViewState, ViewerError> {
        let generation = lock(&self.inner).supersede(ViewState::loading());

        let activation = Activation {
            generation,
            key: CacheKey::for_query(self.session, query),
            request: CollabRequest::from(query),
            cache: Arc::clone(&self.cache),
            recommender: Arc::clone(&self.recommender),
            inner: Arc::clone(&self.inner),
        };

        // The task commits its own result, so it still lands if the caller
        // goes away before it resolves.
        let task = tokio::spawn(activation.run());

        {
            let mut guard = lock(&self.inner);
            if guard.generation != generation {
                task.abort();
                return Err(ViewerError::Superseded);
            }
            if !task.is_finished() {
                guard.in_flight = Some(task.abort_handle());
            }
        }

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ViewerError::Superseded),
            Err(e) => {
                error!(
                    "Recommendation task for session {} panicked: {e}",
                    self.session
                );
                commit(&self.inner, generation, ViewState::failed())
            }
        }
    }

    /// Unmount: aborts any in-flight request and returns to idle.
    pub fn deactivate(&self) {
        lock(&self.inner).supersede(ViewState::idle());
    }

    pub fn snapshot(&self) -> ViewState {
        let mut inner = lock(&self.inner);
        inner.touched_at = Instant::now();
        inner.state.clone()
    }

    /// Looks up one item among the current results.
    pub fn item(&self, id: &str) -> Option<RecommendationItem> {
        let mut inner = lock(&self.inner);
        inner.touched_at = Instant::now();
        inner.state.items.iter().find(|item| item.id == id).cloned()
    }

    /// Nothing in flight and untouched for at least `max_idle`.
    fn is_idle(&self, max_idle: Duration) -> bool {
        let inner = lock(&self.inner);
        inner.in_flight.is_none() && inner.touched_at.elapsed() >= max_idle
    }
}

impl Drop for RecommendationViewer {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.inner).in_flight.take() {
            handle.abort();
        }
    }
}

/// One activation's worth of work, moved into its own task.
struct Activation {
    generation: u64,
    key: CacheKey,
    request: CollabRequest,
    cache: Arc<dyn CacheStore>,
    recommender: Arc<dyn Recommender>,
    inner: SharedInner,
}

impl Activation {
    async fn run(self) -> Result<ViewState, ViewerError> {
        if let Some(items) = self.read_cache().await {
            debug!("Cache hit for {}", self.key.as_string());
            let state = ViewState::ready(items, ResultSource::Cache);
            return commit(&self.inner, self.generation, state);
        }

        match self.recommender.recommend(&self.request).await {
            Ok(items) => {
                info!("Fetched {} recommendations", items.len());
                self.write_cache(&items).await;
                let state = ViewState::ready(items, ResultSource::Network);
                commit(&self.inner, self.generation, state)
            }
            Err(e) => {
                // Later activations with the same answers get the empty set
                // from the cache; only this one carries the notification.
                warn!("Failed to fetch recommendations: {e}");
                self.write_cache(&[]).await;
                commit(&self.inner, self.generation, ViewState::failed())
            }
        }
    }

    /// A store error or a corrupt entry counts as a miss.
    async fn read_cache(&self) -> Option<Vec<RecommendationItem>> {
        let raw = match self.cache.get(&self.key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache read failed, fetching instead: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {e}", self.key.as_string());
                None
            }
        }
    }

    async fn write_cache(&self, items: &[RecommendationItem]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize recommendations for cache: {e}");
                return;
            }
        };
        if let Err(e) = self.cache.set(&self.key, raw).await {
            warn!("Cache write failed: {e}");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// One viewer per browser session. Viewers left idle for `idle_ttl` are
/// dropped the next time a new session shows up.
#[derive(Clone)]
pub struct ViewerRegistry {
    cache: Arc<dyn CacheStore>,
    recommender: Arc<dyn Recommender>,
    idle_ttl: Duration,
    viewers: Arc<RwLock<HashMap<Uuid, Arc<RecommendationViewer>>>>,
}

impl ViewerRegistry {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        recommender: Arc<dyn Recommender>,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            recommender,
            idle_ttl,
            viewers: Arc::default(),
        }
    }

    pub fn get_or_create(&self, session: Uuid) -> Arc<RecommendationViewer> {
        if let Some(viewer) = self.get(session) {
            return viewer;
        }
        self.evict_idle();
        let mut viewers = self
            .viewers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(viewers.entry(session).or_insert_with(|| {
            Arc::new(RecommendationViewer::new(
                session,
                Arc::clone(&self.cache),
                Arc::clone(&self.recommender),
            ))
        }))
    }

    pub fn get(&self, session: Uuid) -> Option<Arc<RecommendationViewer>> {
        self.viewers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&session)
            .cloned()
    }

    /// Forgets viewers that have been idle for longer than `idle_ttl`.
    /// Returns how many were dropped.
    pub fn evict_idle(&self) -> usize {
        let evicted: Vec<Arc<RecommendationViewer>> = {
            let mut viewers = self
                .viewers
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let idle: Vec<Uuid> = viewers
                .iter()
                .filter(|(_, viewer)| viewer.is_idle(self.idle_ttl))
                .map(|(session, _)| *session)
                .collect();
            idle.iter().filter_map(|session| viewers.remove(session)).collect()
        };
        for viewer in &evicted {
            debug!("Evicted idle viewer for session {}", viewer.session());
        }
        evicted.len()
    }

    /// Drops every cached result for the session, whether or not it has a viewer.
    pub async fn clear_cache(&self, session: Uuid) -> Result<(), CacheError> {
        self.cache.clear(&session_namespace(session)).await
    }

    /// Deactivates and forgets the session's viewer. Returns false if none existed.
    pub fn remove(&self, session: Uuid) -> bool {
        let removed = self
            .viewers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&session);
        match removed {
            Some(viewer) => {
                viewer.deactivate();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::recommender_client::RecommendError;
    use crate::viewer::page::{ResultsPage, NO_RESULTS_DESCRIPTION};

    fn item(id: &str) -> RecommendationItem {
        RecommendationItem {
            id: id.to_string(),
            title: format!("Job {id}"),
            company_name: "Initech".to_string(),
            company_logo: "https://logo.example/initech.png".to_string(),
            description_text: "TPS reports.".to_string(),
            formatted_location: "Austin, TX".to_string(),
            link: format!("https://jobs.example/{id}"),
        }
    }

    fn query(skills: &str) -> RecommendationQuery {
        RecommendationQuery {
            education: Some("bachelors".into()),
            field: Some("CS".into()),
            environment: Some("remote".into()),
            skills: Some(skills.into()),
            interests: Some("AI".into()),
            values: Some("impact".into()),
        }
    }

    fn memory_cache() -> Arc<dyn CacheStore> {
        Arc::new(MemoryCacheStore::new(Duration::from_secs(1800)))
    }

    /// Returns a fixed outcome and counts calls.
    struct FixedRecommender {
        calls: AtomicUsize,
        outcome: fn() -> Result<Vec<RecommendationItem>, RecommendError>,
    }

    impl FixedRecommender {
        fn new(outcome: fn() -> Result<Vec<RecommendationItem>, RecommendError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Recommender for FixedRecommender {
        async fn recommend(
            &self,
            _request: &CollabRequest,
        ) -> Result<Vec<RecommendationItem>, RecommendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    /// Blocks until released, then echoes the requested skills as the item id.
    struct GatedRecommender {
        gate: Notify,
        started: AtomicUsize,
    }

    #[async_trait]
    impl Recommender for GatedRecommender {
        async fn recommend(
            &self,
            request: &CollabRequest,
        ) -> Result<Vec<RecommendationItem>, RecommendError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(vec![item(request.skills.as_deref().unwrap_or_default())])
        }
    }

    fn backend_500() -> Result<Vec<RecommendationItem>, RecommendError> {
        Err(RecommendError::Backend {
            status: 500,
            body: String::new(),
        })
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let cache = memory_cache();
        let session = Uuid::new_v4();
        let q = query("Go");
        let cached = serde_json::to_string(&vec![item("1")]).unwrap();
        cache
            .set(&CacheKey::for_query(session, &q), cached)
            .await
            .unwrap();

        let recommender = FixedRecommender::new(|| Ok(vec![item("network")]));
        let viewer = RecommendationViewer::new(session, cache, recommender.clone());

        let state = viewer.activate(&q).await.unwrap();
        assert_eq!(recommender.calls(), 0);
        assert_eq!(state.items, vec![item("1")]);
        assert_eq!(state.source, Some(ResultSource::Cache));
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_populates_cache() {
        let cache = memory_cache();
        let session = Uuid::new_v4();
        let recommender = FixedRecommender::new(|| Ok(vec![item("1"), item("2")]));
        let viewer = RecommendationViewer::new(session, cache.clone(), recommender.clone());

        let first = viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(first.source, Some(ResultSource::Network));
        assert_eq!(first.items.len(), 2);

        let second = viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(second.source, Some(ResultSource::Cache));
        assert_eq!(second.items, first.items);
        assert_eq!(recommender.calls(), 1);
    }

    #[tokio::test]
    async fn test_different_answers_do_not_share_cached_results() {
        let recommender = FixedRecommender::new(|| Ok(vec![item("1")]));
        let viewer =
            RecommendationViewer::new(Uuid::new_v4(), memory_cache(), recommender.clone());

        viewer.activate(&query("Go")).await.unwrap();
        let other = viewer.activate(&query("Rust")).await.unwrap();

        assert_eq!(other.source, Some(ResultSource::Network));
        assert_eq!(recommender.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_success_is_ready_not_loading() {
        let recommender = FixedRecommender::new(|| Ok(vec![]));
        let viewer = RecommendationViewer::new(Uuid::new_v4(), memory_cache(), recommender);

        let state = viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.items.is_empty());
        assert!(state.notification.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_caches_empty_result() {
        let cache = memory_cache();
        let session = Uuid::new_v4();
        let recommender = FixedRecommender::new(backend_500);
        let viewer = RecommendationViewer::new(session, cache.clone(), recommender.clone());

        let state = viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.items.is_empty());
        assert_eq!(state.notification, Some(Notification::fetch_failed()));

        let key = CacheKey::for_query(session, &query("Go"));
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("[]"));

        // The same answers now resolve from the cache: no request, no notification.
        let again = viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(recommender.calls(), 1);
        assert_eq!(again.phase, Phase::Ready);
        assert_eq!(again.source, Some(ResultSource::Cache));
        assert!(again.items.is_empty());
        assert!(again.notification.is_none());
        assert_eq!(ResultsPage::from(&again).description, NO_RESULTS_DESCRIPTION);

        // Clearing the session's cache allows a retry.
        ViewerRegistry::new(cache, recommender.clone(), Duration::from_secs(60))
            .clear_cache(session)
            .await
            .unwrap();
        viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(recommender.calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_falls_back_to_network() {
        let cache = memory_cache();
        let session = Uuid::new_v4();
        let q = query("Go");
        cache
            .set(&CacheKey::for_query(session, &q), "not json".into())
            .await
            .unwrap();

        let recommender = FixedRecommender::new(|| Ok(vec![item("fresh")]));
        let viewer = RecommendationViewer::new(session, cache, recommender.clone());

        let state = viewer.activate(&q).await.unwrap();
        assert_eq!(recommender.calls(), 1);
        assert_eq!(state.items, vec![item("fresh")]);
    }

    #[tokio::test]
    async fn test_snapshot_shows_loading_while_in_flight() {
        let recommender = Arc::new(GatedRecommender {
            gate: Notify::new(),
            started: AtomicUsize::new(0),
        });
        let viewer = Arc::new(RecommendationViewer::new(
            Uuid::new_v4(),
            memory_cache(),
            recommender.clone(),
        ));
        assert_eq!(viewer.snapshot().phase, Phase::Idle);

        let pending = {
            let viewer = Arc::clone(&viewer);
            tokio::spawn(async move { viewer.activate(&query("Go")).await })
        };
        while recommender.started.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(viewer.snapshot().phase, Phase::Loading);

        recommender.gate.notify_one();
        let state = pending.await.unwrap().unwrap();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(viewer.snapshot(), state);
    }

    #[tokio::test]
    async fn test_new_activation_supersedes_in_flight_request() {
        let recommender = Arc::new(GatedRecommender {
            gate: Notify::new(),
            started: AtomicUsize::new(0),
        });
        let viewer = Arc::new(RecommendationViewer::new(
            Uuid::new_v4(),
            memory_cache(),
            recommender.clone(),
        ));

        let stale = {
            let viewer = Arc::clone(&viewer);
            tokio::spawn(async move { viewer.activate(&query("Go")).await })
        };
        while recommender.started.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fresh = {
            let viewer = Arc::clone(&viewer);
            tokio::spawn(async move { viewer.activate(&query("Rust")).await })
        };
        while recommender.started.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        assert_eq!(stale.await.unwrap(), Err(ViewerError::Superseded));

        recommender.gate.notify_one();
        let state = fresh.await.unwrap().unwrap();
        assert_eq!(state.items, vec![item("Rust")]);
        assert_eq!(viewer.snapshot().items, vec![item("Rust")]);
    }

    #[tokio::test]
    async fn test_deactivate_aborts_request() {
        let recommender = Arc::new(GatedRecommender {
            gate: Notify::new(),
            started: AtomicUsize::new(0),
        });
        let cache = memory_cache();
        let session = Uuid::new_v4();
        let viewer = Arc::new(RecommendationViewer::new(
            session,
            cache.clone(),
            recommender.clone(),
        ));

        let pending = {
            let viewer = Arc::clone(&viewer);
            tokio::spawn(async move { viewer.activate(&query("Go")).await })
        };
        while recommender.started.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        viewer.deactivate();
        assert_eq!(pending.await.unwrap(), Err(ViewerError::Superseded));
        assert_eq!(viewer.snapshot().phase, Phase::Idle);

        // The aborted request never reached the cache.
        let key = CacheKey::for_query(session, &query("Go"));
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_item_lookup_and_cache_clear() {
        let cache = memory_cache();
        let session = Uuid::new_v4();
        let recommender = FixedRecommender::new(|| Ok(vec![item("1"), item("2")]));
        let registry =
            ViewerRegistry::new(cache, recommender.clone(), Duration::from_secs(1800));
        let viewer = registry.get_or_create(session);

        viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(viewer.item("2"), Some(item("2")));
        assert_eq!(viewer.item("3"), None);

        registry.clear_cache(session).await.unwrap();
        viewer.activate(&query("Go")).await.unwrap();
        assert_eq!(recommender.calls(), 2);
    }

    #[tokio::test]
    async fn test_registry_reuses_viewer_per_session() {
        let registry = ViewerRegistry::new(
            memory_cache(),
            FixedRecommender::new(|| Ok(vec![])),
            Duration::from_secs(1800),
        );
        let session = Uuid::new_v4();

        let a = registry.get_or_create(session);
        let b = registry.get_or_create(session);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.session(), session);

        assert!(registry.remove(session));
        assert!(registry.get(session).is_none());
        assert!(!registry.remove(session));
    }

    fn viewer_count(registry: &ViewerRegistry) -> usize {
        registry
            .viewers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_viewers_are_evicted_when_new_sessions_arrive() {
        let registry = ViewerRegistry::new(
            memory_cache(),
            FixedRecommender::new(|| Ok(vec![])),
            Duration::from_secs(60),
        );
        let active = Uuid::new_v4();
        for _ in 0..50 {
            registry.get_or_create(Uuid::new_v4());
        }
        registry.get_or_create(active);
        assert_eq!(viewer_count(&registry), 51);

        tokio::time::advance(Duration::from_secs(30)).await;
        registry.get(active).unwrap().snapshot();
        tokio::time::advance(Duration::from_secs(31)).await;

        let newcomer = Uuid::new_v4();
        registry.get_or_create(newcomer);
        assert_eq!(viewer_count(&registry), 2);
        assert!(registry.get(active).is_some());
        assert!(registry.get(newcomer).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewer_with_request_in_flight_is_not_evicted() {
        let recommender = Arc::new(GatedRecommender {
            gate: Notify::new(),
            started: AtomicUsize::new(0),
        });
        let registry =
            ViewerRegistry::new(memory_cache(), recommender.clone(), Duration::from_secs(60));
        let session = Uuid::new_v4();

        let pending = {
            let viewer = registry.get_or_create(session);
            tokio::spawn(async move { viewer.activate(&query("Go")).await })
        };
        while recommender.started.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(registry.evict_idle(), 0);

        recommender.gate.notify_one();
        pending.await.unwrap().unwrap();
        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(registry.evict_idle(), 1);
        assert!(registry.get(session).is_none());
    }
}
