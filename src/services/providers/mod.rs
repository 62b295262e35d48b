/// Collaborator seams consumed by the engine
///
/// Entity retrieval, schedule sourcing, and notification delivery all live
/// behind narrow traits; the engine only ever sees these interfaces. The
/// reference implementations here are store-backed or static, the
/// HTTP-backed schedule source lives in its own module.
use std::sync::Arc;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{Artist, BroadcastSlot, Day, EntityId, Movie, TvType},
};

pub mod http_schedule;

pub use http_schedule::HttpScheduleProvider;

/// Black-box catalog lookup
///
/// Network retrieval of entity metadata is out of scope; the engine only
/// requires that ids resolve to denormalizable records or fail with
/// `NotFound`/`Retrieval`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EntityResolver: Send + Sync {
    async fn artist(&self, id: EntityId) -> AppResult<Artist>;

    async fn movie(&self, id: EntityId) -> AppResult<Movie>;

    /// Resolves a scheduled movie by localized or original title
    async fn movie_by_title(
        &self,
        title: Option<String>,
        original_title: Option<String>,
    ) -> AppResult<Movie>;
}

/// Broadcast schedule source
#[async_trait::async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn schedule(&self, tv_type: TvType, day: Day) -> AppResult<Vec<BroadcastSlot>>;

    /// Union of the schedules of several TV source types.
    ///
    /// One failing source degrades the result instead of failing it; the
    /// skip is logged.
    async fn schedule_for(&self, tv_types: &[TvType], day: Day) -> AppResult<Vec<BroadcastSlot>> {
        let mut slots = Vec::new();
        for tv_type in tv_types {
            match self.schedule(*tv_type, day).await {
                Ok(mut batch) => slots.append(&mut batch),
                Err(err) => {
                    tracing::warn!(%tv_type, %day, error = %err, "Skipping unavailable schedule source");
                }
            }
        }
        Ok(slots)
    }
}

/// Fire-and-forget event emission towards the notification pipeline
///
/// Actual delivery to client devices happens elsewhere; the engine only
/// signals that a recompute or a push may be due.
pub trait NotificationSink: Send + Sync {
    fn taste_changed(&self, user_id: &str);

    fn proposal_ready(&self, user_id: &str);
}

/// Sink that only logs, the default wiring for tests and standalone runs
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn taste_changed(&self, user_id: &str) {
        tracing::debug!(user_id = %user_id, "Taste changed");
    }

    fn proposal_ready(&self, user_id: &str) {
        tracing::debug!(user_id = %user_id, "Proposal ready");
    }
}

/// Resolver backed by the store's catalog tables
pub struct CatalogResolver {
    store: Arc<dyn ProfileStore>,
}

impl CatalogResolver {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl EntityResolver for CatalogResolver {
    async fn artist(&self, id: EntityId) -> AppResult<Artist> {
        self.store
            .artist(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("artist {}", id)))
    }

    async fn movie(&self, id: EntityId) -> AppResult<Movie> {
        self.store
            .movie(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("movie {}", id)))
    }

    async fn movie_by_title(
        &self,
        title: Option<String>,
        original_title: Option<String>,
    ) -> AppResult<Movie> {
        self.store
            .movie_by_title(title.as_deref(), original_title.as_deref())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no catalog movie titled {:?}/{:?}",
                    title, original_title
                ))
            })
    }
}

/// Schedule provider serving a fixed slot list, one copy per TV source type.
///
/// Used by tests and demos where the broadcast schedule is known up front.
#[derive(Debug, Default, Clone)]
pub struct StaticScheduleProvider {
    slots: Vec<BroadcastSlot>,
}

impl StaticScheduleProvider {
    pub fn new(slots: Vec<BroadcastSlot>) -> Self {
        Self { slots }
    }
}

#[async_trait::async_trait]
impl ScheduleProvider for StaticScheduleProvider {
    async fn schedule(&self, _tv_type: TvType, _day: Day) -> AppResult<Vec<BroadcastSlot>> {
        Ok(self.slots.clone())
    }
}
