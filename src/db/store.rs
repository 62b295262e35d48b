use crate::models::{Artist, EntityId, Movie, TasteKey, TasteRecord, UserProfile};

/// Persistence failures
///
/// Transient by definition: the backing store being unreachable or a stored
/// value failing to decode. Callers own any retry policy.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed persistence for profiles, taste records, and the entity catalog.
///
/// Get/put semantics with per-key atomic writes. Read-modify-write cycles
/// are serialized one level up by the per-user locks, not here.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn put_profile(&self, profile: UserProfile) -> StoreResult<()>;

    /// Removes a profile; returns whether it existed
    async fn delete_profile(&self, user_id: &str) -> StoreResult<bool>;

    async fn profile_ids(&self) -> StoreResult<Vec<String>>;

    async fn record(&self, key: &TasteKey) -> StoreResult<Option<TasteRecord>>;

    async fn put_record(&self, record: TasteRecord) -> StoreResult<()>;

    async fn artist(&self, id: &EntityId) -> StoreResult<Option<Artist>>;

    async fn put_artist(&self, artist: Artist) -> StoreResult<()>;

    async fn movie(&self, id: &EntityId) -> StoreResult<Option<Movie>>;

    async fn put_movie(&self, movie: Movie) -> StoreResult<()>;

    /// Looks a movie up by localized or original title, either may match
    async fn movie_by_title(
        &self,
        title: Option<&str>,
        original_title: Option<&str>,
    ) -> StoreResult<Option<Movie>>;
}
