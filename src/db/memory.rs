use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::db::store::{ProfileStore, StoreResult};
use crate::models::{Artist, EntityId, Movie, TasteKey, TasteRecord, UserProfile};

/// In-memory reference implementation of [`ProfileStore`].
///
/// Backs tests and single-node deployments; durable wiring is a drop-in
/// replacement behind the same trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, UserProfile>,
    records: HashMap<TasteKey, TasteRecord>,
    artists: HashMap<EntityId, Artist>,
    movies: HashMap<EntityId, Movie>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.inner.read().await.profiles.get(user_id).cloned())
    }

    async fn put_profile(&self, profile: UserProfile) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> StoreResult<bool> {
        Ok(self.inner.write().await.profiles.remove(user_id).is_some())
    }

    async fn profile_ids(&self) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = self.inner.read().await.profiles.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn record(&self, key: &TasteKey) -> StoreResult<Option<TasteRecord>> {
        Ok(self.inner.read().await.records.get(key).cloned())
    }

    async fn put_record(&self, record: TasteRecord) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .records
            .insert(record.key.clone(), record);
        Ok(())
    }

    async fn artist(&self, id: &EntityId) -> StoreResult<Option<Artist>> {
        Ok(self.inner.read().await.artists.get(id).cloned())
    }

    async fn put_artist(&self, artist: Artist) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .artists
            .insert(artist.id.clone(), artist);
        Ok(())
    }

    async fn movie(&self, id: &EntityId) -> StoreResult<Option<Movie>> {
        Ok(self.inner.read().await.movies.get(id).cloned())
    }

    async fn put_movie(&self, movie: Movie) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .movies
            .insert(movie.id.clone(), movie);
        Ok(())
    }

    async fn movie_by_title(
        &self,
        title: Option<&str>,
        original_title: Option<&str>,
    ) -> StoreResult<Option<Movie>> {
        let inner = self.inner.read().await;
        let found = inner.movies.values().find(|movie| {
            let matches = |candidate: Option<&str>| {
                candidate.is_some()
                    && (candidate == movie.title.as_deref()
                        || candidate == movie.original_title.as_deref())
            };
            matches(original_title) || matches(title)
        });
        Ok(found.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TasteKind;

    fn movie(id: &str, title: &str) -> Movie {
        Movie {
            id: EntityId::from_key(id),
            title: Some(title.to_string()),
            original_title: None,
            poster: None,
            simple_plot: None,
            run_times: None,
            year: None,
            actors: vec![],
            directors: vec![],
            writers: vec![],
            genres: vec![],
        }
    }

    #[tokio::test]
    async fn profile_crud() {
        let store = MemoryStore::new();
        assert!(store.profile("user@example.com").await.unwrap().is_none());

        store
            .put_profile(UserProfile::new("user@example.com"))
            .await
            .unwrap();
        assert!(store.profile("user@example.com").await.unwrap().is_some());
        assert_eq!(store.profile_ids().await.unwrap(), vec!["user@example.com"]);

        assert!(store.delete_profile("user@example.com").await.unwrap());
        assert!(!store.delete_profile("user@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn record_put_overwrites_by_key() {
        let store = MemoryStore::new();
        let key = TasteKey::new("user@example.com", "nm0000001", TasteKind::Artist);
        let mut record = TasteRecord::new(key.clone());
        record.apply(1.0);
        store.put_record(record.clone()).await.unwrap();
        record.apply(0.5);
        store.put_record(record.clone()).await.unwrap();

        let stored = store.record(&key).await.unwrap().unwrap();
        assert!((stored.weight - 1.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn movie_lookup_by_either_title() {
        let store = MemoryStore::new();
        let mut stored = movie("tt0062229", "Il sorpasso");
        stored.original_title = Some("The Easy Life".to_string());
        store.put_movie(stored).await.unwrap();

        let by_title = store
            .movie_by_title(Some("Il sorpasso"), None)
            .await
            .unwrap();
        assert!(by_title.is_some());

        let by_original = store
            .movie_by_title(None, Some("The Easy Life"))
            .await
            .unwrap();
        assert!(by_original.is_some());

        let missing = store.movie_by_title(Some("Unknown"), None).await.unwrap();
        assert!(missing.is_none());
    }
}
