use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{
        taste::{ACTOR_WEIGHT, DIRECTOR_WEIGHT, GENRE_WEIGHT, TASTE_EPS, WRITER_WEIGHT},
        ArtistEntry, EntityId, GenreEntry, Movie, MovieEntry, TasteKey, TasteKind, TasteRecord,
        TasteView, TasteViewCache, UserProfile, WatchedEntry, GENRES,
    },
    services::{
        load_profile, pager,
        pager::Page,
        providers::{EntityResolver, NotificationSink},
        UserLocks,
    },
};

/// Taste aggregator.
///
/// Applies signed weight deltas to taste records, derives the confirmation
/// flag, and keeps the profile's denormalized taste view coherent: a flip
/// patches a fresh view in place, and anything that cannot be patched
/// safely falls back to invalidation plus lazy rebuild.
///
/// Every operation takes the owning user's lock for its whole
/// read-modify-write cycle.
pub struct TasteService {
    store: Arc<dyn ProfileStore>,
    resolver: Arc<dyn EntityResolver>,
    locks: Arc<UserLocks>,
    sink: Arc<dyn NotificationSink>,
}

impl TasteService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        resolver: Arc<dyn EntityResolver>,
        locks: Arc<UserLocks>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            resolver,
            locks,
            sink,
        }
    }

    /// Applies a signed weight delta to one taste record.
    ///
    /// Creates the record on first contribution. When the confirmation flag
    /// flips, the cached taste view is patched in place or invalidated. A
    /// record that flips on is attached to the profile's reference list so
    /// a later rebuild reaches it; detaching stays a removal concern.
    pub async fn apply_delta(
        &self,
        user_id: &str,
        kind: TasteKind,
        entity_key: &str,
        delta: f64,
    ) -> AppResult<TasteRecord> {
        let entity_key = validate_key(kind, entity_key)?;
        let _guard = self.locks.lock(user_id).await;

        let mut profile = load_profile(&self.store, user_id).await?;
        let record = self.apply(&mut profile, kind, &entity_key, delta).await?;
        if record.added {
            profile.attach_taste(kind, &entity_key);
        }
        self.store.put_profile(profile).await?;
        Ok(record)
    }

    /// Adds an explicit taste: `+1.0` on the record, reference attached
    pub async fn add_taste(
        &self,
        user_id: &str,
        kind: TasteKind,
        entity_key: &str,
    ) -> AppResult<TasteRecord> {
        let entity_key = validate_key(kind, entity_key)?;
        // Resolve before mutating anything; an unknown entity must not
        // leave a dangling reference behind.
        self.resolve_check(kind, &entity_key).await?;

        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;

        let record = self.apply(&mut profile, kind, &entity_key, 1.0).await?;
        profile.attach_taste(kind, &entity_key);
        profile.proposals = None;
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %user_id, %kind, entity = %entity_key, "Taste added");
        self.sink.taste_changed(user_id);
        Ok(record)
    }

    /// Removes a taste: the weight is pulled back to zero (crossing the
    /// confirmation threshold downward) and the reference is detached.
    /// The record itself is retained as an inert row.
    pub async fn remove_taste(
        &self,
        user_id: &str,
        kind: TasteKind,
        entity_key: &str,
    ) -> AppResult<TasteRecord> {
        let entity_key = validate_key(kind, entity_key)?;
        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;

        let key = TasteKey::new(user_id, &entity_key, kind);
        let delta = match self.store.record(&key).await? {
            Some(record) => -record.weight,
            None => 0.0,
        };

        let record = self.apply(&mut profile, kind, &entity_key, delta).await?;
        profile.detach_taste(kind, &entity_key);
        profile.proposals = None;
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %user_id, %kind, entity = %entity_key, "Taste removed");
        self.sink.taste_changed(user_id);
        Ok(record)
    }

    /// The "did not want this movie" path: `-1.0` on the movie record plus
    /// derogatory contributions from its cast, crew, and genres.
    pub async fn untaste_movie(&self, user_id: &str, movie_id: &str) -> AppResult<TasteRecord> {
        let entity_key = validate_key(TasteKind::Movie, movie_id)?;
        let movie = self.resolver.movie(EntityId::from_key(&entity_key)).await?;

        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;

        let record = self
            .apply(&mut profile, TasteKind::Movie, &entity_key, -1.0)
            .await?;
        self.apply_movie_tastes(&mut profile, &movie, -1.0).await?;
        profile.proposals = None;
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %user_id, movie = %entity_key, "Movie untasted");
        self.sink.taste_changed(user_id);
        Ok(record)
    }

    /// Appends a movie to the watched history and applies the derived
    /// taste contributions from its cast, crew, and genres.
    pub async fn add_watched(
        &self,
        user_id: &str,
        movie_id: &str,
        date: NaiveDate,
    ) -> AppResult<()> {
        let entity_key = validate_key(TasteKind::Movie, movie_id)?;
        let movie = self.resolver.movie(EntityId::from_key(&entity_key)).await?;

        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;

        profile.add_watched(EntityId::from_key(&entity_key), date);
        self.apply_movie_tastes(&mut profile, &movie, 1.0).await?;
        profile.proposals = None;
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %user_id, movie = %entity_key, %date, "Watched movie recorded");
        self.sink.taste_changed(user_id);
        Ok(())
    }

    /// Serves the denormalized view of all confirmed tastes.
    ///
    /// A fresh cache is returned unchanged without touching the record
    /// store; a stale one is rebuilt, stored, and then served.
    pub async fn tastes_view(&self, user_id: &str) -> AppResult<TasteView> {
        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;

        if let Some(view) = profile.taste_view.fresh() {
            tracing::debug!(user_id = %user_id, "Serving cached taste view");
            return Ok(view.clone());
        }

        tracing::debug!(user_id = %user_id, "Rebuilding taste view");
        let view = self.rebuild_view(&profile).await?;
        profile.taste_view = TasteViewCache::Fresh(view.clone());
        self.store.put_profile(profile).await?;
        Ok(view)
    }

    /// One page of the watched history, most recent last
    pub async fn watched_page(
        &self,
        user_id: &str,
        page_index: usize,
        page_size: usize,
    ) -> AppResult<Page<WatchedEntry>> {
        let _guard = self.locks.lock(user_id).await;
        let profile = load_profile(&self.store, user_id).await?;

        let pairs: Vec<(EntityId, NaiveDate)> = profile
            .watched
            .iter()
            .cloned()
            .zip(profile.watched_dates.iter().cloned())
            .collect();
        let window = pager::page(&pairs, page_index, page_size);

        let mut items = Vec::with_capacity(window.items.len());
        for (id, date) in window.items {
            let movie = match self.resolver.movie(id.clone()).await {
                Ok(movie) => movie,
                Err(err) => {
                    tracing::warn!(user_id = %user_id, movie = %id, error = %err, "Skipping unresolvable watched movie");
                    continue;
                }
            };
            let key = TasteKey::new(user_id, id.as_str(), TasteKind::Movie);
            let tasted = self
                .store
                .record(&key)
                .await?
                .map(|r| r.added)
                .unwrap_or(false);
            items.push(WatchedEntry {
                id_imdb: id.to_string(),
                original_title: movie.original_or_title().map(str::to_string),
                title: movie.title_or_original().map(str::to_string),
                poster: movie.poster.clone(),
                date: date.format("%d-%m-%Y").to_string(),
                tasted: tasted as u8,
            });
        }

        Ok(Page {
            items,
            has_prev: window.has_prev,
            has_next: window.has_next,
        })
    }

    /// Applies one delta against a loaded profile, patching the view on flips
    async fn apply(
        &self,
        profile: &mut UserProfile,
        kind: TasteKind,
        entity_key: &str,
        delta: f64,
    ) -> AppResult<TasteRecord> {
        let key = TasteKey::new(&profile.id, entity_key, kind);
        let mut record = match self.store.record(&key).await? {
            Some(record) => record,
            None => TasteRecord::new(key),
        };

        if record.apply(delta) {
            self.patch_view(profile, &record).await;
        }
        self.store.put_record(record.clone()).await?;
        Ok(record)
    }

    /// Derived contributions of a watched (or un-wanted) movie.
    ///
    /// Positive direction attaches references so the new records show up in
    /// rebuilds; negative direction detaches references whose weight has
    /// decayed to zero.
    async fn apply_movie_tastes(
        &self,
        profile: &mut UserProfile,
        movie: &Movie,
        direction: f64,
    ) -> AppResult<()> {
        let contributions: Vec<(TasteKind, String, f64)> = movie
            .actors
            .iter()
            .map(|id| (TasteKind::Artist, id.to_string(), ACTOR_WEIGHT))
            .chain(
                movie
                    .directors
                    .iter()
                    .map(|id| (TasteKind::Artist, id.to_string(), DIRECTOR_WEIGHT)),
            )
            .chain(
                movie
                    .writers
                    .iter()
                    .map(|id| (TasteKind::Artist, id.to_string(), WRITER_WEIGHT)),
            )
            .chain(
                movie
                    .genres
                    .iter()
                    .map(|genre| (TasteKind::Genre, genre.clone(), GENRE_WEIGHT)),
            )
            .collect();

        for (kind, entity_key, weight) in contributions {
            let record = self
                .apply(profile, kind, &entity_key, weight * direction)
                .await?;
            if direction > 0.0 {
                profile.attach_taste(kind, &entity_key);
            } else if !record.added && record.weight <= TASTE_EPS {
                profile.detach_taste(kind, &entity_key);
            }
        }
        Ok(())
    }

    /// Patches the cached view after a confirmation flip.
    ///
    /// Only a fresh view is touched; when the flipped-on entry cannot be
    /// denormalized the cache is invalidated instead, and the next read
    /// rebuilds. Either way the served view stays identical to a full
    /// rebuild.
    async fn patch_view(&self, profile: &mut UserProfile, record: &TasteRecord) {
        let Some(view) = profile.taste_view.fresh_mut() else {
            return;
        };
        let entity_key = record.key.entity_key.as_str();

        if !record.added {
            match record.key.kind {
                TasteKind::Artist => view.remove_artist(entity_key),
                TasteKind::Movie => view.remove_movie(entity_key),
                TasteKind::Genre => view.remove_genre(entity_key),
            };
            return;
        }

        let patched = match record.key.kind {
            TasteKind::Artist => match self.resolver.artist(EntityId::from_key(entity_key)).await {
                Ok(artist) => {
                    view.insert_artist(ArtistEntry::from(&artist));
                    Ok(())
                }
                Err(err) => Err(err),
            },
            TasteKind::Movie => match self.resolver.movie(EntityId::from_key(entity_key)).await {
                Ok(movie) => {
                    view.insert_movie(MovieEntry::from(&movie));
                    Ok(())
                }
                Err(err) => Err(err),
            },
            TasteKind::Genre => {
                view.insert_genre(GenreEntry::new(entity_key));
                Ok(())
            }
        };

        if let Err(err) = patched {
            tracing::warn!(
                user_id = %profile.id,
                entity = %entity_key,
                error = %err,
                "Could not patch taste view, invalidating"
            );
            profile.taste_view.invalidate();
        }
    }

    /// Full rebuild from the per-kind reference lists.
    ///
    /// Records or entities that fail to resolve are skipped and logged, one
    /// bad reference never fails the whole rebuild. Store failures do fail
    /// it, a partially scanned view must not be cached as fresh.
    async fn rebuild_view(&self, profile: &UserProfile) -> AppResult<TasteView> {
        let mut view = TasteView::default();

        for id in &profile.artist_tastes {
            let Some(record) = self.confirmed(profile, TasteKind::Artist, id.as_str()).await? else {
                continue;
            };
            match self.resolver.artist(id.clone()).await {
                Ok(artist) => view.insert_artist(ArtistEntry::from(&artist)),
                Err(err) => {
                    tracing::warn!(artist = %record.key.entity_key, error = %err, "Skipping unresolvable artist taste");
                }
            }
        }

        for id in &profile.movie_tastes {
            let Some(record) = self.confirmed(profile, TasteKind::Movie, id.as_str()).await? else {
                continue;
            };
            match self.resolver.movie(id.clone()).await {
                Ok(movie) => view.insert_movie(MovieEntry::from(&movie)),
                Err(err) => {
                    tracing::warn!(movie = %record.key.entity_key, error = %err, "Skipping unresolvable movie taste");
                }
            }
        }

        for genre in &profile.genre_tastes {
            if self
                .confirmed(profile, TasteKind::Genre, genre)
                .await?
                .is_some()
            {
                view.insert_genre(GenreEntry::new(genre));
            }
        }

        Ok(view)
    }

    /// The referenced record, if it exists and is confirmed
    async fn confirmed(
        &self,
        profile: &UserProfile,
        kind: TasteKind,
        entity_key: &str,
    ) -> AppResult<Option<TasteRecord>> {
        let key = TasteKey::new(&profile.id, entity_key, kind);
        match self.store.record(&key).await? {
            Some(record) if record.added => Ok(Some(record)),
            Some(_) => Ok(None),
            None => {
                tracing::warn!(user_id = %profile.id, %kind, entity = %entity_key, "Referenced taste record missing");
                Ok(None)
            }
        }
    }

    async fn resolve_check(&self, kind: TasteKind, entity_key: &str) -> AppResult<()> {
        match kind {
            TasteKind::Artist => {
                self.resolver.artist(EntityId::from_key(entity_key)).await?;
            }
            TasteKind::Movie => {
                self.resolver.movie(EntityId::from_key(entity_key)).await?;
            }
            TasteKind::Genre => {}
        }
        Ok(())
    }
}

/// Validates the entity key for its kind: catalog id shape for artists and
/// movies, membership of the known genre list for genres.
fn validate_key(kind: TasteKind, raw: &str) -> AppResult<String> {
    match kind {
        TasteKind::Artist | TasteKind::Movie => {
            let id = EntityId::parse(raw)?;
            if id.kind_hint() != Some(kind) {
                return Err(AppError::InvalidInput(format!(
                    "{} is not a {} id",
                    raw, kind
                )));
            }
            Ok(id.to_string())
        }
        TasteKind::Genre => {
            if GENRES.contains(&raw) {
                Ok(raw.to_string())
            } else {
                Err(AppError::InvalidInput(format!("{} is not a genre", raw)))
            }
        }
    }
}
