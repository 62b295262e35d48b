use std::cmp::Ordering;
use std::sync::Arc;

use rand::seq::index::sample;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{
        channel_number,
        taste::{ACTOR_WEIGHT, DIRECTOR_WEIGHT, GENRE_WEIGHT, WRITER_WEIGHT},
        BroadcastSlot, Day, Movie, Proposal, TasteKey, TasteKind, UserProfile,
    },
    services::{
        load_profile,
        providers::{EntityResolver, NotificationSink, ScheduleProvider},
        UserLocks,
    },
};

/// Cold-start selection strategy.
///
/// Invoked when no schedule slot carries any taste signal; must return
/// `cap` candidate indices (fewer only when the schedule itself is
/// smaller), so even a brand-new user gets a non-empty proposal list.
pub trait FallbackStrategy: Send + Sync {
    fn pick(&self, candidates: usize, cap: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement, the default fallback
#[derive(Debug, Default, Clone)]
pub struct UniformFallback;

impl FallbackStrategy for UniformFallback {
    fn pick(&self, candidates: usize, cap: usize) -> Vec<usize> {
        let amount = cap.min(candidates);
        let mut picks = sample(&mut rand::rng(), candidates, amount).into_vec();
        picks.sort_unstable();
        picks
    }
}

/// Deterministic fallback taking the earliest candidates, used in tests
#[derive(Debug, Default, Clone)]
pub struct LeadingFallback;

impl FallbackStrategy for LeadingFallback {
    fn pick(&self, candidates: usize, cap: usize) -> Vec<usize> {
        (0..cap.min(candidates)).collect()
    }
}

/// Proposal selector.
///
/// Scores broadcast slots against the user's taste records, ranks them, and
/// caches the bounded result on the profile. A cached non-empty list is
/// served as-is until explicitly cleared; the selector never refreshes it
/// behind the caller's back.
pub struct ProposalSelector {
    store: Arc<dyn ProfileStore>,
    resolver: Arc<dyn EntityResolver>,
    locks: Arc<UserLocks>,
    sink: Arc<dyn NotificationSink>,
    fallback: Box<dyn FallbackStrategy>,
    cap: usize,
}

impl ProposalSelector {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        resolver: Arc<dyn EntityResolver>,
        locks: Arc<UserLocks>,
        sink: Arc<dyn NotificationSink>,
        cap: usize,
    ) -> Self {
        Self {
            store,
            resolver,
            locks,
            sink,
            fallback: Box::new(UniformFallback),
            cap,
        }
    }

    /// Swaps the cold-start strategy
    pub fn with_fallback(mut self, fallback: Box<dyn FallbackStrategy>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Serves the user's proposals, recomputing only when no cached list
    /// exists.
    pub async fn proposals(
        &self,
        user_id: &str,
        schedule: &dyn ScheduleProvider,
    ) -> AppResult<Vec<Proposal>> {
        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;

        if let Some(cached) = &profile.proposals {
            if !cached.is_empty() {
                tracing::debug!(user_id = %user_id, "Serving cached proposals");
                return Ok(cached.clone());
            }
        }

        let slots = schedule.schedule_for(&profile.tv_types, Day::Today).await?;
        let proposals = self.select(&profile, &slots).await?;

        profile.proposals = Some(proposals.clone());
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %user_id, proposals = proposals.len(), "Proposals computed");
        self.sink.proposal_ready(user_id);
        Ok(proposals)
    }

    /// Scores and ranks one schedule snapshot against one taste profile.
    ///
    /// Slots that cannot be matched to a catalog movie are skipped and
    /// logged; ranking is by descending score, ties broken by earliest
    /// broadcast time then lexicographic title. With no signal at all the
    /// fallback strategy picks among the matched slots instead.
    pub async fn select(
        &self,
        profile: &UserProfile,
        slots: &[BroadcastSlot],
    ) -> AppResult<Vec<Proposal>> {
        let mut candidates: Vec<(f64, &BroadcastSlot, Movie)> = Vec::new();

        for slot in slots {
            let movie = match self
                .resolver
                .movie_by_title(slot.title.clone(), slot.original_title.clone())
                .await
            {
                Ok(movie) => movie,
                Err(AppError::NotFound(_) | AppError::Retrieval(_)) => {
                    tracing::warn!(
                        channel = %slot.channel,
                        title = %slot.sort_title(),
                        "Skipping schedule slot with no catalog match"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            };
            let score = self.score(profile, &movie).await?;
            candidates.push((score, slot, movie));
        }

        let has_signal = candidates.iter().any(|(score, ..)| *score > 0.0);
        let selected: Vec<&(f64, &BroadcastSlot, Movie)> = if has_signal {
            let mut ranked: Vec<&(f64, &BroadcastSlot, Movie)> = candidates.iter().collect();
            ranked.sort_by(|a, b| rank(a, b));
            ranked.into_iter().take(self.cap).collect()
        } else {
            tracing::info!(user_id = %profile.id, "No taste signal, falling back to sampling");
            self.fallback
                .pick(candidates.len(), self.cap)
                .into_iter()
                .filter_map(|index| candidates.get(index))
                .collect()
        };

        Ok(selected
            .into_iter()
            .map(|(_, slot, movie)| proposal_entry(slot, movie))
            .collect())
    }

    /// Drops the cached proposal list so the next read recomputes
    pub async fn clear(&self, user_id: &str) -> AppResult<()> {
        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;
        profile.proposals = None;
        self.store.put_profile(profile).await?;
        tracing::debug!(user_id = %user_id, "Proposals cleared");
        Ok(())
    }

    /// Clears every user's cached proposal list, returning how many
    pub async fn clear_all(&self) -> AppResult<usize> {
        let user_ids = self.store.profile_ids().await?;
        let count = user_ids.len();
        for user_id in user_ids {
            self.clear(&user_id).await?;
        }
        tracing::info!(users = count, "Proposals cleared for all users");
        Ok(count)
    }

    /// Weighted taste score of one movie for one profile.
    ///
    /// Sum of role-weighted record weights over cast, directors, writers,
    /// and genres; contributors without a record count zero.
    async fn score(&self, profile: &UserProfile, movie: &Movie) -> AppResult<f64> {
        let mut score = 0.0;
        for id in &movie.actors {
            score += ACTOR_WEIGHT * self.weight(profile, TasteKind::Artist, id.as_str()).await?;
        }
        for id in &movie.directors {
            score += DIRECTOR_WEIGHT * self.weight(profile, TasteKind::Artist, id.as_str()).await?;
        }
        for id in &movie.writers {
            score += WRITER_WEIGHT * self.weight(profile, TasteKind::Artist, id.as_str()).await?;
        }
        for genre in &movie.genres {
            score += GENRE_WEIGHT * self.weight(profile, TasteKind::Genre, genre).await?;
        }
        Ok(score)
    }

    async fn weight(
        &self,
        profile: &UserProfile,
        kind: TasteKind,
        entity_key: &str,
    ) -> AppResult<f64> {
        let key = TasteKey::new(&profile.id, entity_key, kind);
        Ok(self
            .store
            .record(&key)
            .await?
            .map(|record| record.weight)
            .unwrap_or(0.0))
    }
}

fn rank(a: &(f64, &BroadcastSlot, Movie), b: &(f64, &BroadcastSlot, Movie)) -> Ordering {
    b.0.partial_cmp(&a.0)
        .unwrap_or(Ordering::Equal)
        .then_with(|| time_key(a.1).cmp(&time_key(b.1)))
        .then_with(|| a.1.sort_title().cmp(b.1.sort_title()))
}

/// Unparsable broadcast times sort after every valid one
fn time_key(slot: &BroadcastSlot) -> (bool, u32) {
    match slot.time_minutes() {
        Some(minutes) => (false, minutes),
        None => (true, 0),
    }
}

fn proposal_entry(slot: &BroadcastSlot, movie: &Movie) -> Proposal {
    Proposal {
        id_imdb: movie.id.clone(),
        original_title: movie.original_or_title().map(str::to_string),
        title: movie.title_or_original().map(str::to_string),
        poster: movie.poster.clone(),
        channel: slot.channel.clone(),
        channel_number: channel_number(&slot.channel),
        time: slot.time.clone(),
        run_times: movie.run_times.clone(),
        simple_plot: movie.simple_plot.clone(),
    }
}
