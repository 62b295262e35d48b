use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EntityId, Proposal, TasteKind, TasteView, TvType};

/// Cache state of a profile's denormalized taste view.
///
/// `Fresh` views are served as-is with no record reads; `Stale` forces a
/// full rebuild on the next read. All transitions go through the taste
/// aggregator so invalidation is not scattered across call sites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum TasteViewCache {
    #[default]
    Stale,
    Fresh(TasteView),
}

impl TasteViewCache {
    pub fn is_fresh(&self) -> bool {
        matches!(self, TasteViewCache::Fresh(_))
    }

    pub fn fresh(&self) -> Option<&TasteView> {
        match self {
            TasteViewCache::Fresh(view) => Some(view),
            TasteViewCache::Stale => None,
        }
    }

    pub fn fresh_mut(&mut self) -> Option<&mut TasteView> {
        match self {
            TasteViewCache::Fresh(view) => Some(view),
            TasteViewCache::Stale => None,
        }
    }

    pub fn invalidate(&mut self) {
        *self = TasteViewCache::Stale;
    }
}

/// Watched-history entry as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    #[serde(rename = "idIMDB")]
    pub id_imdb: String,
    pub original_title: Option<String>,
    pub title: Option<String>,
    pub poster: Option<String>,
    /// Watch date, `dd-mm-YYYY`
    pub date: String,
    pub tasted: u8,
}

/// Per-user state: identity, settings, taste references, watched history,
/// and the two caches (taste view, proposal list).
///
/// The per-kind taste lists hold keys into the record store in insertion
/// order, without duplicates. Detaching a taste removes the key but the
/// record itself is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
    pub push_key: Option<String>,
    pub tv_types: Vec<TvType>,
    pub repeat_choice: bool,
    pub enable_notification: bool,
    /// Preferred notification time, milliseconds since midnight
    pub time_notification_ms: i64,
    pub artist_tastes: Vec<EntityId>,
    pub movie_tastes: Vec<EntityId>,
    pub genre_tastes: Vec<String>,
    pub watched: Vec<EntityId>,
    pub watched_dates: Vec<NaiveDate>,
    pub proposals: Option<Vec<Proposal>>,
    pub taste_view: TasteViewCache,
}

impl UserProfile {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            birth_year: None,
            gender: None,
            push_key: None,
            tv_types: vec![TvType::Free],
            repeat_choice: false,
            enable_notification: true,
            time_notification_ms: 20 * 3_600_000,
            artist_tastes: Vec::new(),
            movie_tastes: Vec::new(),
            genre_tastes: Vec::new(),
            watched: Vec::new(),
            watched_dates: Vec::new(),
            proposals: None,
            taste_view: TasteViewCache::default(),
        }
    }

    /// Entity keys referenced by the per-kind taste list
    pub fn taste_keys(&self, kind: TasteKind) -> Vec<String> {
        match kind {
            TasteKind::Artist => self.artist_tastes.iter().map(|id| id.to_string()).collect(),
            TasteKind::Movie => self.movie_tastes.iter().map(|id| id.to_string()).collect(),
            TasteKind::Genre => self.genre_tastes.clone(),
        }
    }

    /// Attaches a taste key to the per-kind list, keeping it duplicate-free
    pub fn attach_taste(&mut self, kind: TasteKind, key: &str) {
        match kind {
            TasteKind::Artist => attach_id(&mut self.artist_tastes, key),
            TasteKind::Movie => attach_id(&mut self.movie_tastes, key),
            TasteKind::Genre => {
                if !self.genre_tastes.iter().any(|g| g == key) {
                    self.genre_tastes.push(key.to_string());
                }
            }
        }
    }

    /// Detaches a taste key; returns whether it was attached
    pub fn detach_taste(&mut self, kind: TasteKind, key: &str) -> bool {
        match kind {
            TasteKind::Artist => detach_id(&mut self.artist_tastes, key),
            TasteKind::Movie => detach_id(&mut self.movie_tastes, key),
            TasteKind::Genre => {
                let before = self.genre_tastes.len();
                self.genre_tastes.retain(|g| g != key);
                self.genre_tastes.len() != before
            }
        }
    }

    /// Appends a watched movie, keeping the id and date lists index-aligned
    pub fn add_watched(&mut self, id: EntityId, date: NaiveDate) {
        self.watched.push(id);
        self.watched_dates.push(date);
        debug_assert_eq!(self.watched.len(), self.watched_dates.len());
    }
}

fn attach_id(list: &mut Vec<EntityId>, key: &str) {
    if !list.iter().any(|id| id.as_str() == key) {
        list.push(EntityId::from_key(key));
    }
}

fn detach_id(list: &mut Vec<EntityId>, key: &str) -> bool {
    let before = list.len();
    list.retain(|id| id.as_str() != key);
    list.len() != before
}
