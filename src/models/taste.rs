use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Weight contributed by each cast member of a watched movie
pub const ACTOR_WEIGHT: f64 = 0.3;
/// Weight contributed by each director of a watched movie
pub const DIRECTOR_WEIGHT: f64 = 0.4;
/// Weight contributed by each writer of a watched movie
pub const WRITER_WEIGHT: f64 = 0.3;
/// Weight contributed by each genre of a watched movie
pub const GENRE_WEIGHT: f64 = 0.25;

/// Tolerance applied to every threshold comparison so that repeated
/// add/remove cycles do not drift a record across the boundary.
pub const TASTE_EPS: f64 = 1e-9;

/// Genres accepted for genre tastes
pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Film-Noir",
    "History",
    "Horror",
    "Music",
    "Musical",
    "Mystery",
    "News",
    "Romance",
    "Sci-Fi",
    "Sport",
    "Thriller",
    "War",
    "Western",
];

/// The three kinds of taste a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TasteKind {
    Artist,
    Movie,
    Genre,
}

impl TasteKind {
    /// Weight at or above which a taste is confirmed and becomes visible
    pub fn threshold(self) -> f64 {
        match self {
            TasteKind::Artist | TasteKind::Movie => 1.0,
            TasteKind::Genre => 0.99,
        }
    }

    /// Whether a cumulative weight confirms a taste of this kind
    pub fn confirms(self, weight: f64) -> bool {
        weight >= self.threshold() - TASTE_EPS
    }
}

impl Display for TasteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TasteKind::Artist => "artist",
            TasteKind::Movie => "movie",
            TasteKind::Genre => "genre",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TasteKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(TasteKind::Artist),
            "movie" => Ok(TasteKind::Movie),
            "genre" => Ok(TasteKind::Genre),
            other => Err(AppError::InvalidInput(format!(
                "{} is not a taste kind",
                other
            ))),
        }
    }
}

/// Composite key of a taste record
///
/// For artist and movie tastes the entity key is the catalog id; for genre
/// tastes it is the genre name itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteKey {
    pub user_id: String,
    pub entity_key: String,
    pub kind: TasteKind,
}

impl TasteKey {
    pub fn new(user_id: &str, entity_key: &str, kind: TasteKind) -> Self {
        Self {
            user_id: user_id.to_string(),
            entity_key: entity_key.to_string(),
            kind,
        }
    }
}

/// Cumulative weighted taste of one user for one entity
///
/// Records are created on the first weight contribution and never physically
/// deleted; a record whose weight decays to zero stays around as an inert
/// row so repeated toggles stay idempotent and cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteRecord {
    pub key: TasteKey,
    pub weight: f64,
    pub added: bool,
}

impl TasteRecord {
    pub fn new(key: TasteKey) -> Self {
        Self {
            key,
            weight: 0.0,
            added: false,
        }
    }

    /// Applies a signed weight delta and recomputes the confirmation flag.
    ///
    /// Returns `true` when the flag flipped, which is the signal for the
    /// owning profile's taste view to be patched or invalidated.
    pub fn apply(&mut self, delta: f64) -> bool {
        let was_added = self.added;
        self.weight += delta;
        self.added = self.key.kind.confirms(self.weight);
        was_added != self.added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: TasteKind) -> TasteRecord {
        TasteRecord::new(TasteKey::new("user@example.com", "nm0000001", kind))
    }

    #[test]
    fn confirmation_thresholds_per_kind() {
        assert!(!TasteKind::Movie.confirms(0.99));
        assert!(TasteKind::Movie.confirms(1.0));
        assert!(!TasteKind::Artist.confirms(0.9));
        assert!(TasteKind::Artist.confirms(1.2));
        assert!(TasteKind::Genre.confirms(0.99));
        assert!(!TasteKind::Genre.confirms(0.5));
    }

    #[test]
    fn threshold_tolerates_float_rounding() {
        // Four genre contributions of 0.25 must sum to a confirmed taste
        // even though 0.25 * 4 is not exactly representable noise-free.
        let mut rec = record(TasteKind::Genre);
        for _ in 0..4 {
            rec.apply(GENRE_WEIGHT);
        }
        assert!(rec.added);
    }

    #[test]
    fn apply_reports_flips_only() {
        let mut rec = record(TasteKind::Artist);
        assert!(!rec.apply(0.4));
        assert!(rec.apply(0.6));
        assert!(rec.added);
        assert!(!rec.apply(0.5));
        assert!(rec.apply(-1.5));
        assert!(!rec.added);
    }

    #[test]
    fn add_then_remove_is_idempotent() {
        for kind in [TasteKind::Artist, TasteKind::Movie, TasteKind::Genre] {
            for w in [0.3, 1.0, 1.2, 2.5] {
                let mut rec = record(kind);
                let before = rec.added;
                rec.apply(w);
                rec.apply(-w);
                assert_eq!(rec.added, before, "kind {} weight {}", kind, w);
                assert!(rec.weight.abs() < TASTE_EPS);
            }
        }
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [TasteKind::Artist, TasteKind::Movie, TasteKind::Genre] {
            assert_eq!(kind.to_string().parse::<TasteKind>().unwrap(), kind);
        }
        assert!("all".parse::<TasteKind>().is_err());
        assert!("director".parse::<TasteKind>().is_err());
    }
}
