use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::TasteKind;

/// Catalog identifier for artists and movies
///
/// Artist ids are "nm" followed by seven digits, movie ids are "tt" followed
/// by seven digits. Anything else is rejected at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Parses and validates a raw catalog id
    pub fn parse(raw: &str) -> AppResult<Self> {
        if is_prefixed_id(raw, "nm") || is_prefixed_id(raw, "tt") {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::InvalidInput(format!(
                "{} is not a valid catalog id",
                raw
            )))
        }
    }

    /// Builds an id from a value already known to be well-formed (store keys)
    pub fn from_key(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Classifies the id by its prefix
    pub fn kind_hint(&self) -> Option<TasteKind> {
        if self.0.starts_with("nm") {
            Some(TasteKind::Artist)
        } else if self.0.starts_with("tt") {
            Some(TasteKind::Movie)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_prefixed_id(raw: &str, prefix: &str) -> bool {
    raw.len() == 9
        && raw.starts_with(prefix)
        && raw.as_bytes()[2..].iter().all(|b| b.is_ascii_digit())
}

/// Catalog record for a person (actor, director, or writer)
///
/// Populated by external retrieval; the engine treats it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: EntityId,
    pub name: Option<String>,
    pub photo: Option<String>,
}

/// Catalog record for a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: EntityId,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub poster: Option<String>,
    pub simple_plot: Option<String>,
    pub run_times: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub actors: Vec<EntityId>,
    #[serde(default)]
    pub directors: Vec<EntityId>,
    #[serde(default)]
    pub writers: Vec<EntityId>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Movie {
    /// Original title with the localized title as fallback
    pub fn original_or_title(&self) -> Option<&str> {
        self.original_title.as_deref().or(self.title.as_deref())
    }

    /// Localized title with the original title as fallback
    pub fn title_or_original(&self) -> Option<&str> {
        self.title.as_deref().or(self.original_title.as_deref())
    }
}
