use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Artist, Movie};

/// Denormalized artist entry as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistEntry {
    #[serde(rename = "idIMDB")]
    pub id_imdb: String,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub tasted: u8,
}

impl From<&Artist> for ArtistEntry {
    fn from(artist: &Artist) -> Self {
        Self {
            id_imdb: artist.id.to_string(),
            name: artist.name.clone(),
            photo: artist.photo.clone(),
            tasted: 1,
        }
    }
}

/// Denormalized movie entry as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieEntry {
    #[serde(rename = "idIMDB")]
    pub id_imdb: String,
    pub original_title: Option<String>,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub tasted: u8,
}

impl From<&Movie> for MovieEntry {
    fn from(movie: &Movie) -> Self {
        Self {
            id_imdb: movie.id.to_string(),
            original_title: movie.original_or_title().map(str::to_string),
            title: movie.title_or_original().map(str::to_string),
            poster: movie.poster.clone(),
            tasted: 1,
        }
    }
}

/// Denormalized genre entry as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreEntry {
    pub name: String,
    pub tasted: u8,
}

impl GenreEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasted: 1,
        }
    }
}

/// Snapshot of a user's confirmed tastes, denormalized for client reads.
///
/// Entries are keyed by entity id (genre name for genres), so patching is a
/// structural map operation and iteration order is canonical: a patched view
/// is identical to one rebuilt from scratch, entry order included.
///
/// On the wire each map serializes as a plain array of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasteView {
    #[serde(with = "entry_seq")]
    pub artists: BTreeMap<String, ArtistEntry>,
    #[serde(with = "entry_seq")]
    pub movies: BTreeMap<String, MovieEntry>,
    #[serde(with = "entry_seq")]
    pub genres: BTreeMap<String, GenreEntry>,
}

impl TasteView {
    /// Inserts an artist entry; overwriting an equal entry is a no-op
    pub fn insert_artist(&mut self, entry: ArtistEntry) {
        self.artists.insert(entry.id_imdb.clone(), entry);
    }

    /// Removes an artist entry; an absent key is a no-op, not an error
    pub fn remove_artist(&mut self, id: &str) -> bool {
        self.artists.remove(id).is_some()
    }

    pub fn insert_movie(&mut self, entry: MovieEntry) {
        self.movies.insert(entry.id_imdb.clone(), entry);
    }

    pub fn remove_movie(&mut self, id: &str) -> bool {
        self.movies.remove(id).is_some()
    }

    pub fn insert_genre(&mut self, entry: GenreEntry) {
        self.genres.insert(entry.name.clone(), entry);
    }

    pub fn remove_genre(&mut self, name: &str) -> bool {
        self.genres.remove(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.movies.is_empty() && self.genres.is_empty()
    }
}

/// Serializes a keyed entry map as an array of entries and rebuilds the map
/// (keyed on each entry's own id) on deserialization.
mod entry_seq {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub trait Keyed {
        fn key(&self) -> String;
    }

    impl Keyed for super::ArtistEntry {
        fn key(&self) -> String {
            self.id_imdb.clone()
        }
    }

    impl Keyed for super::MovieEntry {
        fn key(&self) -> String {
            self.id_imdb.clone()
        }
    }

    impl Keyed for super::GenreEntry {
        fn key(&self) -> String {
            self.name.clone()
        }
    }

    pub fn serialize<S, T>(map: &BTreeMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Keyed,
    {
        let entries = Vec::<T>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|e| (e.key(), e)).collect())
    }
}
