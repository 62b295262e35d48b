pub mod entity;
pub mod profile;
pub mod schedule;
pub mod taste;
pub mod taste_view;

pub use entity::{Artist, EntityId, Movie};
pub use profile::{TasteViewCache, UserProfile, WatchedEntry};
pub use schedule::{channel_number, BroadcastSlot, Day, Proposal, TvType};
pub use taste::{TasteKey, TasteKind, TasteRecord, GENRES};
pub use taste_view::{ArtistEntry, GenreEntry, MovieEntry, TasteView};
