/// Collaborator traits for the Encore playback engine
///
/// The engine does not own song or user persistence; it consumes them
/// through these traits. Implementations live outside this workspace
/// (the platform's catalog and account services); tests use in-memory
/// fakes.
use crate::error::Result;
use crate::types::{Genre, GenreId, Song, SongId, UserId};
use async_trait::async_trait;

/// Read access to the song catalog
#[async_trait]
pub trait SongCatalog: Send + Sync {
    /// Resolve a song by id
    ///
    /// Returns `None` when the song does not exist.
    async fn get_song(&self, id: &SongId) -> Result<Option<Song>>;

    /// Resolve a genre by id
    async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>>;

    /// List public songs tagged with the given genre
    ///
    /// Ordering is the catalog's stable default; `limit` bounds the
    /// result size.
    async fn list_public_by_genre(&self, genre_id: GenreId, limit: u32) -> Result<Vec<Song>>;
}

/// Existence lookup against the platform's user accounts
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether a user with this id exists
    async fn user_exists(&self, id: &UserId) -> Result<bool>;
}
