//! Domain types for the Encore playback engine

mod genre;
mod ids;
mod player;
mod song;
mod user;

pub use genre::{Genre, GenreId};
pub use ids::{SongId, UserId};
pub use player::{PlaybackStatus, PlayerState, PlayRecord, QueueEntry, RepeatMode};
pub use song::{Song, SongVisibility};
pub use user::User;
