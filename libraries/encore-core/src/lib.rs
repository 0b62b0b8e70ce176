//! Encore Core
//!
//! Domain types, traits, and error handling for the Encore playback engine.
//!
//! This crate provides the foundational building blocks shared by the
//! storage, playback, and discovery crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `Genre`, `User`, `PlayerState`, `QueueEntry`, `PlayRecord`
//! - **Collaborator Traits**: `SongCatalog`, `UserDirectory`
//! - **Error Handling**: Unified `EncoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use encore_core::types::{RepeatMode, PlayerState, UserId};
//!
//! // Player state for a user who has never pressed play: stopped,
//! // volume 80, repeat off, shuffle off.
//! let state = PlayerState::for_user(UserId::new("user-1"));
//! assert_eq!(state.volume, 80);
//! assert_eq!(state.repeat_mode, RepeatMode::Off);
//! assert!(!state.is_playing && !state.is_paused);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{EncoreError, Result};
pub use traits::{SongCatalog, UserDirectory};

// Export all types
pub use types::{
    // User
    User,
    // Catalog entities
    Song, SongVisibility,
    Genre, GenreId,
    // Player state and queue
    PlaybackStatus, PlayerState, QueueEntry, PlayRecord, RepeatMode,
    // Identifiers
    SongId, UserId,
};
