//! Encore Playback
//!
//! The per-user player state machine for the Encore platform.
//!
//! This crate provides:
//! - Player state transitions (play, pause, resume, stop, seek)
//! - Queue navigation (next, previous) with repeat modes (off, one, all)
//! - Reversible shuffle that pins the currently playing entry first
//! - Queue mutation (replace, append, remove with renumbering)
//! - Write-through play history for every song start
//!
//! # Architecture
//!
//! All state lives in the `encore-storage` tables; this crate holds no
//! in-process playback state beyond the per-user lock registry. Song
//! metadata and user existence are resolved through the `encore-core`
//! collaborator traits, so the engine never touches catalog or account
//! persistence directly.
//!
//! Operations for the same user are serialized through a per-user async
//! mutex: `next`, `previous`, shuffle, and queue renumbering are
//! read-then-multi-write sequences that are not safe under
//! interleaving. Operations for different users never contend.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use encore_core::types::{SongId, UserId};
//! use encore_core::{SongCatalog, UserDirectory};
//! use encore_playback::PlayerService;
//!
//! # async fn example(
//! #     catalog: Arc<dyn SongCatalog>,
//! #     users: Arc<dyn UserDirectory>,
//! # ) -> encore_core::Result<()> {
//! let pool = encore_storage::create_pool("sqlite://encore.db")
//!     .await
//!     .map_err(|e| encore_core::EncoreError::storage(e.to_string()))?;
//! let player = PlayerService::new(pool, catalog, users);
//!
//! let user = UserId::new("user-1");
//! let queue = vec![SongId::new("a"), SongId::new("b"), SongId::new("c")];
//! let now_playing = player.play_song(&user, &SongId::new("a"), Some(queue)).await?;
//! assert!(now_playing.state.is_playing);
//!
//! let next = player.next(&user).await?;
//! assert_eq!(next.song.id, SongId::new("b"));
//! # Ok(())
//! # }
//! ```

mod config;
mod locks;
mod service;
mod types;

// Public exports
pub use config::PlayerConfig;
pub use service::PlayerService;
pub use types::{NowPlaying, QueueView};
