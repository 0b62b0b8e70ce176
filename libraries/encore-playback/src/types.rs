//! Result types returned by player operations

use encore_core::types::{PlayerState, QueueEntry, Song};
use serde::{Deserialize, Serialize};

/// Player state plus resolved metadata for the song now sounding
///
/// Returned by every operation that starts or changes the current song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// The state after the transition
    pub state: PlayerState,
    /// Metadata for the current song
    pub song: Song,
}

/// Ordered queue snapshot with the index of the current song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueView {
    /// Entries ordered by position
    pub entries: Vec<QueueEntry>,
    /// Index of the current song within `entries`, when it is enqueued
    pub current_index: Option<usize>,
}
