//! Player state, queue, and history types
use serde::{Deserialize, Serialize};

use super::ids::{SongId, UserId};
use crate::error::{EncoreError, Result};

/// Repeat mode for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the queue
    #[default]
    Off,
    /// Loop the current song
    One,
    /// Loop the whole queue
    All,
}

impl RepeatMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::One => "one",
            Self::All => "all",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" | "none" => Some(Self::Off),
            "one" => Some(Self::One),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Parse a repeat mode received at the API boundary.
    ///
    /// An absent value means "no repeat". Anything unrecognized is
    /// rejected rather than falling back to a default.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(Self::Off),
            Some(s) => Self::from_str(s)
                .ok_or_else(|| EncoreError::invalid_input(format!("unknown repeat mode: {s}"))),
        }
    }

    /// Human-readable label for presentation
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "Repeat off",
            Self::One => "Repeat current song",
            Self::All => "Repeat whole queue",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical playback status, derived from the `is_playing`/`is_paused` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No song loaded
    Stopped,
    /// Currently playing
    Playing,
    /// Paused mid-song
    Paused,
}

/// A user's player state, created lazily on first use
///
/// `is_playing` and `is_paused` are mutually exclusive; both false means
/// stopped. The derived [`PlaybackStatus`] is available via
/// [`PlayerState::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// User this state belongs to
    pub user_id: UserId,

    /// Currently loaded song (if any)
    pub current_song_id: Option<SongId>,

    /// Whether playback is currently playing
    pub is_playing: bool,

    /// Whether playback is paused mid-song
    pub is_paused: bool,

    /// Playback offset into the current song, in seconds
    pub position_secs: i64,

    /// Volume level (0-100)
    pub volume: i32,

    /// Whether shuffle is enabled
    pub shuffle_enabled: bool,

    /// Repeat mode
    pub repeat_mode: RepeatMode,

    /// Last update timestamp (Unix epoch seconds)
    pub updated_at: i64,
}

impl PlayerState {
    /// Default state for a user who has never pressed play
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Derive the logical playback status from the flag pair
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        if self.is_playing {
            PlaybackStatus::Playing
        } else if self.is_paused {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Stopped
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            user_id: UserId::new(""),
            current_song_id: None,
            is_playing: false,
            is_paused: false,
            position_secs: 0,
            volume: 80,
            shuffle_enabled: false,
            repeat_mode: RepeatMode::Off,
            updated_at: 0,
        }
    }
}

/// One entry in a user's play queue
///
/// `position` is 1-based and dense: the positions of a user's entries
/// always form exactly `{1..N}`. `original_position` is the position
/// recorded at the most recent shuffle boundary, used only to undo
/// shuffling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Stable row id
    pub id: i64,
    /// Owning user
    pub user_id: UserId,
    /// Queued song
    pub song_id: SongId,
    /// 1-based position within the user's queue
    pub position: i64,
    /// Position at the most recent shuffle boundary
    pub original_position: i64,
    /// Creation timestamp (Unix epoch seconds)
    pub added_at: i64,
}

/// Last-played-at marker for a (user, song) pair
///
/// This is NOT a play-count log: a user who plays the same song fifty
/// times has exactly one record, holding the most recent play time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    /// Listening user
    pub user_id: UserId,
    /// Played song
    pub song_id: SongId,
    /// Most recent play time (Unix epoch seconds)
    pub played_at: i64,
}
