//! Song catalog types

use super::genre::GenreId;
use super::ids::{SongId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Song visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongVisibility {
    /// Visible and playable by everyone
    #[default]
    Public,
    /// Playable only by the owning user
    Private,
}

impl SongVisibility {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Immutable song metadata, resolved from the song catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier
    pub id: SongId,
    /// Song title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Duration in seconds
    pub duration_secs: i64,
    /// Genre, when tagged
    pub genre_id: Option<GenreId>,
    /// Uploading user
    pub owner_id: UserId,
    /// Visibility (private songs are playable only by their owner)
    pub visibility: SongVisibility,
    /// Upload time
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// Whether this song is hidden from everyone but its owner
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility == SongVisibility::Private
    }
}
