//! Configuration for the player service

use encore_core::types::{PlayerState, RepeatMode, UserId};
use serde::{Deserialize, Serialize};

/// Defaults applied when a user's player state is created lazily
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 80)
    pub default_volume: i32,

    /// Initial repeat mode (default: off)
    pub default_repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub default_shuffle: bool,
}

impl PlayerConfig {
    /// The state a user gets before their first playback-affecting call
    pub(crate) fn initial_state(&self, user_id: UserId) -> PlayerState {
        PlayerState {
            volume: self.default_volume,
            repeat_mode: self.default_repeat,
            shuffle_enabled: self.default_shuffle,
            ..PlayerState::for_user(user_id)
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: 80,
            default_repeat: RepeatMode::Off,
            default_shuffle: false,
        }
    }
}
