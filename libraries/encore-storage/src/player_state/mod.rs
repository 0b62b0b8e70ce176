//! Per-user player state persistence
//!
//! One row per user, created lazily by the first playback-affecting
//! operation and never deleted (stop resets it in place).

use crate::error::StorageError;
use encore_core::types::{PlayerState, RepeatMode, SongId, UserId};
use sqlx::{Row, SqlitePool};

type Result<T> = std::result::Result<T, StorageError>;

fn state_from_row(row: &sqlx::sqlite::SqliteRow) -> PlayerState {
    PlayerState {
        user_id: row.get("user_id"),
        current_song_id: row.get::<Option<SongId>, _>("current_song_id"),
        is_playing: row.get::<i64, _>("is_playing") != 0,
        is_paused: row.get::<i64, _>("is_paused") != 0,
        position_secs: row.get("position_secs"),
        volume: row.get("volume"),
        shuffle_enabled: row.get::<i64, _>("shuffle_enabled") != 0,
        repeat_mode: RepeatMode::from_str(&row.get::<String, _>("repeat_mode"))
            .unwrap_or(RepeatMode::Off),
        updated_at: row.get("updated_at"),
    }
}

/// Get the player state for a user
///
/// Returns `None` when the user has never had a playback-affecting call.
pub async fn get(pool: &SqlitePool, user_id: &UserId) -> Result<Option<PlayerState>> {
    let row = sqlx::query(
        "SELECT user_id, current_song_id, is_playing, is_paused, position_secs,
                volume, shuffle_enabled, repeat_mode, updated_at
         FROM player_state WHERE user_id = ?",
    )
    .bind(user_id.clone())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| state_from_row(&r)))
}

/// Create or update the player state row
///
/// Writes every field verbatim, `updated_at` included; callers refresh
/// the timestamp before persisting.
pub async fn upsert(pool: &SqlitePool, state: &PlayerState) -> Result<()> {
    let is_playing = i64::from(state.is_playing);
    let is_paused = i64::from(state.is_paused);
    let shuffle_enabled = i64::from(state.shuffle_enabled);

    sqlx::query(
        "INSERT INTO player_state
         (user_id, current_song_id, is_playing, is_paused, position_secs,
          volume, shuffle_enabled, repeat_mode, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(user_id)
         DO UPDATE SET
            current_song_id = excluded.current_song_id,
            is_playing = excluded.is_playing,
            is_paused = excluded.is_paused,
            position_secs = excluded.position_secs,
            volume = excluded.volume,
            shuffle_enabled = excluded.shuffle_enabled,
            repeat_mode = excluded.repeat_mode,
            updated_at = excluded.updated_at",
    )
    .bind(state.user_id.clone())
    .bind(state.current_song_id.clone())
    .bind(is_playing)
    .bind(is_paused)
    .bind(state.position_secs)
    .bind(state.volume)
    .bind(shuffle_enabled)
    .bind(state.repeat_mode.as_str())
    .bind(state.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}
