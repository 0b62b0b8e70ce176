//! Play history persistence
//!
//! A last-played-at map keyed by (user, song): replaying a song
//! overwrites its timestamp instead of inserting a second row. Counting
//! rows here yields "distinct songs played" per user (or "distinct
//! listeners" per song), never a play count.

use crate::error::StorageError;
use encore_core::types::{PlayRecord, SongId, UserId};
use sqlx::{Row, SqlitePool};

type Result<T> = std::result::Result<T, StorageError>;

/// Record a play, overwriting the previous timestamp for the pair
pub async fn upsert(
    pool: &SqlitePool,
    user_id: &UserId,
    song_id: &SongId,
    played_at: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO play_history (user_id, song_id, played_at)
         VALUES (?, ?, ?)
         ON CONFLICT(user_id, song_id)
         DO UPDATE SET played_at = excluded.played_at",
    )
    .bind(user_id.clone())
    .bind(song_id.clone())
    .bind(played_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the record for a (user, song) pair, if the song was ever played
pub async fn get(
    pool: &SqlitePool,
    user_id: &UserId,
    song_id: &SongId,
) -> Result<Option<PlayRecord>> {
    let row = sqlx::query(
        "SELECT user_id, song_id, played_at
         FROM play_history WHERE user_id = ? AND song_id = ?",
    )
    .bind(user_id.clone())
    .bind(song_id.clone())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| PlayRecord {
        user_id: r.get("user_id"),
        song_id: r.get("song_id"),
        played_at: r.get("played_at"),
    }))
}

/// List a user's history, most recently played first
///
/// Returns the user's most recently played *distinct* songs, not a full
/// play log.
pub async fn list_by_user(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<PlayRecord>> {
    let rows = sqlx::query(
        "SELECT user_id, song_id, played_at
         FROM play_history WHERE user_id = ?
         ORDER BY played_at DESC",
    )
    .bind(user_id.clone())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| PlayRecord {
            user_id: r.get("user_id"),
            song_id: r.get("song_id"),
            played_at: r.get("played_at"),
        })
        .collect())
}

/// Number of distinct users who ever played this song
///
/// This is a listener count, not a play count: repeat plays by the same
/// user contribute a single row.
pub async fn listener_count(pool: &SqlitePool, song_id: &SongId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM play_history WHERE song_id = ?")
        .bind(song_id.clone())
        .fetch_one(pool)
        .await?;

    Ok(count)
}
