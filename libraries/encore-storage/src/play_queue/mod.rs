//! Ordered play queue persistence
//!
//! Positions are 1-based and dense per user: the set of positions is
//! exactly `{1..N}` before and after every mutating operation. Each
//! multi-row mutation here runs inside a single transaction so that
//! concurrent readers never observe duplicate or gapped positions.

use crate::error::StorageError;
use encore_core::types::{QueueEntry, SongId, UserId};
use sqlx::{Row, SqlitePool};

type Result<T> = std::result::Result<T, StorageError>;

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> QueueEntry {
    QueueEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        song_id: row.get("song_id"),
        position: row.get("position"),
        original_position: row.get("original_position"),
        added_at: row.get("added_at"),
    }
}

/// List a user's queue, ordered by position
pub async fn list(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<QueueEntry>> {
    let rows = sqlx::query(
        "SELECT id, user_id, song_id, position, original_position, added_at
         FROM play_queue WHERE user_id = ?
         ORDER BY position",
    )
    .bind(user_id.clone())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(entry_from_row).collect())
}

/// Number of entries in a user's queue
pub async fn count(pool: &SqlitePool, user_id: &UserId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM play_queue WHERE user_id = ?")
        .bind(user_id.clone())
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Replace a user's entire queue with the given songs
///
/// Deletes every existing entry and inserts the new ones at positions
/// `1..N` with `original_position = position`.
pub async fn replace(
    pool: &SqlitePool,
    user_id: &UserId,
    song_ids: &[SongId],
) -> Result<Vec<QueueEntry>> {
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM play_queue WHERE user_id = ?")
        .bind(user_id.clone())
        .execute(&mut *tx)
        .await?;

    for (index, song_id) in song_ids.iter().enumerate() {
        let position = index as i64 + 1;
        sqlx::query(
            "INSERT INTO play_queue (user_id, song_id, position, original_position, added_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id.clone())
        .bind(song_id.clone())
        .bind(position)
        .bind(position)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    list(pool, user_id).await
}

/// Append a song at the end of a user's queue
///
/// The entry gets `position = N + 1` and `original_position` equal to
/// that same assigned position, regardless of any shuffle in effect.
pub async fn append(pool: &SqlitePool, user_id: &UserId, song_id: &SongId) -> Result<QueueEntry> {
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    let max_position: Option<i64> =
        sqlx::query_scalar("SELECT MAX(position) FROM play_queue WHERE user_id = ?")
            .bind(user_id.clone())
            .fetch_one(&mut *tx)
            .await?;

    let position = max_position.unwrap_or(0) + 1;

    let result = sqlx::query(
        "INSERT INTO play_queue (user_id, song_id, position, original_position, added_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id.clone())
    .bind(song_id.clone())
    .bind(position)
    .bind(position)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();

    tx.commit().await?;

    Ok(QueueEntry {
        id,
        user_id: user_id.clone(),
        song_id: song_id.clone(),
        position,
        original_position: position,
        added_at: now,
    })
}

/// Remove the entry at the given position and renumber the rest
///
/// Remaining entries keep their relative order and are shifted down to
/// close the gap. Returns `false` when no entry exists at the position
/// (a no-op, not an error).
pub async fn remove_at(pool: &SqlitePool, user_id: &UserId, position: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM play_queue WHERE user_id = ? AND position = ?")
        .bind(user_id.clone())
        .bind(position)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE play_queue SET position = position - 1 WHERE user_id = ? AND position > ?")
        .bind(user_id.clone())
        .bind(position)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}

/// Delete a user's entire queue
pub async fn clear(pool: &SqlitePool, user_id: &UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM play_queue WHERE user_id = ?")
        .bind(user_id.clone())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Rewrite positions for a set of entries in one transaction
///
/// Used by shuffle: each assignment is `(entry id, position,
/// original_position)`. Entries not listed are left untouched.
pub async fn update_positions(
    pool: &SqlitePool,
    user_id: &UserId,
    assignments: &[(i64, i64, i64)],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for &(id, position, original_position) in assignments {
        sqlx::query(
            "UPDATE play_queue SET position = ?, original_position = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(position)
        .bind(original_position)
        .bind(id)
        .bind(user_id.clone())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Restore every entry to its pre-shuffle position
///
/// The stored `original_position` values already form a valid dense
/// ordering, so a single rewrite suffices.
pub async fn restore_original_order(pool: &SqlitePool, user_id: &UserId) -> Result<()> {
    sqlx::query("UPDATE play_queue SET position = original_position WHERE user_id = ?")
        .bind(user_id.clone())
        .execute(pool)
        .await?;

    Ok(())
}
