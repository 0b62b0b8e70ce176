//! Encore Storage
//!
//! `SQLite` persistence for the three stores the playback engine owns:
//! per-user player state, the ordered play queue, and the play history.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each store owns its own queries and logic
//! - **Multi-User**: every row is keyed by user id; cross-user rows never interact
//! - **Transactional**: every read-then-multi-write queue sequence runs
//!   inside a single transaction (replace, append, remove-and-renumber,
//!   shuffle reordering)
//!
//! Song and user persistence belong to the wider platform and are NOT
//! stored here; the engine reaches them through the `encore-core`
//! collaborator traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_storage::{create_pool, run_migrations};
//! use encore_core::types::UserId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://encore.db").await?;
//! run_migrations(&pool).await?;
//!
//! let queue = encore_storage::play_queue::list(&pool, &UserId::new("user-1")).await?;
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod play_history;
pub mod play_queue;
pub mod player_state;

pub use error::StorageError;

use sqlx::sqlite::SqlitePool;

/// Run database migrations
///
/// Embedded into the binary so they run reliably across execution
/// contexts. Call once at startup; every statement is idempotent.
///
/// # Errors
///
/// Returns an error if a migration statement fails
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    const MIGRATIONS: &[&str] = &[
        include_str!("../migrations/20250601000001_create_player_state.sql"),
        include_str!("../migrations/20250601000002_create_play_queue.sql"),
        include_str!("../migrations/20250601000003_create_play_history.sql"),
    ];

    for migration in MIGRATIONS {
        sqlx::raw_sql(migration)
            .execute(pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
    }

    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://encore.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Bounds every store call; expiry surfaces as a database error
        // the caller may retry.
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
