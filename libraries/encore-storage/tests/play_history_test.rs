//! Integration tests for the play history store

use encore_core::types::{SongId, UserId};
use encore_storage::play_history;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory database");
    encore_storage::run_migrations(&pool)
        .await
        .expect("run migrations");
    pool
}

#[tokio::test]
async fn replay_overwrites_timestamp_instead_of_inserting() {
    let pool = memory_pool().await;
    let user = UserId::new("u1");
    let song = SongId::new("s1");

    play_history::upsert(&pool, &user, &song, 1_000).await.unwrap();
    play_history::upsert(&pool, &user, &song, 2_000).await.unwrap();

    let records = play_history::list_by_user(&pool, &user).await.unwrap();
    assert_eq!(records.len(), 1, "replays must not create a second row");
    assert_eq!(records[0].played_at, 2_000);
}

#[tokio::test]
async fn list_orders_by_recency() {
    let pool = memory_pool().await;
    let user = UserId::new("u1");

    play_history::upsert(&pool, &user, &SongId::new("old"), 100).await.unwrap();
    play_history::upsert(&pool, &user, &SongId::new("new"), 300).await.unwrap();
    play_history::upsert(&pool, &user, &SongId::new("mid"), 200).await.unwrap();

    let records = play_history::list_by_user(&pool, &user).await.unwrap();
    let order: Vec<&str> = records.iter().map(|r| r.song_id.as_str()).collect();
    assert_eq!(order, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn get_returns_none_for_unplayed_song() {
    let pool = memory_pool().await;
    let user = UserId::new("u1");

    let record = play_history::get(&pool, &user, &SongId::new("never")).await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn listener_count_counts_distinct_users_not_plays() {
    let pool = memory_pool().await;
    let song = SongId::new("hit");

    // Alice plays the song three times, Bob once
    let alice = UserId::new("alice");
    play_history::upsert(&pool, &alice, &song, 100).await.unwrap();
    play_history::upsert(&pool, &alice, &song, 200).await.unwrap();
    play_history::upsert(&pool, &alice, &song, 300).await.unwrap();
    play_history::upsert(&pool, &UserId::new("bob"), &song, 150).await.unwrap();

    assert_eq!(play_history::listener_count(&pool, &song).await.unwrap(), 2);
}

#[tokio::test]
async fn histories_are_isolated_per_user() {
    let pool = memory_pool().await;

    play_history::upsert(&pool, &UserId::new("alice"), &SongId::new("a"), 100)
        .await
        .unwrap();

    let records = play_history::list_by_user(&pool, &UserId::new("bob")).await.unwrap();
    assert!(records.is_empty());
}
