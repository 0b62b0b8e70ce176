//! End-to-end tests for the player state machine
//!
//! Runs against an in-memory SQLite store and in-memory catalog/user
//! fakes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use encore_core::error::{EncoreError, Result};
use encore_core::types::{Genre, GenreId, RepeatMode, Song, SongId, SongVisibility, UserId};
use encore_core::{SongCatalog, UserDirectory};
use encore_playback::PlayerService;

struct FakeCatalog {
    songs: HashMap<SongId, Song>,
}

impl FakeCatalog {
    fn new(songs: Vec<Song>) -> Self {
        Self {
            songs: songs.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }
}

#[async_trait]
impl SongCatalog for FakeCatalog {
    async fn get_song(&self, id: &SongId) -> Result<Option<Song>> {
        Ok(self.songs.get(id).cloned())
    }

    async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>> {
        Ok(Some(Genre {
            id,
            name: format!("genre-{id}"),
        }))
    }

    async fn list_public_by_genre(&self, genre_id: GenreId, limit: u32) -> Result<Vec<Song>> {
        let mut songs: Vec<Song> = self
            .songs
            .values()
            .filter(|s| s.genre_id == Some(genre_id) && s.visibility == SongVisibility::Public)
            .cloned()
            .collect();
        songs.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        songs.truncate(limit as usize);
        Ok(songs)
    }
}

struct FakeDirectory {
    users: HashSet<UserId>,
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn user_exists(&self, id: &UserId) -> Result<bool> {
        Ok(self.users.contains(id))
    }
}

fn public_song(id: &str) -> Song {
    Song {
        id: SongId::new(id),
        title: format!("Song {id}"),
        artist: "Test Artist".to_string(),
        duration_secs: 180,
        genre_id: None,
        owner_id: UserId::new("uploader"),
        visibility: SongVisibility::Public,
        created_at: Utc::now(),
    }
}

fn private_song(id: &str, owner: &str) -> Song {
    Song {
        owner_id: UserId::new(owner),
        visibility: SongVisibility::Private,
        ..public_song(id)
    }
}

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

async fn player_with(songs: Vec<Song>, users: &[&str]) -> PlayerService {
    let pool = memory_pool().await;
    let catalog = Arc::new(FakeCatalog::new(songs));
    let directory = Arc::new(FakeDirectory {
        users: users.iter().map(|u| UserId::new(*u)).collect(),
    });
    PlayerService::new(pool, catalog, directory)
}

fn ids(raw: &[&str]) -> Vec<SongId> {
    raw.iter().map(|id| SongId::new(*id)).collect()
}

#[tokio::test]
async fn play_with_queue_then_navigate_shuffle_and_restore() {
    let player = player_with(
        vec![public_song("s"), public_song("t"), public_song("x")],
        &["u1"],
    )
    .await;
    let user = UserId::new("u1");

    // Play S with an explicit queue [S, T, X]
    let playing = player
        .play_song(&user, &SongId::new("s"), Some(ids(&["s", "t", "x"])))
        .await
        .unwrap();
    assert_eq!(playing.state.current_song_id, Some(SongId::new("s")));
    assert!(playing.state.is_playing);
    assert!(!playing.state.is_paused);
    assert_eq!(playing.state.position_secs, 0);

    let queue = player.get_queue(&user).await.unwrap();
    let positions: Vec<(&str, i64)> = queue
        .entries
        .iter()
        .map(|e| (e.song_id.as_str(), e.position))
        .collect();
    assert_eq!(positions, vec![("s", 1), ("t", 2), ("x", 3)]);
    assert_eq!(queue.current_index, Some(0));

    let history = player.recently_played(&user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song_id.as_str(), "s");

    // Advance: T becomes current, history grows to {S, T}
    let next = player.next(&user).await.unwrap();
    assert_eq!(next.song.id.as_str(), "t");

    let history = player.recently_played(&user).await.unwrap();
    let played: HashSet<&str> = history.iter().map(|r| r.song_id.as_str()).collect();
    assert_eq!(played, HashSet::from(["s", "t"]));

    // Shuffle on: T (now current) pinned first, S and X across 2-3
    player.set_shuffle(&user, true).await.unwrap();
    let queue = player.get_queue(&user).await.unwrap();
    assert_eq!(queue.entries[0].song_id.as_str(), "t");
    assert_eq!(queue.current_index, Some(0));
    let tail: HashSet<&str> = queue.entries[1..]
        .iter()
        .map(|e| e.song_id.as_str())
        .collect();
    assert_eq!(tail, HashSet::from(["s", "x"]));

    // Shuffle off: original order restored
    player.set_shuffle(&user, false).await.unwrap();
    let queue = player.get_queue(&user).await.unwrap();
    let positions: Vec<(&str, i64)> = queue
        .entries
        .iter()
        .map(|e| (e.song_id.as_str(), e.position))
        .collect();
    assert_eq!(positions, vec![("s", 1), ("t", 2), ("x", 3)]);
}

#[tokio::test]
async fn pause_and_resume_require_matching_state() {
    let player = player_with(vec![public_song("a")], &["u1"]).await;
    let user = UserId::new("u1");

    // Pause with nothing playing
    let err = player.pause(&user).await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidState(_)));

    player.play_song(&user, &SongId::new("a"), None).await.unwrap();

    // Resume while already playing (not paused)
    let err = player.resume(&user).await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidState(_)));

    let state = player.pause(&user).await.unwrap();
    assert!(!state.is_playing);
    assert!(state.is_paused);

    let state = player.resume(&user).await.unwrap();
    assert!(state.is_playing);
    assert!(!state.is_paused);
}

#[tokio::test]
async fn out_of_range_volume_is_rejected_and_state_unchanged() {
    let player = player_with(vec![], &["u1"]).await;
    let user = UserId::new("u1");

    let err = player.set_volume(&user, 150).await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidInput(_)));
    let err = player.set_volume(&user, -5).await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidInput(_)));

    // Default volume survives the failed calls
    assert_eq!(player.get_state(&user).await.unwrap().volume, 80);

    let state = player.set_volume(&user, 35).await.unwrap();
    assert_eq!(state.volume, 35);
}

#[tokio::test]
async fn seek_rejects_negative_and_stores_past_end_verbatim() {
    let player = player_with(vec![public_song("a")], &["u1"]).await;
    let user = UserId::new("u1");

    let err = player.seek(&user, -1).await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidInput(_)));

    player.play_song(&user, &SongId::new("a"), None).await.unwrap();

    // The song is 180s long; offsets past the end are not clamped
    let state = player.seek(&user, 9_999).await.unwrap();
    assert_eq!(state.position_secs, 9_999);
}

#[tokio::test]
async fn repeat_one_restarts_current_song_without_touching_queue_or_history() {
    let player = player_with(vec![public_song("a"), public_song("b")], &["u1"]).await;
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("a"), Some(ids(&["a", "b"])))
        .await
        .unwrap();
    player.set_repeat_mode(&user, RepeatMode::One).await.unwrap();
    player.seek(&user, 42).await.unwrap();

    for _ in 0..3 {
        let now = player.next(&user).await.unwrap();
        assert_eq!(now.song.id.as_str(), "a");
        assert_eq!(now.state.position_secs, 0);
    }

    // Queue untouched, history still only the original play
    let queue = player.get_queue(&user).await.unwrap();
    assert_eq!(queue.entries.len(), 2);
    let history = player.recently_played(&user).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn repeat_all_wraps_in_both_directions() {
    let player = player_with(
        vec![public_song("a"), public_song("b"), public_song("c")],
        &["u1"],
    )
    .await;
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("c"), Some(ids(&["a", "b", "c"])))
        .await
        .unwrap();
    player.set_repeat_mode(&user, RepeatMode::All).await.unwrap();

    // From the last entry, next wraps to the first
    let now = player.next(&user).await.unwrap();
    assert_eq!(now.song.id.as_str(), "a");

    // From the first entry, previous wraps to the last
    let now = player.previous(&user).await.unwrap();
    assert_eq!(now.song.id.as_str(), "c");
}

#[tokio::test]
async fn exhausted_queue_without_repeat_fails_and_leaves_state_unchanged() {
    let player = player_with(vec![public_song("a"), public_song("b")], &["u1"]).await;
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("b"), Some(ids(&["a", "b"])))
        .await
        .unwrap();

    let err = player.next(&user).await.unwrap_err();
    assert!(matches!(err, EncoreError::QueueEmpty(_)));

    // The failed call changed nothing
    let state = player.get_state(&user).await.unwrap();
    assert_eq!(state.current_song_id, Some(SongId::new("b")));
    assert!(state.is_playing);
    let history = player.recently_played(&user).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn next_on_empty_queue_fails() {
    let player = player_with(vec![], &["u1"]).await;
    let user = UserId::new("u1");

    let err = player.next(&user).await.unwrap_err();
    assert!(matches!(err, EncoreError::QueueEmpty(_)));
}

#[tokio::test]
async fn next_without_current_song_starts_before_first_entry() {
    let player = player_with(vec![public_song("a"), public_song("b")], &["u1"]).await;
    let user = UserId::new("u1");

    player.add_to_queue(&user, &SongId::new("a")).await.unwrap();
    player.add_to_queue(&user, &SongId::new("b")).await.unwrap();

    let now = player.next(&user).await.unwrap();
    assert_eq!(now.song.id.as_str(), "a");
}

#[tokio::test]
async fn previous_without_current_song_fails_fast() {
    let player = player_with(vec![public_song("a")], &["u1"]).await;
    let user = UserId::new("u1");

    player.add_to_queue(&user, &SongId::new("a")).await.unwrap();

    let err = player.previous(&user).await.unwrap_err();
    assert!(matches!(err, EncoreError::InvalidState(_)));
}

#[tokio::test]
async fn replaying_a_song_keeps_a_single_history_record() {
    let player = player_with(vec![public_song("a")], &["u1"]).await;
    let user = UserId::new("u1");

    player.play_song(&user, &SongId::new("a"), None).await.unwrap();
    player.play_song(&user, &SongId::new("a"), None).await.unwrap();

    let history = player.recently_played(&user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song_id.as_str(), "a");
}

#[tokio::test]
async fn private_songs_are_playable_only_by_their_owner() {
    let player = player_with(vec![private_song("secret", "owner")], &["owner", "other"]).await;

    let err = player
        .play_song(&UserId::new("other"), &SongId::new("secret"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EncoreError::PermissionDenied(_)));

    let now = player
        .play_song(&UserId::new("owner"), &SongId::new("secret"), None)
        .await
        .unwrap();
    assert_eq!(now.song.id.as_str(), "secret");
}

#[tokio::test]
async fn unknown_user_and_song_fail_with_not_found() {
    let player = player_with(vec![public_song("a")], &["u1"]).await;

    let err = player
        .play_song(&UserId::new("ghost"), &SongId::new("a"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EncoreError::NotFound { .. }));

    let err = player
        .play_song(&UserId::new("u1"), &SongId::new("missing"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EncoreError::NotFound { .. }));
}

#[tokio::test]
async fn add_during_shuffle_takes_its_assigned_position_as_original() {
    let player = player_with(
        vec![public_song("a"), public_song("b"), public_song("x")],
        &["u1"],
    )
    .await;
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("a"), Some(ids(&["a", "b"])))
        .await
        .unwrap();
    player.set_shuffle(&user, true).await.unwrap();

    let entry = player.add_to_queue(&user, &SongId::new("x")).await.unwrap();
    assert_eq!(entry.position, 3);
    // Appended while shuffled: original equals the assigned position,
    // not any pre-shuffle baseline.
    assert_eq!(entry.original_position, 3);
}

#[tokio::test]
async fn remove_from_queue_renumbers_and_tolerates_missing_positions() {
    let player = player_with(
        vec![public_song("a"), public_song("b"), public_song("c")],
        &["u1"],
    )
    .await;
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("a"), Some(ids(&["a", "b", "c"])))
        .await
        .unwrap();

    player.remove_from_queue(&user, 2).await.unwrap();
    let queue = player.get_queue(&user).await.unwrap();
    let positions: Vec<(&str, i64)> = queue
        .entries
        .iter()
        .map(|e| (e.song_id.as_str(), e.position))
        .collect();
    assert_eq!(positions, vec![("a", 1), ("c", 2)]);

    // Absent position: no-op, not an error
    player.remove_from_queue(&user, 99).await.unwrap();
    assert_eq!(player.get_queue(&user).await.unwrap().entries.len(), 2);
}

#[tokio::test]
async fn stop_clears_playback_but_keeps_settings() {
    let player = player_with(vec![public_song("a")], &["u1"]).await;
    let user = UserId::new("u1");

    player.set_volume(&user, 55).await.unwrap();
    player.set_repeat_mode(&user, RepeatMode::All).await.unwrap();
    player.play_song(&user, &SongId::new("a"), None).await.unwrap();
    player.seek(&user, 90).await.unwrap();

    let state = player.stop(&user).await.unwrap();
    assert!(state.current_song_id.is_none());
    assert!(!state.is_playing);
    assert!(!state.is_paused);
    assert_eq!(state.position_secs, 0);
    assert_eq!(state.volume, 55);
    assert_eq!(state.repeat_mode, RepeatMode::All);
}

#[tokio::test]
async fn shuffle_with_empty_queue_only_sets_the_flag() {
    let player = player_with(vec![], &["u1"]).await;
    let user = UserId::new("u1");

    let state = player.set_shuffle(&user, true).await.unwrap();
    assert!(state.shuffle_enabled);

    let state = player.set_shuffle(&user, false).await.unwrap();
    assert!(!state.shuffle_enabled);
}

#[tokio::test]
async fn clear_queue_removes_every_entry() {
    let player = player_with(vec![public_song("a"), public_song("b")], &["u1"]).await;
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("a"), Some(ids(&["a", "b"])))
        .await
        .unwrap();

    let removed = player.clear_queue(&user).await.unwrap();
    assert_eq!(removed, 2);
    assert!(player.get_queue(&user).await.unwrap().entries.is_empty());
}

#[tokio::test]
async fn get_queue_reports_current_index_when_current_song_is_enqueued() {
    let player = player_with(vec![public_song("a"), public_song("b")], &["u1"]).await;
    let user = UserId::new("u1");

    // A song can be current without being enqueued
    player.play_song(&user, &SongId::new("a"), None).await.unwrap();
    player.add_to_queue(&user, &SongId::new("b")).await.unwrap();
    let queue = player.get_queue(&user).await.unwrap();
    assert_eq!(queue.current_index, None);

    player.add_to_queue(&user, &SongId::new("a")).await.unwrap();
    let queue = player.get_queue(&user).await.unwrap();
    assert_eq!(queue.current_index, Some(1));
}

#[tokio::test]
async fn concurrent_next_calls_never_skip_a_song() {
    let player = Arc::new(
        player_with(
            vec![
                public_song("a"),
                public_song("b"),
                public_song("c"),
                public_song("d"),
            ],
            &["u1"],
        )
        .await,
    );
    let user = UserId::new("u1");

    player
        .play_song(&user, &SongId::new("a"), Some(ids(&["a", "b", "c", "d"])))
        .await
        .unwrap();

    // Three racing next calls must land on three distinct songs
    let mut handles = Vec::new();
    for _ in 0..3 {
        let player = Arc::clone(&player);
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            player.next(&user).await.map(|now| now.song.id)
        }));
    }

    let mut landed = HashSet::new();
    for handle in handles {
        landed.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(landed.len(), 3, "concurrent next calls advanced to the same song");
}
