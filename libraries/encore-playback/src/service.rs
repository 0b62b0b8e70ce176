//! Player service - transition operations
//!
//! Every operation loads the user's state (creating the default on
//! first use), consults the queue when navigating, mutates state, and
//! writes through to the play history whenever the sounding song starts
//! or changes.

use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::thread_rng;
use sqlx::SqlitePool;
use tracing::debug;

use encore_core::error::{EncoreError, Result};
use encore_core::types::{PlayRecord, PlayerState, QueueEntry, RepeatMode, Song, SongId, UserId};
use encore_core::{SongCatalog, UserDirectory};
use encore_storage::{play_history, play_queue, player_state};

use crate::config::PlayerConfig;
use crate::locks::UserLocks;
use crate::types::{NowPlaying, QueueView};

/// The per-user player state machine
///
/// All methods require an existing user and fail with `NotFound`
/// otherwise. Mutating operations for the same user are serialized
/// through a per-user lock; operations for different users run
/// independently.
pub struct PlayerService {
    pool: SqlitePool,
    catalog: Arc<dyn SongCatalog>,
    users: Arc<dyn UserDirectory>,
    locks: UserLocks,
    config: PlayerConfig,
}

impl PlayerService {
    /// Create a player service with default configuration
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn SongCatalog>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self::with_config(pool, catalog, users, PlayerConfig::default())
    }

    /// Create a player service with explicit configuration
    pub fn with_config(
        pool: SqlitePool,
        catalog: Arc<dyn SongCatalog>,
        users: Arc<dyn UserDirectory>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            pool,
            catalog,
            users,
            locks: UserLocks::new(),
            config,
        }
    }

    /// Start playing a song, optionally replacing the whole queue
    ///
    /// A private song is playable only by its owner. When `queue` is
    /// given it replaces the user's entire queue, positions `1..N` in
    /// the given order.
    pub async fn play_song(
        &self,
        user_id: &UserId,
        song_id: &SongId,
        queue: Option<Vec<SongId>>,
    ) -> Result<NowPlaying> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let song = self.resolve_playable(user_id, song_id).await?;

        if let Some(song_ids) = queue {
            play_queue::replace(&self.pool, user_id, &song_ids).await?;
            debug!(user = %user_id, count = song_ids.len(), "queue replaced");
        }

        let mut state = self.load_state(user_id).await?;
        state.current_song_id = Some(song.id.clone());
        state.is_playing = true;
        state.is_paused = false;
        state.position_secs = 0;
        self.save_state(&mut state).await?;
        self.record_play(user_id, &song.id).await?;

        debug!(user = %user_id, song = %song.id, "playback started");
        Ok(NowPlaying { state, song })
    }

    /// Pause active playback
    ///
    /// Fails with `InvalidState` when nothing is playing.
    pub async fn pause(&self, user_id: &UserId) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        if !state.is_playing {
            return Err(EncoreError::invalid_state("no active playback to pause"));
        }
        state.is_playing = false;
        state.is_paused = true;
        self.save_state(&mut state).await?;
        Ok(state)
    }

    /// Resume paused playback
    ///
    /// Fails with `InvalidState` when nothing is paused.
    pub async fn resume(&self, user_id: &UserId) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        if !state.is_paused {
            return Err(EncoreError::invalid_state("no paused playback to resume"));
        }
        state.is_playing = true;
        state.is_paused = false;
        self.save_state(&mut state).await?;
        Ok(state)
    }

    /// Stop playback unconditionally
    ///
    /// Clears the current song and resets the offset; volume, shuffle,
    /// and repeat settings are kept.
    pub async fn stop(&self, user_id: &UserId) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        state.current_song_id = None;
        state.is_playing = false;
        state.is_paused = false;
        state.position_secs = 0;
        self.save_state(&mut state).await?;

        debug!(user = %user_id, "playback stopped");
        Ok(state)
    }

    /// Seek to an offset (seconds) within the current song
    ///
    /// The offset is stored verbatim; no clamping against the song
    /// duration is performed. Negative offsets are rejected.
    pub async fn seek(&self, user_id: &UserId, position_secs: i64) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        if position_secs < 0 {
            return Err(EncoreError::invalid_input(format!(
                "seek position must be non-negative, got {position_secs}"
            )));
        }
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        state.position_secs = position_secs;
        self.save_state(&mut state).await?;
        Ok(state)
    }

    /// Set the volume (0-100)
    ///
    /// Out-of-range values are rejected and leave the state untouched.
    pub async fn set_volume(&self, user_id: &UserId, volume: i32) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        if !(0..=100).contains(&volume) {
            return Err(EncoreError::invalid_input(format!(
                "volume must be between 0 and 100, got {volume}"
            )));
        }
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        state.volume = volume;
        self.save_state(&mut state).await?;
        Ok(state)
    }

    /// Set the repeat mode
    ///
    /// Free-form input is parsed at the boundary with
    /// [`RepeatMode::parse`]; this method takes the closed enum.
    pub async fn set_repeat_mode(&self, user_id: &UserId, mode: RepeatMode) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        state.repeat_mode = mode;
        self.save_state(&mut state).await?;

        debug!(user = %user_id, mode = %mode, "repeat mode set");
        Ok(state)
    }

    /// Enable or disable shuffle
    ///
    /// Enabling reorders the queue randomly with the currently playing
    /// entry pinned at position 1, snapshotting every entry's position
    /// so disabling can restore the previous order. With an empty queue
    /// or no current song only the flag changes.
    pub async fn set_shuffle(&self, user_id: &UserId, enabled: bool) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        state.shuffle_enabled = enabled;

        if enabled {
            if let Some(current) = state.current_song_id.clone() {
                let entries = play_queue::list(&self.pool, user_id).await?;
                if !entries.is_empty() {
                    let assignments = shuffle_assignments(&entries, &current);
                    play_queue::update_positions(&self.pool, user_id, &assignments).await?;
                    debug!(user = %user_id, count = entries.len(), "queue shuffled");
                }
            }
        } else {
            play_queue::restore_original_order(&self.pool, user_id).await?;
        }

        self.save_state(&mut state).await?;
        Ok(state)
    }

    /// Advance to the next song
    ///
    /// With repeat-one and a current song, the current song restarts
    /// (no history write). Otherwise navigation walks the queue from
    /// the current song's index (or from before the first entry when
    /// the current song is unset or not enqueued), wrapping only under
    /// repeat-all.
    pub async fn next(&self, user_id: &UserId) -> Result<NowPlaying> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;

        if state.repeat_mode == RepeatMode::One {
            if let Some(song_id) = state.current_song_id.clone() {
                let song = self.lookup_song(&song_id).await?;
                state.position_secs = 0;
                self.save_state(&mut state).await?;
                return Ok(NowPlaying { state, song });
            }
        }

        let entries = play_queue::list(&self.pool, user_id).await?;
        if entries.is_empty() {
            return Err(EncoreError::queue_empty("the play queue is empty"));
        }

        let current_index = current_index_in(&entries, state.current_song_id.as_ref());
        let mut next_index = current_index + 1;
        if next_index >= entries.len() as i64 {
            if state.repeat_mode == RepeatMode::All {
                next_index = 0;
            } else {
                return Err(EncoreError::queue_empty("no more songs in the queue"));
            }
        }

        self.move_to_entry(&mut state, &entries[next_index as usize]).await
    }

    /// Go back to the previous song
    ///
    /// Requires a current song (fails fast with `InvalidState`
    /// otherwise) and has no repeat-one branch; wrapping to the last
    /// entry happens only under repeat-all.
    pub async fn previous(&self, user_id: &UserId) -> Result<NowPlaying> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let mut state = self.load_state(user_id).await?;
        if state.current_song_id.is_none() {
            return Err(EncoreError::invalid_state(
                "no current song to navigate back from",
            ));
        }

        let entries = play_queue::list(&self.pool, user_id).await?;
        if entries.is_empty() {
            return Err(EncoreError::queue_empty("the play queue is empty"));
        }

        let current_index = current_index_in(&entries, state.current_song_id.as_ref());
        let mut previous_index = current_index - 1;
        if previous_index < 0 {
            if state.repeat_mode == RepeatMode::All {
                previous_index = entries.len() as i64 - 1;
            } else {
                return Err(EncoreError::queue_empty("no previous song in the queue"));
            }
        }

        self.move_to_entry(&mut state, &entries[previous_index as usize])
            .await
    }

    /// Append a song to the end of the queue
    ///
    /// The entry's original position equals its assigned position, even
    /// while shuffle is in effect.
    pub async fn add_to_queue(&self, user_id: &UserId, song_id: &SongId) -> Result<QueueEntry> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let song = self.lookup_song(song_id).await?;
        let entry = play_queue::append(&self.pool, user_id, &song.id).await?;

        debug!(user = %user_id, song = %song.id, position = entry.position, "song queued");
        Ok(entry)
    }

    /// Remove the queue entry at a position, renumbering the rest
    ///
    /// Removing an absent position is a no-op.
    pub async fn remove_from_queue(&self, user_id: &UserId, position: i64) -> Result<()> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let removed = play_queue::remove_at(&self.pool, user_id, position).await?;
        if removed {
            debug!(user = %user_id, position, "queue entry removed");
        }
        Ok(())
    }

    /// Snapshot the queue together with the current song's index
    pub async fn get_queue(&self, user_id: &UserId) -> Result<QueueView> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let state = self.load_state(user_id).await?;
        let entries = play_queue::list(&self.pool, user_id).await?;
        let current_index = state
            .current_song_id
            .as_ref()
            .and_then(|id| entries.iter().position(|e| &e.song_id == id));

        Ok(QueueView {
            entries,
            current_index,
        })
    }

    /// Delete the user's entire queue
    pub async fn clear_queue(&self, user_id: &UserId) -> Result<u64> {
        self.ensure_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let removed = play_queue::clear(&self.pool, user_id).await?;
        Ok(removed)
    }

    /// The user's player state, with the lazily-created default when no
    /// playback-affecting call has happened yet
    pub async fn get_state(&self, user_id: &UserId) -> Result<PlayerState> {
        self.ensure_user(user_id).await?;
        self.load_state(user_id).await
    }

    /// The user's most recently played distinct songs, newest first
    ///
    /// History holds one record per (user, song) pair; this is not a
    /// full play log.
    pub async fn recently_played(&self, user_id: &UserId) -> Result<Vec<PlayRecord>> {
        self.ensure_user(user_id).await?;
        Ok(play_history::list_by_user(&self.pool, user_id).await?)
    }

    // --- internals ---

    async fn ensure_user(&self, user_id: &UserId) -> Result<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(EncoreError::not_found("User", user_id.as_str()))
        }
    }

    async fn load_state(&self, user_id: &UserId) -> Result<PlayerState> {
        let state = player_state::get(&self.pool, user_id).await?;
        Ok(state.unwrap_or_else(|| self.config.initial_state(user_id.clone())))
    }

    async fn save_state(&self, state: &mut PlayerState) -> Result<()> {
        state.updated_at = Utc::now().timestamp();
        player_state::upsert(&self.pool, state).await?;
        Ok(())
    }

    /// Resolve a song that the user is allowed to play
    async fn resolve_playable(&self, user_id: &UserId, song_id: &SongId) -> Result<Song> {
        let song = self.lookup_song(song_id).await?;
        if song.is_private() && song.owner_id != *user_id {
            return Err(EncoreError::permission_denied(format!(
                "song {song_id} is private"
            )));
        }
        Ok(song)
    }

    /// Resolve song metadata, failing with `NotFound` when absent
    async fn lookup_song(&self, song_id: &SongId) -> Result<Song> {
        self.catalog
            .get_song(song_id)
            .await?
            .ok_or_else(|| EncoreError::not_found("Song", song_id.as_str()))
    }

    /// Make a queue entry the current song and record the play
    async fn move_to_entry(
        &self,
        state: &mut PlayerState,
        entry: &QueueEntry,
    ) -> Result<NowPlaying> {
        let song = self.lookup_song(&entry.song_id).await?;
        let user_id = state.user_id.clone();
        state.current_song_id = Some(entry.song_id.clone());
        state.position_secs = 0;
        self.save_state(state).await?;
        self.record_play(&user_id, &entry.song_id).await?;

        debug!(user = %state.user_id, song = %entry.song_id, "moved to queue entry");
        Ok(NowPlaying {
            state: state.clone(),
            song,
        })
    }

    async fn record_play(&self, user_id: &UserId, song_id: &SongId) -> Result<()> {
        play_history::upsert(&self.pool, user_id, song_id, Utc::now().timestamp()).await?;
        Ok(())
    }
}

/// Index of the current song within the queue, `-1` when unset or not
/// enqueued (navigation then starts before the first entry)
fn current_index_in(entries: &[QueueEntry], current: Option<&SongId>) -> i64 {
    current
        .and_then(|id| entries.iter().position(|e| &e.song_id == id))
        .map_or(-1, |i| i as i64)
}

/// Compute shuffled position assignments `(id, position, original_position)`
///
/// The entry matching the current song is pinned to position 1 so that
/// `next` proceeds logically from "now playing"; the rest are randomly
/// permuted across positions `2..N`. Every entry's original position is
/// snapshotted from its position before this shuffle.
fn shuffle_assignments(entries: &[QueueEntry], current: &SongId) -> Vec<(i64, i64, i64)> {
    let mut assignments = Vec::with_capacity(entries.len());
    let mut next_position = 1;

    let pinned = entries.iter().position(|e| &e.song_id == current);
    let mut rest: Vec<&QueueEntry> = entries
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != pinned)
        .map(|(_, e)| e)
        .collect();

    if let Some(index) = pinned {
        let entry = &entries[index];
        assignments.push((entry.id, next_position, entry.position));
        next_position += 1;
    }

    rest.shuffle(&mut thread_rng());
    for entry in rest {
        assignments.push((entry.id, next_position, entry.position));
        next_position += 1;
    }

    assignments
}
