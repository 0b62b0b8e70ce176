//! Recommendation engine - genre affinity over play history

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use encore_core::error::{EncoreError, Result};
use encore_core::types::{GenreId, Song, SongId, UserId};
use encore_core::{SongCatalog, UserDirectory};
use encore_storage::play_history;

/// Number of top genres considered
const TOP_GENRES: usize = 3;

/// Songs proposed per genre
const SONGS_PER_GENRE: usize = 5;

/// Overall result cap
const MAX_RECOMMENDATIONS: usize = 10;

/// A proposed song with the reason it was picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The proposed song
    pub song: Song,
    /// Why it was proposed, referencing the matching genre
    pub reason: String,
}

/// Derives genre affinity from play history and proposes unheard
/// public songs from the top genres
pub struct RecommendationEngine {
    pool: SqlitePool,
    catalog: Arc<dyn SongCatalog>,
    users: Arc<dyn UserDirectory>,
}

impl RecommendationEngine {
    /// Create a recommendation engine
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn SongCatalog>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            pool,
            catalog,
            users,
        }
    }

    /// Recommend up to ten songs for a user
    ///
    /// Fails with `InsufficientHistory` when the user has never played
    /// anything. Affinity counts distinct songs played per genre (the
    /// history store deduplicates replays); ties rank by ascending
    /// genre id. Up to five unheard public songs per genre, ten total.
    pub async fn recommend(&self, user_id: &UserId) -> Result<Vec<Recommendation>> {
        if !self.users.user_exists(user_id).await? {
            return Err(EncoreError::not_found("User", user_id.as_str()));
        }

        let history = play_history::list_by_user(&self.pool, user_id).await?;
        if history.is_empty() {
            return Err(EncoreError::InsufficientHistory);
        }

        // Genre affinity, one count per distinct song played
        let mut played: HashSet<SongId> = HashSet::new();
        let mut affinity: HashMap<GenreId, usize> = HashMap::new();
        for record in &history {
            played.insert(record.song_id.clone());
            if let Some(song) = self.catalog.get_song(&record.song_id).await? {
                if let Some(genre_id) = song.genre_id {
                    *affinity.entry(genre_id).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(GenreId, usize)> = affinity.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(TOP_GENRES);

        debug!(user = %user_id, genres = ?ranked, "ranked genre affinity");

        // Over-fetch so that already-played songs can be filtered out
        // without starving a genre of its five slots.
        let fetch_limit = (SONGS_PER_GENRE + played.len()) as u32;

        let mut recommendations = Vec::new();
        for (genre_id, _) in ranked {
            let genre_name = self
                .catalog
                .get_genre(genre_id)
                .await?
                .map_or_else(|| format!("genre {genre_id}"), |g| g.name);

            let candidates = self
                .catalog
                .list_public_by_genre(genre_id, fetch_limit)
                .await?;

            recommendations.extend(
                candidates
                    .into_iter()
                    .filter(|song| !played.contains(&song.id))
                    .take(SONGS_PER_GENRE)
                    .map(|song| Recommendation {
                        reason: format!("Because you listen to {genre_name}"),
                        song,
                    }),
            );
        }

        recommendations.truncate(MAX_RECOMMENDATIONS);

        debug!(user = %user_id, count = recommendations.len(), "recommendations ready");
        Ok(recommendations)
    }
}
