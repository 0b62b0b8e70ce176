//! Encore Discovery
//!
//! History-driven song recommendations.
//!
//! The engine derives genre affinity from a user's play history and
//! proposes unheard public songs from the top genres. History is a
//! last-played-at map deduplicated by (user, song), so affinity counts
//! are bounded by *distinct songs played* per genre; repeated listens
//! of one song count once.

mod engine;

pub use engine::{Recommendation, RecommendationEngine};
