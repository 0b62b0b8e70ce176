//! Genre types

use serde::{Deserialize, Serialize};

/// Genre identifier (catalog row id)
pub type GenreId = i64;

/// A music genre, resolved from the song catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Catalog row id
    pub id: GenreId,
    /// Display name
    pub name: String,
}
