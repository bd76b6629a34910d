//! Store errors

use std::fmt;
use thiserror::Error;

/// The kind of record a lookup was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Anime,
    Tag,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Anime => "Anime",
            Entity::Tag => "Tag",
        };
        f.write_str(name)
    }
}

/// Store-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} with ID {id} not found.")]
    NotFound { entity: Entity, id: i64 },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found(Entity::Anime, 7);
        assert_eq!(err.to_string(), "Anime with ID 7 not found.");
    }
}
