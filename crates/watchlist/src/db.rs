//! SQLite store for users, anime entries and tags
//!
//! Every mutating operation runs in its own transaction. Relationship
//! traversal (cascade deletes, association checks) is spelled out in SQL
//! here rather than left to the engine.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Entity, StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS animes (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    genre TEXT NOT NULL,
    total_episodes INTEGER NOT NULL CHECK (total_episodes >= 0),
    user_id INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS anime_tags (
    anime_id INTEGER NOT NULL REFERENCES animes(id),
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY (anime_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);
CREATE INDEX IF NOT EXISTS idx_animes_title ON animes(title);
CREATE INDEX IF NOT EXISTS idx_animes_user ON animes(user_id);
CREATE INDEX IF NOT EXISTS idx_anime_tags_tag ON anime_tags(tag_id);
"#;

/// A watchlist owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// An anime entry on a user's list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anime {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub total_episodes: u32,
    pub user_id: i64,
}

/// A tag; names are unique across the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Result of applying a tag to an anime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOutcome {
    Added,
    AlreadyPresent,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub users: i64,
    pub animes: i64,
    pub tags: i64,
    pub associations: i64,
}

/// SQLite-backed watchlist store
pub struct WatchlistDb {
    conn: Connection,
}

impl WatchlistDb {
    /// Open or create the store file, creating its directory and schema as needed
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        debug!(path = %path.display(), "opening watchlist store");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Self { conn };
        db.create_schema()?;
        Ok(db)
    }

    /// Create tables and indexes that don't exist yet. Safe to call repeatedly.
    pub fn create_schema(&mut self) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.commit()?;
        debug!("schema ready");
        Ok(())
    }

    pub fn create_user(&mut self, name: &str) -> StoreResult<User> {
        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO users (name) VALUES (?1)", params![name])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, user = name, "created user");
        Ok(User {
            id,
            name: name.to_string(),
        })
    }

    /// Add an anime owned by `user_id`. Fails with NotFound if the user doesn't exist.
    pub fn create_anime(
        &mut self,
        title: &str,
        genre: &str,
        total_episodes: u32,
        user_id: i64,
    ) -> StoreResult<Anime> {
        let tx = self.conn.transaction()?;
        if !exists(&tx, Entity::User, user_id)? {
            return Err(StoreError::not_found(Entity::User, user_id));
        }

        tx.execute(
            "INSERT INTO animes (title, genre, total_episodes, user_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, genre, total_episodes, user_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, title, user_id, "created anime");
        Ok(Anime {
            id,
            title: title.to_string(),
            genre: genre.to_string(),
            total_episodes,
            user_id,
        })
    }

    /// Find a tag by exact name, creating it if absent.
    ///
    /// The returned flag is true only when this call inserted the row.
    pub fn get_or_create_tag(&mut self, name: &str) -> StoreResult<(Tag, bool)> {
        let tx = self.conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;

        let (id, created) = match existing {
            Some(id) => (id, false),
            None => {
                tx.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
                (tx.last_insert_rowid(), true)
            }
        };
        tx.commit()?;

        debug!(id, tag = name, created, "resolved tag");
        Ok((
            Tag {
                id,
                name: name.to_string(),
            },
            created,
        ))
    }

    /// Put a tag in an anime's association set. A pair that is already
    /// present is left untouched and reported as such.
    pub fn attach_tag(&mut self, anime_id: i64, tag_id: i64) -> StoreResult<AssociationOutcome> {
        let tx = self.conn.transaction()?;
        if !exists(&tx, Entity::Anime, anime_id)? {
            return Err(StoreError::not_found(Entity::Anime, anime_id));
        }
        if !exists(&tx, Entity::Tag, tag_id)? {
            return Err(StoreError::not_found(Entity::Tag, tag_id));
        }

        let present: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM anime_tags WHERE anime_id = ?1 AND tag_id = ?2)",
            params![anime_id, tag_id],
            |row| row.get(0),
        )?;
        if present {
            debug!(anime_id, tag_id, "tag already attached");
            return Ok(AssociationOutcome::AlreadyPresent);
        }

        tx.execute(
            "INSERT INTO anime_tags (anime_id, tag_id) VALUES (?1, ?2)",
            params![anime_id, tag_id],
        )?;
        tx.commit()?;

        debug!(anime_id, tag_id, "tag attached");
        Ok(AssociationOutcome::Added)
    }

    /// All anime in id order
    pub fn list_animes(&self) -> StoreResult<Vec<Anime>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, genre, total_episodes, user_id FROM animes ORDER BY id",
        )?;
        let animes = stmt
            .query_map([], anime_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(animes)
    }

    /// All users in id order
    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// All tags in id order
    pub fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Tags attached to an anime, sorted by name
    pub fn tags_for_anime(&self, anime_id: i64) -> StoreResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name
             FROM anime_tags at
             INNER JOIN tags t ON t.id = at.tag_id
             WHERE at.anime_id = ?1
             ORDER BY t.name",
        )?;
        let tags = stmt
            .query_map(params![anime_id], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get_anime(&self, id: i64) -> StoreResult<Option<Anime>> {
        self.conn
            .query_row(
                "SELECT id, title, genre, total_episodes, user_id FROM animes WHERE id = ?1",
                params![id],
                anime_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        self.conn
            .query_row(
                "SELECT id, name FROM tags WHERE id = ?1",
                params![id],
                tag_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete a user along with every anime they own and those anime's tag links
    pub fn delete_user(&mut self, id: i64) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        if !exists(&tx, Entity::User, id)? {
            return Err(StoreError::not_found(Entity::User, id));
        }

        let links = tx.execute(
            "DELETE FROM anime_tags
             WHERE anime_id IN (SELECT id FROM animes WHERE user_id = ?1)",
            params![id],
        )?;
        let animes = tx.execute("DELETE FROM animes WHERE user_id = ?1", params![id])?;
        tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        tx.commit()?;

        debug!(id, animes, links, "deleted user");
        Ok(())
    }

    /// Delete a tag and detach it from every anime. The anime stay.
    pub fn delete_tag(&mut self, id: i64) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        if !exists(&tx, Entity::Tag, id)? {
            return Err(StoreError::not_found(Entity::Tag, id));
        }

        let links = tx.execute("DELETE FROM anime_tags WHERE tag_id = ?1", params![id])?;
        tx.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        tx.commit()?;

        debug!(id, links, "deleted tag");
        Ok(())
    }

    /// Delete an anime and its tag links. Tags and the owner stay.
    pub fn delete_anime(&mut self, id: i64) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        if !exists(&tx, Entity::Anime, id)? {
            return Err(StoreError::not_found(Entity::Anime, id));
        }

        let links = tx.execute("DELETE FROM anime_tags WHERE anime_id = ?1", params![id])?;
        tx.execute("DELETE FROM animes WHERE id = ?1", params![id])?;
        tx.commit()?;

        debug!(id, links, "deleted anime");
        Ok(())
    }

    pub fn counts(&self) -> StoreResult<Counts> {
        let count = |sql: &str| -> StoreResult<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        Ok(Counts {
            users: count("SELECT COUNT(*) FROM users")?,
            animes: count("SELECT COUNT(*) FROM animes")?,
            tags: count("SELECT COUNT(*) FROM tags")?,
            associations: count("SELECT COUNT(*) FROM anime_tags")?,
        })
    }
}

fn exists(conn: &Connection, entity: Entity, id: i64) -> rusqlite::Result<bool> {
    let sql = match entity {
        Entity::User => "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        Entity::Anime => "SELECT EXISTS(SELECT 1 FROM animes WHERE id = ?1)",
        Entity::Tag => "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1)",
    };
    conn.query_row(sql, params![id], |row| row.get(0))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn anime_from_row(row: &Row<'_>) -> rusqlite::Result<Anime> {
    Ok(Anime {
        id: row.get(0)?,
        title: row.get(1)?,
        genre: row.get(2)?,
        total_episodes: row.get(3)?,
        user_id: row.get(4)?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
