//! Command handlers
//!
//! Each handler performs one logical operation against the store and renders
//! its outcome as text. A missing user/anime/tag is an outcome, not a failure:
//! the not-found line is returned and the process still exits cleanly.

use anyhow::{bail, Result};
use serde_json::json;

use crate::cli::Commands;
use crate::db::{Anime, AssociationOutcome, WatchlistDb};
use crate::error::{Entity, StoreError, StoreResult};

/// Run one command and return the text to print
pub fn execute(db: &mut WatchlistDb, command: &Commands) -> Result<String> {
    match command {
        Commands::CreateSchema => cmd_create_schema(db),
        Commands::AddUser { name } => cmd_add_user(db, name),
        Commands::AddAnime {
            title,
            genre,
            total_episodes,
            user_id,
        } => cmd_add_anime(db, title, genre, *total_episodes, *user_id),
        Commands::AddTag { anime_id, tag_name } => cmd_add_tag(db, *anime_id, tag_name),
        Commands::ListAnimes { json } => cmd_list_animes(db, *json),
        Commands::ListUsers { json } => cmd_list_users(db, *json),
        Commands::ListTags { json } => cmd_list_tags(db, *json),
        Commands::ShowAnime { anime_id, json } => cmd_show_anime(db, *anime_id, *json),
        Commands::DeleteUser { user_id } => cmd_delete(db, Entity::User, *user_id),
        Commands::DeleteTag { tag_id } => cmd_delete(db, Entity::Tag, *tag_id),
        Commands::DeleteAnime { anime_id } => cmd_delete(db, Entity::Anime, *anime_id),
        Commands::Interactive => bail!("Already in interactive mode"),
    }
}

/// Render a store result, turning NotFound into its message
fn report<T>(result: StoreResult<T>, render: impl FnOnce(T) -> String) -> Result<String> {
    match result {
        Ok(value) => Ok(render(value)),
        Err(e @ StoreError::NotFound { .. }) => Ok(e.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// `<id>: <title> - <genre> (<n> episodes)`
pub fn anime_line(anime: &Anime) -> String {
    format!(
        "{}: {} - {} ({} episodes)",
        anime.id, anime.title, anime.genre, anime.total_episodes
    )
}

fn cmd_create_schema(db: &mut WatchlistDb) -> Result<String> {
    db.create_schema()?;
    Ok("Database tables created successfully.".to_string())
}

fn cmd_add_user(db: &mut WatchlistDb, name: &str) -> Result<String> {
    let user = db.create_user(name)?;
    Ok(format!(
        "User '{}' added successfully with ID {}.",
        user.name, user.id
    ))
}

fn cmd_add_anime(
    db: &mut WatchlistDb,
    title: &str,
    genre: &str,
    total_episodes: u32,
    user_id: i64,
) -> Result<String> {
    report(
        db.create_anime(title, genre, total_episodes, user_id),
        |anime| format!("Anime '{}' added successfully with ID {}.", anime.title, anime.id),
    )
}

fn cmd_add_tag(db: &mut WatchlistDb, anime_id: i64, tag_name: &str) -> Result<String> {
    // Check the anime first so a bad id never leaves a fresh tag behind
    let Some(anime) = db.get_anime(anime_id)? else {
        return Ok(StoreError::not_found(Entity::Anime, anime_id).to_string());
    };

    let (tag, created) = db.get_or_create_tag(tag_name)?;

    report(db.attach_tag(anime.id, tag.id), |outcome| match outcome {
        AssociationOutcome::Added if created => format!(
            "Created tag '{}' and added it to anime '{}'.",
            tag.name, anime.title
        ),
        AssociationOutcome::Added => {
            format!("Tag '{}' added to anime '{}'.", tag.name, anime.title)
        }
        AssociationOutcome::AlreadyPresent => {
            format!("Anime '{}' is already tagged '{}'.", anime.title, tag.name)
        }
    })
}

fn cmd_list_animes(db: &WatchlistDb, as_json: bool) -> Result<String> {
    let animes = db.list_animes()?;

    if as_json {
        return Ok(serde_json::to_string_pretty(&animes)?);
    }
    if animes.is_empty() {
        return Ok("No animes found.".to_string());
    }

    Ok(animes.iter().map(anime_line).collect::<Vec<_>>().join("\n"))
}

fn cmd_list_users(db: &WatchlistDb, as_json: bool) -> Result<String> {
    let users = db.list_users()?;

    if as_json {
        return Ok(serde_json::to_string_pretty(&users)?);
    }
    if users.is_empty() {
        return Ok("No users found.".to_string());
    }

    Ok(users
        .iter()
        .map(|u| format!("{}: {}", u.id, u.name))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn cmd_list_tags(db: &WatchlistDb, as_json: bool) -> Result<String> {
    let tags = db.list_tags()?;

    if as_json {
        return Ok(serde_json::to_string_pretty(&tags)?);
    }
    if tags.is_empty() {
        return Ok("No tags found.".to_string());
    }

    Ok(tags
        .iter()
        .map(|t| format!("{}: {}", t.id, t.name))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn cmd_show_anime(db: &WatchlistDb, anime_id: i64, as_json: bool) -> Result<String> {
    let Some(anime) = db.get_anime(anime_id)? else {
        return Ok(StoreError::not_found(Entity::Anime, anime_id).to_string());
    };
    let owner = db.get_user(anime.user_id)?;
    let tags = db.tags_for_anime(anime.id)?;

    if as_json {
        let output = json!({
            "anime": anime,
            "owner": owner,
            "tags": tags,
        });
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut lines = vec![anime_line(&anime)];
    match owner {
        Some(user) => lines.push(format!("Owner: {} (ID {})", user.name, user.id)),
        None => lines.push(format!("Owner: unknown (ID {})", anime.user_id)),
    }
    if tags.is_empty() {
        lines.push("Tags: none".to_string());
    } else {
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        lines.push(format!("Tags: {}", names.join(", ")));
    }

    Ok(lines.join("\n"))
}

fn cmd_delete(db: &mut WatchlistDb, entity: Entity, id: i64) -> Result<String> {
    let result = match entity {
        Entity::User => db.delete_user(id),
        Entity::Anime => db.delete_anime(id),
        Entity::Tag => db.delete_tag(id),
    };
    report(result, |()| format!("{} with ID {} deleted.", entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Counts;

    fn run(db: &mut WatchlistDb, command: Commands) -> String {
        execute(db, &command).unwrap()
    }

    fn add_anime(title: &str, genre: &str, total_episodes: u32, user_id: i64) -> Commands {
        Commands::AddAnime {
            title: title.to_string(),
            genre: genre.to_string(),
            total_episodes,
            user_id,
        }
    }

    fn add_tag(anime_id: i64, tag_name: &str) -> Commands {
        Commands::AddTag {
            anime_id,
            tag_name: tag_name.to_string(),
        }
    }

    #[test]
    fn test_watchlist_scenario() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;

        assert_eq!(
            run(&mut db, Commands::AddUser { name: "Alice".to_string() }),
            "User 'Alice' added successfully with ID 1."
        );
        assert_eq!(
            run(&mut db, add_anime("Naruto", "Action", 220, 1)),
            "Anime 'Naruto' added successfully with ID 1."
        );
        assert_eq!(
            run(&mut db, add_tag(1, "shounen")),
            "Created tag 'shounen' and added it to anime 'Naruto'."
        );
        assert_eq!(
            run(&mut db, Commands::ListAnimes { json: false }),
            "1: Naruto - Action (220 episodes)"
        );
        assert_eq!(
            run(&mut db, add_tag(1, "shounen")),
            "Anime 'Naruto' is already tagged 'shounen'."
        );
        assert_eq!(db.counts()?.associations, 1);
        Ok(())
    }

    #[test]
    fn test_existing_tag_on_second_anime() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;
        run(&mut db, Commands::AddUser { name: "Alice".to_string() });
        run(&mut db, add_anime("Naruto", "Action", 220, 1));
        run(&mut db, add_anime("Bleach", "Action", 366, 1));
        run(&mut db, add_tag(1, "shounen"));

        assert_eq!(
            run(&mut db, add_tag(2, "shounen")),
            "Tag 'shounen' added to anime 'Bleach'."
        );
        assert_eq!(db.counts()?.tags, 1);
        assert_eq!(db.counts()?.associations, 2);
        Ok(())
    }

    #[test]
    fn test_not_found_outcomes() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;

        assert_eq!(
            run(&mut db, add_anime("Naruto", "Action", 220, 1)),
            "User with ID 1 not found."
        );
        assert_eq!(run(&mut db, add_tag(3, "shounen")), "Anime with ID 3 not found.");
        assert_eq!(
            run(&mut db, Commands::DeleteUser { user_id: 4 }),
            "User with ID 4 not found."
        );
        assert_eq!(
            run(&mut db, Commands::DeleteTag { tag_id: 5 }),
            "Tag with ID 5 not found."
        );
        assert_eq!(
            run(&mut db, Commands::DeleteAnime { anime_id: 6 }),
            "Anime with ID 6 not found."
        );
        assert_eq!(
            run(&mut db, Commands::ShowAnime { anime_id: 6, json: false }),
            "Anime with ID 6 not found."
        );

        // A missing anime must not leave a tag behind
        assert_eq!(db.counts()?, Counts::default());
        Ok(())
    }

    #[test]
    fn test_empty_lists() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;
        assert_eq!(run(&mut db, Commands::ListAnimes { json: false }), "No animes found.");
        assert_eq!(run(&mut db, Commands::ListUsers { json: false }), "No users found.");
        assert_eq!(run(&mut db, Commands::ListTags { json: false }), "No tags found.");
        assert_eq!(run(&mut db, Commands::ListAnimes { json: true }), "[]");
        Ok(())
    }

    #[test]
    fn test_delete_messages() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;
        run(&mut db, Commands::AddUser { name: "Alice".to_string() });
        run(&mut db, add_anime("Naruto", "Action", 220, 1));
        run(&mut db, add_tag(1, "shounen"));

        assert_eq!(
            run(&mut db, Commands::DeleteTag { tag_id: 1 }),
            "Tag with ID 1 deleted."
        );
        assert_eq!(
            run(&mut db, Commands::DeleteAnime { anime_id: 1 }),
            "Anime with ID 1 deleted."
        );
        assert_eq!(
            run(&mut db, Commands::DeleteUser { user_id: 1 }),
            "User with ID 1 deleted."
        );
        assert_eq!(db.counts()?, Counts::default());
        Ok(())
    }

    #[test]
    fn test_show_anime() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;
        run(&mut db, Commands::AddUser { name: "Alice".to_string() });
        run(&mut db, add_anime("Naruto", "Action", 220, 1));

        assert_eq!(
            run(&mut db, Commands::ShowAnime { anime_id: 1, json: false }),
            "1: Naruto - Action (220 episodes)\nOwner: Alice (ID 1)\nTags: none"
        );

        run(&mut db, add_tag(1, "shounen"));
        run(&mut db, add_tag(1, "ninja"));
        let shown = run(&mut db, Commands::ShowAnime { anime_id: 1, json: false });
        assert!(shown.ends_with("Tags: ninja, shounen"));

        let value: serde_json::Value =
            serde_json::from_str(&run(&mut db, Commands::ShowAnime { anime_id: 1, json: true }))?;
        assert_eq!(value["anime"]["title"], "Naruto");
        assert_eq!(value["owner"]["name"], "Alice");
        assert_eq!(value["tags"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[test]
    fn test_list_animes_json() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;
        run(&mut db, Commands::AddUser { name: "Alice".to_string() });
        run(&mut db, add_anime("Naruto", "Action", 220, 1));

        let value: serde_json::Value =
            serde_json::from_str(&run(&mut db, Commands::ListAnimes { json: true }))?;
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["total_episodes"], 220);
        assert_eq!(value[0]["user_id"], 1);
        Ok(())
    }

    #[test]
    fn test_nested_interactive_rejected() -> Result<()> {
        let mut db = WatchlistDb::open_in_memory()?;
        assert!(execute(&mut db, &Commands::Interactive).is_err());
        Ok(())
    }
}
