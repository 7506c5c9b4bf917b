//! Idea rows
//!
//! Every operation runs as an actor. Reads only see the actor's rows; writes
//! touching another user's row are policy violations.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::database::Database;
use crate::types::{ForgeError, Idea, Result, UserId, log_filter_error};

const IDEA_COLUMNS: &str = "id, title, description, user_id, validation_score, created_at";

fn row_to_idea(row: &Row) -> rusqlite::Result<Idea> {
    let created_at: String = row.get("created_at")?;
    let user_id: String = row.get("user_id")?;

    Ok(Idea {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        validation_score: row.get("validation_score")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        owner_id: Some(UserId::new(user_id)),
    })
}

/// Owner of an idea row, bypassing the policy (used for policy checks).
pub(super) fn idea_owner(conn: &Connection, idea_id: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT user_id FROM ideas WHERE id = ?1",
            [idea_id],
            |row| row.get(0),
        )
        .optional()?)
}

/// Check write access to an idea row. Returns whether the row exists.
pub(super) fn check_idea_access(
    conn: &Connection,
    actor: &UserId,
    idea_id: &str,
    table: &str,
) -> Result<bool> {
    match idea_owner(conn, idea_id)? {
        Some(owner) if owner != actor.as_str() => Err(ForgeError::access_denied(
            table,
            format!("user '{}' may not modify rows of idea '{}'", actor, idea_id),
        )),
        Some(_) => Ok(true),
        None => Ok(false),
    }
}

impl Database {
    /// Insert or update an idea owned by `actor`.
    ///
    /// Saving an idea the actor already owns updates it in place and keeps
    /// its `created_at`; an id owned by someone else is a policy violation.
    pub fn insert_idea(&self, actor: &UserId, idea: &Idea) -> Result<()> {
        if idea.owner_id.as_ref() != Some(actor) {
            return Err(ForgeError::access_denied(
                "ideas",
                "new row violates row-level security policy for table \"ideas\"",
            ));
        }

        let conn = self.connection()?;
        check_idea_access(&conn, actor, &idea.id, "ideas")?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO ideas (id, title, description, user_id, validation_score, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                validation_score = excluded.validation_score,
                updated_at = excluded.updated_at",
            params![
                idea.id,
                idea.title,
                idea.description,
                actor.as_str(),
                idea.validation_score,
                idea.created_at.to_rfc3339(),
                now,
            ],
        )?;
        Ok(())
    }

    /// The actor's idea with `id`, if visible.
    pub fn get_idea(&self, actor: &UserId, id: &str) -> Result<Option<Idea>> {
        let conn = self.connection()?;
        let sql = format!("SELECT {} FROM ideas WHERE id = ?1 AND user_id = ?2", IDEA_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id, actor.as_str()], row_to_idea)
            .optional()?)
    }

    /// The actor's ideas, newest first.
    pub fn list_ideas(&self, actor: &UserId) -> Result<Vec<Idea>> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {} FROM ideas WHERE user_id = ?1 ORDER BY created_at DESC",
            IDEA_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let ideas = stmt
            .query_map([actor.as_str()], row_to_idea)?
            .filter_map(|r| log_filter_error(r, "Skipping unreadable idea row"))
            .collect();
        Ok(ideas)
    }

    /// Delete the actor's idea. Returns `false` when no such row exists.
    ///
    /// Fails with a foreign-key violation while a blueprint still references it.
    pub fn delete_idea(&self, actor: &UserId, id: &str) -> Result<bool> {
        let conn = self.connection()?;
        if !check_idea_access(&conn, actor, id, "ideas")? {
            return Ok(false);
        }
        let deleted = conn.execute(
            "DELETE FROM ideas WHERE id = ?1 AND user_id = ?2",
            params![id, actor.as_str()],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn idea(owner: &str) -> Idea {
        Idea::new("Task Tracker", "A tool for teams")
            .with_score(7.0)
            .owned_by(Some(UserId::new(owner)))
    }

    #[test]
    fn test_insert_and_get() {
        let db = db();
        let alice = UserId::new("alice");
        let idea = idea("alice");

        db.insert_idea(&alice, &idea).unwrap();
        let stored = db.get_idea(&alice, &idea.id).unwrap().unwrap();
        assert_eq!(stored.title, "Task Tracker");
        assert_eq!(stored.validation_score, 7.0);
        assert_eq!(stored.owner_id, Some(alice));
    }

    #[test]
    fn test_insert_for_other_user_is_policy_violation() {
        let db = db();
        let err = db.insert_idea(&UserId::new("mallory"), &idea("alice")).unwrap_err();
        assert!(err.is_policy_violation());
        assert_eq!(err.code(), Some("42501"));
    }

    #[test]
    fn test_reads_are_scoped_to_actor() {
        let db = db();
        let alice = UserId::new("alice");
        let idea = idea("alice");
        db.insert_idea(&alice, &idea).unwrap();

        let bob = UserId::new("bob");
        assert!(db.get_idea(&bob, &idea.id).unwrap().is_none());
        assert!(db.list_ideas(&bob).unwrap().is_empty());
        assert_eq!(db.list_ideas(&alice).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_other_users_idea_is_policy_violation() {
        let db = db();
        let alice = UserId::new("alice");
        let idea = idea("alice");
        db.insert_idea(&alice, &idea).unwrap();

        let err = db.delete_idea(&UserId::new("bob"), &idea.id).unwrap_err();
        assert!(err.is_policy_violation());
        assert!(db.delete_idea(&alice, &idea.id).unwrap());
        assert!(!db.delete_idea(&alice, &idea.id).unwrap());
    }

    #[test]
    fn test_list_newest_first() {
        let db = db();
        let alice = UserId::new("alice");
        let mut older = idea("alice");
        older.created_at = Utc::now() - chrono::Duration::days(1);
        let newer = idea("alice");
        db.insert_idea(&alice, &older).unwrap();
        db.insert_idea(&alice, &newer).unwrap();

        let ids: Vec<String> = db.list_ideas(&alice).unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn test_saving_again_updates_in_place() {
        let db = db();
        let alice = UserId::new("alice");
        let mut idea = idea("alice");
        db.insert_idea(&alice, &idea).unwrap();

        idea.validation_score = 8.0;
        db.insert_idea(&alice, &idea).unwrap();

        let stored = db.list_ideas(&alice).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].validation_score, 8.0);
    }

    #[test]
    fn test_saving_over_other_users_idea_is_policy_violation() {
        let db = db();
        let alice = UserId::new("alice");
        let idea = idea("alice");
        db.insert_idea(&alice, &idea).unwrap();

        let bob = UserId::new("bob");
        let hijack = idea.clone().owned_by(Some(bob.clone()));
        let err = db.insert_idea(&bob, &hijack).unwrap_err();
        assert!(err.is_policy_violation());
        assert_eq!(db.get_idea(&alice, &idea.id).unwrap().unwrap().title, "Task Tracker");
    }
}
