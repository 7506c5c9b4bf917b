//! Blueprint rows
//!
//! Access follows the owning idea: a blueprint is visible and writable only
//! by the owner of its idea.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::database::Database;
use super::ideas::check_idea_access;
use crate::blueprint::{BlueprintRow, codec};
use crate::types::{Blueprint, BlueprintTask, ForgeError, Result, UserId};

fn row_to_blueprint_row(row: &Row) -> rusqlite::Result<BlueprintRow> {
    Ok(BlueprintRow {
        idea_id: row.get("idea_id")?,
        validation: row.get("validation")?,
        features: row.get("features")?,
        tech_stack: row.get("tech_stack")?,
        pricing_model: row.get("pricing_model")?,
        market: row.get("market")?,
        market_analysis: row.get("market_analysis")?,
        competitor_analysis: row.get("competitor_analysis")?,
        marketing_strategy: row.get("marketing_strategy")?,
        development_timeline: row.get("development_timeline")?,
        tasks: row.get("tasks")?,
        user_flow: row.get("user_flow")?,
    })
}

impl Database {
    /// Insert or replace the blueprint of one of the actor's ideas.
    pub fn save_blueprint(&self, actor: &UserId, blueprint: &Blueprint) -> Result<()> {
        let conn = self.connection()?;
        // A missing idea is left to the foreign key
        check_idea_access(&conn, actor, &blueprint.idea_id, "blueprints")?;

        let row = codec::to_row(blueprint)?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO blueprints (id, idea_id, validation, features, tech_stack, pricing_model,
                 market, market_analysis, competitor_analysis, marketing_strategy,
                 development_timeline, tasks, user_flow, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
             ON CONFLICT(idea_id) DO UPDATE SET
                 validation = excluded.validation,
                 features = excluded.features,
                 tech_stack = excluded.tech_stack,
                 pricing_model = excluded.pricing_model,
                 market = excluded.market,
                 market_analysis = excluded.market_analysis,
                 competitor_analysis = excluded.competitor_analysis,
                 marketing_strategy = excluded.marketing_strategy,
                 development_timeline = excluded.development_timeline,
                 tasks = excluded.tasks,
                 user_flow = excluded.user_flow,
                 updated_at = excluded.updated_at",
            params![
                uuid::Uuid::new_v4().to_string(),
                row.idea_id,
                row.validation,
                row.features,
                row.tech_stack,
                row.pricing_model,
                row.market,
                row.market_analysis,
                row.competitor_analysis,
                row.marketing_strategy,
                row.development_timeline,
                row.tasks,
                row.user_flow,
                now,
            ],
        )?;
        Ok(())
    }

    /// The blueprint of the actor's idea, if visible.
    pub fn get_blueprint(&self, actor: &UserId, idea_id: &str) -> Result<Option<Blueprint>> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                "SELECT b.* FROM blueprints b
                 JOIN ideas i ON i.id = b.idea_id
                 WHERE b.idea_id = ?1 AND i.user_id = ?2",
                params![idea_id, actor.as_str()],
                row_to_blueprint_row,
            )
            .optional()?;

        row.map(codec::from_row).transpose()
    }

    /// Replace the embedded task list. Returns `false` when there is no blueprint.
    pub fn update_blueprint_tasks(
        &self,
        actor: &UserId,
        idea_id: &str,
        tasks: &[BlueprintTask],
    ) -> Result<bool> {
        let conn = self.connection()?;
        if !check_idea_access(&conn, actor, idea_id, "blueprints")? {
            return Ok(false);
        }

        let updated = conn.execute(
            "UPDATE blueprints SET tasks = ?1, updated_at = ?2 WHERE idea_id = ?3",
            params![
                codec::encode_tasks(tasks)?,
                Utc::now().to_rfc3339(),
                idea_id
            ],
        )?;
        Ok(updated > 0)
    }

    /// Delete the blueprint of the actor's idea. Returns `false` when none existed.
    pub fn delete_blueprint(&self, actor: &UserId, idea_id: &str) -> Result<bool> {
        let conn = self.connection()?;
        if !check_idea_access(&conn, actor, idea_id, "blueprints")? {
            return Ok(false);
        }
        let deleted = conn.execute("DELETE FROM blueprints WHERE idea_id = ?1", [idea_id])?;
        Ok(deleted > 0)
    }

    /// Number of blueprints referencing an idea, regardless of owner.
    pub fn blueprint_count(&self, idea_id: &str) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM blueprints WHERE idea_id = ?1",
            [idea_id],
            |row| row.get(0),
        )?;
        usize::try_from(count).map_err(|e| ForgeError::Storage(e.to_string()))
    }
}
