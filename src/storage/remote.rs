//! Remote tier
//!
//! Async facade over the persistent store. The SQLite implementation runs
//! each call on the blocking pool.

use async_trait::async_trait;
use std::sync::Arc;

use super::database::SharedDatabase;
use crate::types::{Blueprint, BlueprintTask, Idea, Result, UserId};

/// Persistent store for ideas and blueprints, scoped by actor.
#[async_trait]
pub trait RemoteTier: Send + Sync {
    async fn insert_idea(&self, actor: &UserId, idea: &Idea) -> Result<()>;
    async fn get_idea(&self, actor: &UserId, id: &str) -> Result<Option<Idea>>;
    async fn list_ideas(&self, actor: &UserId) -> Result<Vec<Idea>>;
    async fn delete_idea(&self, actor: &UserId, id: &str) -> Result<bool>;

    async fn save_blueprint(&self, actor: &UserId, blueprint: &Blueprint) -> Result<()>;
    async fn get_blueprint(&self, actor: &UserId, idea_id: &str) -> Result<Option<Blueprint>>;
    async fn update_tasks(
        &self,
        actor: &UserId,
        idea_id: &str,
        tasks: &[BlueprintTask],
    ) -> Result<bool>;
    async fn delete_blueprint(&self, actor: &UserId, idea_id: &str) -> Result<bool>;
}

pub type SharedRemote = Arc<dyn RemoteTier>;

/// SQLite-backed remote tier
#[derive(Clone)]
pub struct SqliteRemote {
    db: SharedDatabase,
}

impl SqliteRemote {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&super::Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

#[async_trait]
impl RemoteTier for SqliteRemote {
    async fn insert_idea(&self, actor: &UserId, idea: &Idea) -> Result<()> {
        let (actor, idea) = (actor.clone(), idea.clone());
        self.run(move |db| db.insert_idea(&actor, &idea)).await
    }

    async fn get_idea(&self, actor: &UserId, id: &str) -> Result<Option<Idea>> {
        let (actor, id) = (actor.clone(), id.to_string());
        self.run(move |db| db.get_idea(&actor, &id)).await
    }

    async fn list_ideas(&self, actor: &UserId) -> Result<Vec<Idea>> {
        let actor = actor.clone();
        self.run(move |db| db.list_ideas(&actor)).await
    }

    async fn delete_idea(&self, actor: &UserId, id: &str) -> Result<bool> {
        let (actor, id) = (actor.clone(), id.to_string());
        self.run(move |db| db.delete_idea(&actor, &id)).await
    }

    async fn save_blueprint(&self, actor: &UserId, blueprint: &Blueprint) -> Result<()> {
        let (actor, blueprint) = (actor.clone(), blueprint.clone());
        self.run(move |db| db.save_blueprint(&actor, &blueprint)).await
    }

    async fn get_blueprint(&self, actor: &UserId, idea_id: &str) -> Result<Option<Blueprint>> {
        let (actor, idea_id) = (actor.clone(), idea_id.to_string());
        self.run(move |db| db.get_blueprint(&actor, &idea_id)).await
    }

    async fn update_tasks(
        &self,
        actor: &UserId,
        idea_id: &str,
        tasks: &[BlueprintTask],
    ) -> Result<bool> {
        let (actor, idea_id, tasks) = (actor.clone(), idea_id.to_string(), tasks.to_vec());
        self.run(move |db| db.update_blueprint_tasks(&actor, &idea_id, &tasks))
            .await
    }

    async fn delete_blueprint(&self, actor: &UserId, idea_id: &str) -> Result<bool> {
        let (actor, idea_id) = (actor.clone(), idea_id.to_string());
        self.run(move |db| db.delete_blueprint(&actor, &idea_id)).await
    }
}
