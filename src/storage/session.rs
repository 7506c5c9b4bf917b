//! Session tier
//!
//! A small key/value store holding the project currently being worked on:
//! `currentIdea`, `currentBlueprint` and `projectSaved`. Values are JSON;
//! the last writer wins. Anonymous users only ever have this tier.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::blueprint::codec;
use crate::constants::session::{
    CURRENT_BLUEPRINT, CURRENT_IDEA, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS, PROJECT_SAVED,
};
use crate::types::{Blueprint, ForgeError, Idea, Result, SessionId};

/// Key/value session storage
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn current_idea(&self) -> Result<Option<Idea>> {
        self.get(CURRENT_IDEA)?
            .map(|v| serde_json::from_value(v).map_err(ForgeError::from))
            .transpose()
    }

    fn current_blueprint(&self) -> Result<Option<Blueprint>> {
        self.get(CURRENT_BLUEPRINT)?.map(codec::decode).transpose()
    }

    fn project_saved(&self) -> Result<bool> {
        Ok(self
            .get(PROJECT_SAVED)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn set_project(&self, idea: &Idea, blueprint: &Blueprint) -> Result<()> {
        self.set(CURRENT_IDEA, serde_json::to_value(idea)?)?;
        self.set(CURRENT_BLUEPRINT, codec::encode(blueprint)?)?;
        self.set(PROJECT_SAVED, Value::Bool(false))
    }

    fn set_blueprint(&self, blueprint: &Blueprint) -> Result<()> {
        self.set(CURRENT_BLUEPRINT, codec::encode(blueprint)?)
    }

    fn mark_saved(&self, saved: bool) -> Result<()> {
        self.set(PROJECT_SAVED, Value::Bool(saved))
    }

    fn clear_project(&self) -> Result<()> {
        self.remove(CURRENT_IDEA)?;
        self.remove(CURRENT_BLUEPRINT)?;
        self.remove(PROJECT_SAVED)
    }
}

pub type SharedSession = Arc<dyn SessionStorage>;

// =============================================================================
// In-memory session (HTTP)
// =============================================================================

#[derive(Debug, Default)]
pub struct MemorySession {
    values: DashMap<String, Value>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStorage for MemorySession {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
struct SessionEntry {
    session: Arc<MemorySession>,
    last_access: Instant,
}

/// One in-memory session per session id
///
/// Sessions idle for longer than the TTL are dropped. At capacity, expired
/// sessions are swept first and then the least recently used one is evicted.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionEntry>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Live session for `id`, refreshing its last access. Never creates one.
    pub fn get(&self, id: &SessionId) -> Option<Arc<MemorySession>> {
        let mut entry = self.sessions.get_mut(id)?;
        if entry.last_access.elapsed() >= self.idle_ttl {
            drop(entry);
            self.sessions.remove(id);
            debug!("Session {} expired", id);
            return None;
        }
        entry.last_access = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    pub fn get_or_create(&self, id: &SessionId) -> Arc<MemorySession> {
        if let Some(session) = self.get(id) {
            return session;
        }
        self.make_room();
        let entry = self.sessions.entry(id.clone()).or_insert_with(|| {
            debug!("Creating session {}", id);
            SessionEntry {
                session: Arc::new(MemorySession::new()),
                last_access: Instant::now(),
            }
        });
        Arc::clone(&entry.session)
    }

    /// Drop every session idle past the TTL. Returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.idle_ttl;
        self.sessions.retain(|_, entry| entry.last_access.elapsed() < ttl);
        let swept = before.saturating_sub(self.sessions.len());
        if swept > 0 {
            debug!("Swept {} idle sessions", swept);
        }
        swept
    }

    fn make_room(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }
        self.sweep_expired();
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_access)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                    debug!("Evicted least recently used session {}", id);
                }
                None => break,
            }
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =============================================================================
// File session (CLI)
// =============================================================================

/// Session persisted as a single JSON object on disk
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, Value>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ForgeError::Storage("Session file lock poisoned".to_string()))?;
        let mut values = self.read_all()?;
        f(&mut values);
        self.write_all(&values)
    }
}

impl SessionStorage for FileSession {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::mock_blueprint;
    use tempfile::TempDir;

    fn project() -> (Idea, Blueprint) {
        let idea = Idea::new("Task Tracker", "A tool for teams");
        let mut blueprint = mock_blueprint(&idea.title, &idea.description);
        blueprint.idea_id = idea.id.clone();
        (idea, blueprint)
    }

    fn exercise(session: &dyn SessionStorage) {
        assert!(session.current_idea().unwrap().is_none());
        assert!(!session.project_saved().unwrap());

        let (idea, blueprint) = project();
        session.set_project(&idea, &blueprint).unwrap();
        session.mark_saved(true).unwrap();

        assert_eq!(session.current_idea().unwrap(), Some(idea));
        assert_eq!(session.current_blueprint().unwrap(), Some(blueprint));
        assert!(session.project_saved().unwrap());

        session.clear_project().unwrap();
        assert!(session.current_idea().unwrap().is_none());
        assert!(session.current_blueprint().unwrap().is_none());
        assert!(!session.project_saved().unwrap());
    }

    #[test]
    fn test_memory_session() {
        exercise(&MemorySession::new());
    }

    #[test]
    fn test_file_session() {
        let temp_dir = TempDir::new().unwrap();
        exercise(&FileSession::new(temp_dir.path().join("state").join("session.json")));
    }

    #[test]
    fn test_file_session_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let (idea, blueprint) = project();

        FileSession::new(&path).set_project(&idea, &blueprint).unwrap();
        let reopened = FileSession::new(&path);
        assert_eq!(reopened.current_idea().unwrap().map(|i| i.id), Some(idea.id));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["currentBlueprint"].get("userFlow").is_some());
    }

    #[test]
    fn test_reads_legacy_snake_case_blueprint() {
        let session = MemorySession::new();
        session
            .set(
                CURRENT_BLUEPRINT,
                Value::String(r#"{"idea_id": "i-1", "user_flow": "graph TD\n A-->B"}"#.to_string()),
            )
            .unwrap();
        let blueprint = session.current_blueprint().unwrap().unwrap();
        assert_eq!(blueprint.idea_id, "i-1");
    }

    #[test]
    fn test_registry_isolates_sessions() {
        let registry = SessionRegistry::new();
        let a = SessionId::new("a");
        let b = SessionId::new("b");

        registry.get_or_create(&a).mark_saved(true).unwrap();
        assert!(registry.get_or_create(&a).project_saved().unwrap());
        assert!(!registry.get_or_create(&b).project_saved().unwrap());
        assert_eq!(registry.len(), 2);
        assert!(registry.remove(&a));
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_expires_idle_sessions() {
        let registry = SessionRegistry::with_limits(Duration::from_secs(60), 100);
        let a = SessionId::new("a");
        let b = SessionId::new("b");
        registry.get_or_create(&a).mark_saved(true).unwrap();
        registry.get_or_create(&b);

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(registry.get(&a).is_some());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(registry.sweep_expired(), 1);
        assert!(registry.get(&a).unwrap().project_saved().unwrap());
        assert!(registry.get(&b).is_none());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(registry.get(&a).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_stays_within_capacity() {
        let registry = SessionRegistry::with_limits(Duration::from_secs(3600), 8);
        let keep = SessionId::new("keep");
        registry.get_or_create(&keep).mark_saved(true).unwrap();

        for i in 0..50 {
            tokio::time::advance(Duration::from_millis(10)).await;
            registry.get_or_create(&SessionId::new(format!("anon-{}", i)));
            // Touched on every round, so never the least recently used
            registry.get(&keep);
            assert!(registry.len() <= 8);
        }
        assert!(registry.get(&keep).unwrap().project_saved().unwrap());
        assert!(registry.get(&SessionId::new("anon-0")).is_none());
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = SessionRegistry::new();
        assert!(registry.get(&SessionId::new("missing")).is_none());
        assert!(registry.is_empty());
    }
}
