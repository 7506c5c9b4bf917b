//! CLI Common Utilities
//!
//! Shared context for the project commands: configuration, the SQLite
//! remote tier and the file-backed session tier.

use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, ConfigLoader};
use crate::storage::{
    Database, FileSession, ProjectRepository, SharedDatabase, SharedRemote, SqliteRemote,
};
use crate::types::{Result, UserId};

/// Command execution context
///
/// The CLI acts as `actor` against the remote tier. Without one, only the
/// session file is read and written.
pub struct CommandContext {
    pub config: Config,
    pub db: SharedDatabase,
    pub repository: ProjectRepository,
    pub actor: Option<UserId>,
}

impl CommandContext {
    /// Load config through the full resolution chain and open both tiers.
    pub fn load(user: Option<String>) -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::from_config(config, user)
    }

    pub fn from_config(config: Config, user: Option<String>) -> Result<Self> {
        let db = open_database(&config.storage.database_path)?;
        let remote: SharedRemote = Arc::new(SqliteRemote::new(Arc::clone(&db)));
        let session = Arc::new(FileSession::new(&config.storage.session_path));
        let repository = ProjectRepository::new(session, remote);
        let actor = user
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map(UserId::new);

        Ok(Self {
            config,
            db,
            repository,
            actor,
        })
    }

    pub fn actor(&self) -> Option<&UserId> {
        self.actor.as_ref()
    }

    pub fn remote(&self) -> SharedRemote {
        Arc::new(SqliteRemote::new(Arc::clone(&self.db)))
    }
}

/// Open (creating if needed) and migrate the database at `path`.
pub fn open_database(path: &Path) -> Result<SharedDatabase> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(path)?;
    db.initialize()?;
    Ok(Arc::new(db))
}
