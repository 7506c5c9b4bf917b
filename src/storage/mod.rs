pub mod blueprints;
pub mod database;
pub mod diagnostics;
pub mod ideas;
pub mod remote;
pub mod repository;
pub mod session;

pub use database::{Database, PoolConfig, SharedDatabase};
pub use diagnostics::{Diagnosis, DiagnosisKind, diagnose};
pub use remote::{RemoteTier, SharedRemote, SqliteRemote};
pub use repository::{DeleteOutcome, Project, ProjectRepository, SaveOutcome, StoredIdea};
pub use session::{FileSession, MemorySession, SessionRegistry, SessionStorage, SharedSession};
