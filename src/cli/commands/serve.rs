//! Serve Command
//!
//! Run the HTTP service against the configured database.

use crate::cli::{Output, open_database};
use crate::config::Config;
use crate::server::{self, AppState};
use crate::storage::SqliteRemote;
use crate::types::Result;
use std::sync::Arc;

pub async fn run(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    let db = open_database(&config.storage.database_path)?;
    let state = AppState::from_config(&config, Arc::new(SqliteRemote::new(db)))?;

    Output::new().info(&format!(
        "Serving on http://{}:{} with {} blueprints",
        config.server.host,
        config.server.port,
        state.generator.provider_name()
    ));
    server::serve(&config, state).await
}
