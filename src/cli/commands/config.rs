//! Config Command
//!
//! Manage ideaforge configuration.
//!
//! Usage:
//!   ideaforge config show [-g] [-f toml|yaml|json]
//!   ideaforge config path
//!   ideaforge config init [-g] [--force]

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the effective configuration, or the raw global file with `global`
pub fn show(global: bool, format: &str) -> Result<()> {
    if global {
        match ConfigLoader::global_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                println!("# Global Config: {}\n", path.display());
                println!("{}", content);
            }
            Some(_) => {
                println!("No global config found.");
                println!("Run 'ideaforge config init --global' to create one.");
            }
            None => println!("Cannot determine global config directory."),
        }
        return Ok(());
    }

    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render(&config, format)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    let out = Output::new();
    out.section("Configuration Files");

    match ConfigLoader::global_config_path() {
        Some(global) => out.field("Global", &describe(&global)),
        None => out.field("Global", "(no config directory)"),
    }
    out.field("Project", &describe(&ConfigLoader::project_config_path()));
    out.field("Environment", "IDEAFORGE_* (e.g. IDEAFORGE_LLM__MODEL)");
    Ok(())
}

fn describe(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    if global {
        let path = ConfigLoader::init_global(force)?;
        out.success("Initialized global configuration");
        out.field("Config", &path.display().to_string());
    } else {
        let root = std::env::current_dir()?;
        let path = ConfigLoader::init_project(&root, force)?;
        out.success("Initialized project configuration");
        out.field("Config", &path.display().to_string());
    }
    Ok(())
}
