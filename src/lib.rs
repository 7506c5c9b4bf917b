//! ideaforge - Idea Validation and Blueprint Generation
//!
//! Takes a product idea (title + description), asks an LLM for a structured
//! validation and build blueprint, and keeps projects in two tiers: a
//! per-session store for everyone and a persistent store for signed-in users.
//!
//! ## Core Features
//!
//! - **Blueprint Generation**: JSON-schema prompted LLM call with timeout,
//!   bounded retry and a mock fallback, so generation never fails
//! - **Two-Tier Storage**: session and persisted projects reconciled by id,
//!   with actionable diagnostics for access-policy failures
//! - **Radar Chart**: pillar scores as an animated, hoverable radar chart
//!   drawn to any [`chart::Surface`] (SVG included)
//! - **HTTP + CLI**: axum routes for the pages, and an `ideaforge` binary
//!
//! ## Quick Start
//!
//! ```ignore
//! use ideaforge::{BlueprintGenerator, Config};
//!
//! let generator = BlueprintGenerator::from_config(&Config::default().llm);
//! let generated = generator.generate("Task Tracker", "A tool for teams").await;
//! println!("score: {}", generated.blueprint.validation.score);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM providers, prompts, timeouts, response validation
//! - [`blueprint`]: generation pipeline, schema, codec, mock data
//! - [`storage`]: SQLite remote tier, session tier, repository
//! - [`chart`]: radar geometry, colours, animation, interaction, rendering
//! - [`server`]: HTTP routes
//! - [`views`]: dashboard, project and task-board view models

pub mod ai;
pub mod blueprint;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod reconcile;
pub mod server;
pub mod storage;
pub mod types;
pub mod views;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, ForgeError, Result, ResultExt};

// Domain
pub use types::{Blueprint, BlueprintTask, Idea, SessionId, TaskStatus, UserId};

// Storage
pub use storage::{
    Database, PoolConfig, ProjectRepository, RemoteTier, SessionStorage, SharedDatabase,
    SqliteRemote, diagnose,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use blueprint::{BlueprintGenerator, BlueprintSource, GeneratedBlueprint, mock_blueprint};
pub use reconcile::merge_by_id;

pub use ai::{LlmProvider, LlmResponse, TimeoutConfig, with_timeout};

pub use chart::{RadarChart, RadarLayout, ScoreBand, SurfaceSize, SvgSurface};
