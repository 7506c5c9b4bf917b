//! Blueprint generation and serialization
//!
//! - `generator`: LLM call with retry/timeout and mock fallback
//! - `mock`: deterministic-shape mock blueprints
//! - `codec`: the single encode/decode boundary
//! - `schema`: output contract sent to the model

pub mod codec;
mod generator;
mod mock;
mod schema;

pub use codec::BlueprintRow;
pub use generator::{BlueprintGenerator, BlueprintSource, GeneratedBlueprint};
pub use mock::{default_user_flow, mock_blueprint, mock_blueprint_with};
pub use schema::{OUTPUT_FORMAT, blueprint_schema};
