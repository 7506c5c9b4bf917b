//! AI response validation
//!
//! - JSON extraction and repair for free-text model output
//! - Mermaid syntax checks for generated user-flow diagrams

mod diagram;
mod json_repair;

pub use diagram::{
    DiagramError, DiagramValidation, is_valid_mermaid, strip_mermaid_fence, validate_mermaid,
};
pub use json_repair::{JsonRepairer, brace_span, extract_json_from_response};
