//! Idea records
//!
//! An idea is created when a blueprint is generated. Authenticated ideas carry
//! an owner; anonymous ideas only ever live in the session tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::utils::lenient_f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        alias = "validation_score",
        deserialize_with = "lenient_f64"
    )]
    pub validation_score: f64,
    #[serde(default = "Utc::now", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "owner_id", alias = "user_id", alias = "userId")]
    pub owner_id: Option<UserId>,
}

impl Idea {
    /// New idea with a fresh id, stamped now.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            validation_score: 0.0,
            created_at: Utc::now(),
            owner_id: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.validation_score = clamp_score(score);
        self
    }

    pub fn owned_by(mut self, owner: Option<UserId>) -> Self {
        self.owner_id = owner;
        self
    }
}

/// Records addressable by a stable id (used by reconciliation).
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Idea {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Clamp a score into [0, 10]; non-finite values become 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_idea_reads_snake_case_row() {
        let idea: Idea = serde_json::from_value(json!({
            "id": "i-1",
            "title": "Task Tracker",
            "description": "A tool for teams",
            "validation_score": "7",
            "created_at": "2025-01-01T00:00:00Z",
            "user_id": "u-1"
        }))
        .unwrap();

        assert_eq!(idea.validation_score, 7.0);
        assert_eq!(idea.owner_id, Some(UserId::new("u-1")));
    }

    #[test]
    fn test_idea_writes_camel_case() {
        let idea = Idea::new("Task Tracker", "A tool for teams").with_score(6.0);
        let value = serde_json::to_value(&idea).unwrap();
        assert!(value.get("validationScore").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("validation_score").is_none());
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(12.0), 10.0);
        assert_eq!(clamp_score(-1.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(6.5), 6.5);
    }
}
