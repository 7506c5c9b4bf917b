//! Blueprint domain types
//!
//! The sections the application computes on (validation, features, tasks,
//! user flow) are typed. Narrative sections stay opaque JSON: their shape is
//! whatever the generator produced and they are only ever displayed.
//!
//! Field names are written camelCase and read in either camelCase or
//! snake_case.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::idea::{Identified, clamp_score};
use super::utils::{ParseWithDefault, lenient_f64, lenient_string, lenient_string_vec};

/// The six scoring dimensions, in display order.
pub const PILLARS: [&str; 6] = [
    "Market Fit",
    "Uniqueness",
    "Scalability",
    "Revenue",
    "Execution",
    "Expertise",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    #[serde(default, alias = "idea_id")]
    pub idea_id: String,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default)]
    pub features: Features,
    #[serde(default, alias = "tech_stack")]
    pub tech_stack: Value,
    #[serde(default, alias = "pricing_model")]
    pub pricing_model: Value,
    #[serde(default)]
    pub market: Value,
    #[serde(default, alias = "market_analysis")]
    pub market_analysis: Value,
    #[serde(default, alias = "competitor_analysis")]
    pub competitor_analysis: Value,
    #[serde(default, alias = "marketing_strategy")]
    pub marketing_strategy: Value,
    #[serde(default, alias = "development_timeline")]
    pub development_timeline: Value,
    #[serde(default)]
    pub tasks: Vec<BlueprintTask>,
    #[serde(default, alias = "user_flow", deserialize_with = "lenient_string")]
    pub user_flow: String,
}

impl Blueprint {
    /// Force every score into [0, 10]. Returns how many values were changed.
    pub fn clamp_scores(&mut self) -> usize {
        let mut changed = 0;
        let score = clamp_score(self.validation.score);
        if score != self.validation.score {
            changed += 1;
            self.validation.score = score;
        }
        for value in self.validation.pillars.values_mut() {
            let clamped = clamp_score(*value);
            if clamped != *value {
                changed += 1;
                *value = clamped;
            }
        }
        changed
    }
}

impl Identified for Blueprint {
    fn id(&self) -> &str {
        &self.idea_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub feedback: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient_pillars")]
    pub pillars: BTreeMap<String, f64>,
}

fn lenient_pillars<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut pillars = BTreeMap::new();
    match value {
        Value::Object(map) => {
            for (name, score) in map {
                // Either `{"Market Fit": 7}` or `{"Market Fit": {"score": 7, ...}}`
                let score = match &score {
                    Value::Object(_) => score.get("score").and_then(super::utils::value_as_f64),
                    other => super::utils::value_as_f64(other),
                };
                if let Some(score) = score {
                    pillars.insert(name, score);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let name = item.get("name").and_then(|n| n.as_str());
                let score = item.get("score").and_then(super::utils::value_as_f64);
                if let (Some(name), Some(score)) = (name, score) {
                    pillars.insert(name.to_string(), score);
                }
            }
        }
        _ => {}
    }
    Ok(pillars)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub core: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub premium: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub future: Vec<String>,
}

// =============================================================================
// Tasks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintTask {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl BlueprintTask {
    pub fn new(title: &str, description: &str, priority: Priority, category: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            priority,
            category: category.to_string(),
            status: TaskStatus::Todo,
        }
    }
}

/// Synthetic task id used for UI addressing: `${ideaId}-task-${index}`.
pub fn task_id(idea_id: &str, index: usize) -> String {
    format!("{}-task-{}", idea_id, index)
}

/// Inverse of [`task_id`]; `None` when the id does not belong to the idea or
/// is not in the exact form [`task_id`] produces.
pub fn task_index(idea_id: &str, id: &str) -> Option<usize> {
    let index: usize = id.strip_prefix(idea_id)?.strip_prefix("-task-")?.parse().ok()?;
    (task_id(idea_id, index) == id).then_some(index)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl ParseWithDefault for TaskStatus {
    fn type_name() -> &'static str {
        "TaskStatus"
    }

    fn default_value() -> Self {
        TaskStatus::Todo
    }

    fn try_parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "todo" | "pending" | "notstarted" | "backlog" => Some(TaskStatus::Todo),
            "inprogress" | "doing" | "active" | "started" => Some(TaskStatus::InProgress),
            "done" | "complete" | "completed" | "finished" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s).ok_or_else(|| {
            format!(
                "Unknown task status: {}. Valid values: todo, in-progress, done",
                s
            )
        })
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        Ok(Self::parse_or_default(&raw))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl ParseWithDefault for Priority {
    fn type_name() -> &'static str {
        "Priority"
    }

    fn default_value() -> Self {
        Priority::Medium
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" | "critical" | "urgent" | "p0" | "p1" => Some(Priority::High),
            "medium" | "normal" | "p2" => Some(Priority::Medium),
            "low" | "p3" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        Ok(Self::parse_or_default(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blueprint_reads_both_casings() {
        let camel: Blueprint = serde_json::from_value(json!({
            "ideaId": "i-1",
            "techStack": {"frontend": ["Next.js"]},
            "userFlow": "flowchart TD\n A-->B"
        }))
        .unwrap();
        let snake: Blueprint = serde_json::from_value(json!({
            "idea_id": "i-1",
            "tech_stack": {"frontend": ["Next.js"]},
            "user_flow": "flowchart TD\n A-->B"
        }))
        .unwrap();

        assert_eq!(camel, snake);
        assert_eq!(camel.tech_stack["frontend"][0], "Next.js");
    }

    #[test]
    fn test_pillars_accept_nested_and_array_forms() {
        let nested: Validation = serde_json::from_value(json!({
            "score": "7",
            "pillars": {"Revenue": {"score": 6, "note": "ok"}, "Execution": 8}
        }))
        .unwrap();
        assert_eq!(nested.score, 7.0);
        assert_eq!(nested.pillars["Revenue"], 6.0);
        assert_eq!(nested.pillars["Execution"], 8.0);

        let array: Validation = serde_json::from_value(json!({
            "pillars": [{"name": "Uniqueness", "score": 5}]
        }))
        .unwrap();
        assert_eq!(array.pillars["Uniqueness"], 5.0);
    }

    #[test]
    fn test_task_status_parsing() {
        assert_eq!(TaskStatus::parse_or_default("In Progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_or_default("in_progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_or_default("DONE"), TaskStatus::Done);
        assert_eq!(TaskStatus::parse_or_default("whatever"), TaskStatus::Todo);
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("In Progress")
        );
    }

    #[test]
    fn test_task_missing_fields_default() {
        let task: BlueprintTask = serde_json::from_value(json!({"title": "Set up repo"})).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_task_id_roundtrip() {
        let id = task_id("abc", 3);
        assert_eq!(id, "abc-task-3");
        assert_eq!(task_index("abc", &id), Some(3));
        assert_eq!(task_index("other", &id), None);
    }

    #[test]
    fn test_task_index_rejects_non_canonical_ids() {
        for id in ["abc-task-+1", "abc-task-01", "abc-task- 1", "abc-task-", "abc-task--1"] {
            assert_eq!(task_index("abc", id), None, "{id}");
        }
        assert_eq!(task_index("abc", "abc-task-0"), Some(0));
        assert_eq!(task_index("abc", "abc-task-10"), Some(10));
    }

    #[test]
    fn test_clamp_scores() {
        let mut blueprint = Blueprint::default();
        blueprint.validation.score = 11.0;
        blueprint.validation.pillars.insert("Revenue".into(), -2.0);
        blueprint.validation.pillars.insert("Execution".into(), 5.0);

        assert_eq!(blueprint.clamp_scores(), 2);
        assert_eq!(blueprint.validation.score, 10.0);
        assert_eq!(blueprint.validation.pillars["Revenue"], 0.0);
    }
}
