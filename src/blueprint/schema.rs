//! Output contract sent to the model alongside the prompt.

use serde_json::{Value, json};

use crate::types::PILLARS;

/// Example object appended to the prompt under "Output Format".
pub const OUTPUT_FORMAT: &str = r#"Return ONLY a JSON object shaped like this example:

{
  "validation": {
    "score": 7,
    "feedback": "One paragraph verdict",
    "strengths": ["..."],
    "weaknesses": ["..."],
    "pillars": {"Market Fit": 7, "Uniqueness": 6, "Scalability": 8, "Revenue": 6, "Execution": 7, "Expertise": 5}
  },
  "features": {"core": ["..."], "premium": ["..."], "future": ["..."]},
  "techStack": {"frontend": ["..."], "backend": ["..."], "database": ["..."], "infrastructure": ["..."]},
  "pricingModel": {"tiers": [{"name": "Free", "price": "$0", "features": ["..."]}]},
  "market": {"targetAudience": "...", "marketSize": "...", "competitors": ["..."]},
  "marketAnalysis": {"trends": ["..."], "opportunities": ["..."], "threats": ["..."]},
  "competitorAnalysis": {"competitors": [{"name": "...", "strengths": ["..."], "weaknesses": ["..."]}]},
  "marketingStrategy": {"channels": ["..."], "launch": "..."},
  "developmentTimeline": {"phases": [{"name": "MVP", "duration": "4 weeks", "deliverables": ["..."]}]},
  "tasks": [{"title": "...", "description": "...", "priority": "High", "category": "Development", "status": "Todo"}],
  "userFlow": "graph TD\n  A[Landing] --> B[Sign up]"
}"#;

/// JSON Schema for the blueprint object.
pub fn blueprint_schema() -> Value {
    let pillar_props: serde_json::Map<String, Value> = PILLARS
        .iter()
        .map(|name| {
            (
                name.to_string(),
                json!({"type": "number", "minimum": 0, "maximum": 10}),
            )
        })
        .collect();

    let string_array = json!({"type": "array", "items": {"type": "string"}});

    json!({
        "type": "object",
        "required": ["validation", "features", "tasks", "userFlow"],
        "properties": {
            "validation": {
                "type": "object",
                "required": ["score", "pillars"],
                "properties": {
                    "score": {"type": "number", "minimum": 0, "maximum": 10},
                    "feedback": {"type": "string"},
                    "strengths": string_array,
                    "weaknesses": string_array,
                    "pillars": {
                        "type": "object",
                        "properties": pillar_props,
                        "required": PILLARS,
                    }
                }
            },
            "features": {
                "type": "object",
                "properties": {"core": string_array, "premium": string_array, "future": string_array}
            },
            "techStack": {"type": "object"},
            "pricingModel": {"type": "object"},
            "market": {"type": "object"},
            "marketAnalysis": {"type": "object"},
            "competitorAnalysis": {"type": "object"},
            "marketingStrategy": {"type": "object"},
            "developmentTimeline": {"type": "object"},
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title"],
                    "properties": {
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "priority": {"enum": ["High", "Medium", "Low"]},
                        "category": {"type": "string"},
                        "status": {"enum": ["Todo", "In Progress", "Done"]}
                    }
                }
            },
            "userFlow": {"type": "string"}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_all_pillars() {
        let schema = blueprint_schema();
        let required = schema["properties"]["validation"]["properties"]["pillars"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), PILLARS.len());
    }

    #[test]
    fn test_output_format_is_valid_json() {
        let start = OUTPUT_FORMAT.find('{').unwrap();
        let value: Value = serde_json::from_str(&OUTPUT_FORMAT[start..]).unwrap();
        assert!(value["validation"]["pillars"]["Market Fit"].is_number());
    }
}
