//! Blueprint codec
//!
//! The only place blueprints cross a serialization boundary: model output,
//! session values, HTTP bodies and store rows all go through here. Decoding
//! accepts camelCase or snake_case, unwraps values that were JSON-encoded
//! twice by older writers, and clamps out-of-range scores.

use serde_json::{Map, Value};
use tracing::warn;

use crate::types::{Blueprint, BlueprintTask, Result, ValidationError, ValidationErrorKind};

/// A blueprint flattened into store columns (one JSON document per section).
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintRow {
    pub idea_id: String,
    pub validation: String,
    pub features: String,
    pub tech_stack: String,
    pub pricing_model: String,
    pub market: String,
    pub market_analysis: String,
    pub competitor_analysis: String,
    pub marketing_strategy: String,
    pub development_timeline: String,
    pub tasks: String,
    pub user_flow: String,
}

/// JSON columns in row order, paired with their camelCase field names.
const JSON_COLUMNS: [(&str, &str); 10] = [
    ("validation", "validation"),
    ("features", "features"),
    ("tech_stack", "techStack"),
    ("pricing_model", "pricingModel"),
    ("market", "market"),
    ("market_analysis", "marketAnalysis"),
    ("competitor_analysis", "competitorAnalysis"),
    ("marketing_strategy", "marketingStrategy"),
    ("development_timeline", "developmentTimeline"),
    ("tasks", "tasks"),
];

/// Encode a blueprint as its camelCase JSON value.
pub fn encode(blueprint: &Blueprint) -> Result<Value> {
    Ok(serde_json::to_value(blueprint)?)
}

/// Decode a blueprint from any JSON the application has written or received.
pub fn decode(value: Value) -> Result<Blueprint> {
    let value = unwrap_wrapped(unwrap_double_encoded(value));
    let mut blueprint: Blueprint = serde_json::from_value(value)?;

    let clamped = blueprint.clamp_scores();
    if clamped > 0 {
        warn!(
            "Clamped {} out-of-range score(s) in blueprint '{}'",
            clamped, blueprint.idea_id
        );
    }

    Ok(blueprint)
}

/// Decode model output and reject blueprints with nothing to score.
pub fn decode_generated(value: Value) -> Result<Blueprint> {
    let blueprint = decode(value)?;
    if blueprint.validation.pillars.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::MissingField,
            "Generated blueprint has no pillar scores",
        )
        .with_field("validation.pillars")
        .into());
    }
    Ok(blueprint)
}

/// Flatten a blueprint into store columns.
pub fn to_row(blueprint: &Blueprint) -> Result<BlueprintRow> {
    let encoded = encode(blueprint)?;
    let column = |field: &str| -> Result<String> {
        Ok(serde_json::to_string(
            encoded.get(field).unwrap_or(&Value::Null),
        )?)
    };

    Ok(BlueprintRow {
        idea_id: blueprint.idea_id.clone(),
        validation: column("validation")?,
        features: column("features")?,
        tech_stack: column("techStack")?,
        pricing_model: column("pricingModel")?,
        market: column("market")?,
        market_analysis: column("marketAnalysis")?,
        competitor_analysis: column("competitorAnalysis")?,
        marketing_strategy: column("marketingStrategy")?,
        development_timeline: column("developmentTimeline")?,
        tasks: encode_tasks(&blueprint.tasks)?,
        user_flow: blueprint.user_flow.clone(),
    })
}

/// Encode a task list as the `tasks` column.
pub fn encode_tasks(tasks: &[BlueprintTask]) -> Result<String> {
    Ok(serde_json::to_string(&serde_json::to_value(tasks)?)?)
}

/// Rebuild a blueprint from store columns.
pub fn from_row(row: BlueprintRow) -> Result<Blueprint> {
    let raw = [
        &row.validation,
        &row.features,
        &row.tech_stack,
        &row.pricing_model,
        &row.market,
        &row.market_analysis,
        &row.competitor_analysis,
        &row.marketing_strategy,
        &row.development_timeline,
        &row.tasks,
    ];

    let mut map = Map::new();
    map.insert("ideaId".to_string(), Value::String(row.idea_id.clone()));
    for ((_, field), text) in JSON_COLUMNS.iter().zip(raw) {
        map.insert(field.to_string(), parse_column(text));
    }
    map.insert("userFlow".to_string(), Value::String(parse_text_column(&row.user_flow)));

    decode(Value::Object(map))
}

/// Column names of the JSON section columns, in row order.
pub fn json_column_names() -> impl Iterator<Item = &'static str> {
    JSON_COLUMNS.iter().map(|(column, _)| *column)
}

fn parse_column(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => unwrap_double_encoded(value),
        // Plain prose written by hand into a JSON column
        Err(_) => Value::String(text.to_string()),
    }
}

fn parse_text_column(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(inner)) => inner,
        _ => text.to_string(),
    }
}

/// A string holding a JSON object or array is decoded one more level.
fn unwrap_double_encoded(value: Value) -> Value {
    if let Value::String(s) = &value {
        let trimmed = s.trim_start();
        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && let Ok(inner) = serde_json::from_str::<Value>(s)
        {
            return inner;
        }
    }
    value
}

/// `{"blueprint": {...}}` from models that wrap their answer.
fn unwrap_wrapped(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("validation") && map.len() == 1 => {
            match map.remove("blueprint") {
                Some(inner @ Value::Object(_)) => unwrap_double_encoded(inner),
                Some(other) => {
                    map.insert("blueprint".to_string(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            }
        }
        other => other,
    }
}
