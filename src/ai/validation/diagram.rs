//! Mermaid Diagram Validation
//!
//! Checks that a blueprint's user-flow diagram is renderable before it is
//! stored. Only the diagram kinds a user flow can sensibly use are accepted:
//! `flowchart`/`graph` (TD, TB, LR, RL, BT) and `sequenceDiagram`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static HEADER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:(flowchart|graph)(?:\s+(TD|TB|LR|RL|BT))?|(sequenceDiagram))\s*;?\s*$")
        .ok()
});

/// Result of Mermaid diagram validation
#[derive(Debug, Clone)]
pub struct DiagramValidation {
    pub is_valid: bool,
    /// Detected diagram kind (or "unknown")
    pub diagram_type: String,
    pub errors: Vec<DiagramError>,
    /// Valid but suspicious constructs
    pub warnings: Vec<String>,
}

impl DiagramValidation {
    fn new(diagram_type: &str, errors: Vec<DiagramError>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            diagram_type: diagram_type.to_string(),
            errors,
            warnings,
        }
    }
}

/// Diagram validation error
#[derive(Debug, Clone)]
pub struct DiagramError {
    pub line: usize,
    pub message: String,
    pub suggestion: Option<String>,
}

impl DiagramError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for DiagramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Strip a ```mermaid wrapper if present
pub fn strip_mermaid_fence(content: &str) -> &str {
    let content = content.trim();
    let Some(rest) = content
        .strip_prefix("```mermaid")
        .or_else(|| content.strip_prefix("```Mermaid"))
        .or_else(|| content.strip_prefix("```"))
    else {
        return content;
    };
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Validate a Mermaid user-flow diagram
pub fn validate_mermaid(content: &str) -> DiagramValidation {
    let content = strip_mermaid_fence(content);

    if content.is_empty() {
        return DiagramValidation::new(
            "empty",
            vec![DiagramError::new(1, "Empty diagram")],
            Vec::new(),
        );
    }

    let first_line = content.lines().next().unwrap_or("");
    match detect_diagram_type(first_line) {
        Some("flowchart") => validate_flowchart(content),
        Some(_) => validate_sequence(content),
        None => DiagramValidation::new(
            "unknown",
            vec![
                DiagramError::new(1, format!("Unrecognised diagram header '{}'", first_line.trim()))
                    .with_suggestion("Start with 'graph TD' or 'sequenceDiagram'"),
            ],
            Vec::new(),
        ),
    }
}

/// Quick check used by the blueprint decoder
pub fn is_valid_mermaid(content: &str) -> bool {
    validate_mermaid(content).is_valid
}

fn detect_diagram_type(first_line: &str) -> Option<&'static str> {
    let caps = HEADER_RE.as_ref()?.captures(first_line)?;
    if caps.get(1).is_some() {
        Some("flowchart")
    } else {
        Some("sequenceDiagram")
    }
}

fn body_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("%%"))
}

fn validate_flowchart(content: &str) -> DiagramValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut node_ids: HashSet<String> = HashSet::new();
    let mut referenced_ids: HashSet<String> = HashSet::new();
    let mut edges = 0;

    for (line_num, line) in body_lines(content) {
        let opens = line.matches(['[', '(', '{']).count();
        let closes = line.matches([']', ')', '}']).count();
        if opens != closes {
            errors.push(
                DiagramError::new(line_num, "Unclosed bracket")
                    .with_suggestion("Check matching [], () or {}"),
            );
        }

        if line.matches('"').count() % 2 != 0 {
            errors.push(
                DiagramError::new(line_num, "Unclosed quote").with_suggestion("Check matching \"\""),
            );
        }

        let is_edge = ["-->", "---", "-.-", "==>", "-.->"]
            .iter()
            .any(|arrow| line.contains(arrow));

        if is_edge {
            edges += 1;
            for part in line.split(['-', '>', '=', '.']).filter(|s| !s.is_empty()) {
                // Edge labels (|label|) precede the target node
                let part = part.rsplit('|').next().unwrap_or(part);
                let id = part.trim().split(['[', '(', '{']).next().unwrap_or("").trim();
                if is_node_id(id) {
                    referenced_ids.insert(id.to_string());
                }
            }
        }

        for segment in line.split(['-', '>', '=', '.', '|']) {
            let segment = segment.trim();
            if let Some(pos) = segment.find(['[', '(', '{']) {
                let id = segment[..pos].trim();
                if is_node_id(id) {
                    node_ids.insert(id.to_string());
                }
            }
        }
    }

    if edges == 0 {
        errors.push(
            DiagramError::new(2, "Flowchart has no edges").with_suggestion("Connect steps with -->"),
        );
    }

    for id in referenced_ids.difference(&node_ids) {
        warnings.push(format!("Node '{}' referenced but not explicitly defined", id));
    }

    DiagramValidation::new("flowchart", errors, warnings)
}

fn validate_sequence(content: &str) -> DiagramValidation {
    let mut errors = Vec::new();
    let mut messages = 0;

    for (line_num, line) in body_lines(content) {
        if line.contains("->>") || line.contains("-->>") || line.contains("-x") {
            messages += 1;
            if !line.contains(':') {
                errors.push(
                    DiagramError::new(line_num, "Message arrow missing ':' and label")
                        .with_suggestion("Format: A->>B: Message"),
                );
            }
        }
    }

    if messages == 0 {
        errors.push(DiagramError::new(2, "Sequence diagram has no messages"));
    }

    DiagramValidation::new("sequenceDiagram", errors, Vec::new())
}

fn is_node_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_flowchart() {
        let diagram = "graph TD\n  A[Landing] --> B[Sign up]\n  B --> C{Has idea?}\n  C -->|Yes| D[Generate]";
        let result = validate_mermaid(diagram);
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.diagram_type, "flowchart");
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_fenced_flowchart() {
        assert!(is_valid_mermaid("```mermaid\nflowchart LR\n  A[Start] --> B[End]\n```"));
    }

    #[test]
    fn test_unclosed_bracket() {
        let result = validate_mermaid("graph TD\n  A[Start --> B[End]");
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].line, 2);
    }

    #[test]
    fn test_unknown_header() {
        let result = validate_mermaid("pie title Pets\n  \"Dogs\" : 386");
        assert!(!result.is_valid);
        assert_eq!(result.diagram_type, "unknown");
    }

    #[test]
    fn test_empty_and_prose() {
        assert!(!is_valid_mermaid(""));
        assert!(!is_valid_mermaid("The user signs up and then generates an idea."));
    }

    #[test]
    fn test_sequence_diagram() {
        assert!(is_valid_mermaid("sequenceDiagram\n  User->>App: Submit idea\n  App-->>User: Blueprint"));
        assert!(!is_valid_mermaid("sequenceDiagram\n  User->>App"));
    }

    #[test]
    fn test_flowchart_without_edges() {
        assert!(!is_valid_mermaid("graph TD\n  A[Alone]"));
    }
}
