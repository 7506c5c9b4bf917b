//! Prompt Builder System
//!
//! Standardized prompt construction for LLM interactions:
//! role, numbered objectives, context, focus rules, anti-patterns and
//! free-form sections, rendered in a fixed order of insertion.

use crate::types::PILLARS;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value context
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
    /// Anti-patterns with good/bad examples
    AntiPatterns { bad: Vec<String>, good: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item, appending to the first context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        match self
            .sections
            .iter_mut()
            .find_map(|section| match section {
                PromptSection::Context(items) => Some(items),
                _ => None,
            }) {
            Some(items) => items.push(item),
            None => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn focus(mut self, target: &str, restrictions: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(String::from).collect(),
        });
        self
    }

    pub fn anti_patterns(mut self, bad: Vec<&str>, good: Vec<&str>) -> Self {
        self.sections.push(PromptSection::AntiPatterns {
            bad: bad.into_iter().map(String::from).collect(),
            good: good.into_iter().map(String::from).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
                PromptSection::AntiPatterns { bad, good } => {
                    prompt.push_str("## ANTI-PATTERNS\n\n");
                    prompt.push_str("<what_not_to_do>\n");
                    for example in bad {
                        prompt.push_str(&format!("WRONG: {}\n", example));
                    }
                    prompt.push_str("</what_not_to_do>\n\n");
                    prompt.push_str("<what_to_do>\n");
                    for example in good {
                        prompt.push_str(&format!("CORRECT: {}\n", example));
                    }
                    prompt.push_str("</what_to_do>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Preset prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// Blueprint prompt for a submitted idea; callers append the output format
    pub fn blueprint(title: &str, description: &str) -> PromptBuilder {
        let pillars = PILLARS.join(", ");

        PromptBuilder::new()
            .role("startup analyst and product strategist", "validating SaaS ideas")
            .objectives(vec![
                "Score the idea's overall viability from 0 to 10",
                &format!("Score each pillar from 0 to 10: {}", pillars),
                "List concrete strengths and weaknesses",
                "Split features into core, premium and future",
                "Propose a tech stack, pricing tiers and a go-to-market plan",
                "Break the MVP into actionable tasks with priorities",
                "Draw the main user flow as a Mermaid flowchart",
            ])
            .context_item("Idea", title)
            .context_item("Description", description)
            .focus(
                title,
                vec![
                    "Judge only the idea as described",
                    "Use whole or half numbers for every score",
                    "Respond with a single JSON object and nothing else",
                ],
            )
            .anti_patterns(
                vec![
                    "\"score\": \"8/10\"",
                    "Pillar names other than the six listed",
                ],
                vec!["\"score\": 8", &format!("Exactly these pillars: {}", pillars)],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("startup analyst", "market research")
            .objectives(vec!["Score the idea", "List risks"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("startup analyst"));
        assert!(prompt.contains("1. Score the idea"));
        assert!(prompt.contains("2. List risks"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Idea", "Task Tracker")
            .section("Notes", "none")
            .context_item("Description", "A tool for teams")
            .build();

        let idea = prompt.find("**Idea**: Task Tracker").unwrap();
        let description = prompt.find("**Description**: A tool for teams").unwrap();
        assert!(idea < description);
        assert_eq!(prompt.matches("# Context").count(), 1);
    }

    #[test]
    fn test_blueprint_template_mentions_every_pillar() {
        let prompt = PromptTemplates::blueprint("Task Tracker", "A tool for teams")
            .section("Output Format", "{}")
            .build();

        for pillar in PILLARS {
            assert!(prompt.contains(pillar), "missing {}", pillar);
        }
        assert!(prompt.contains("**Idea**: Task Tracker"));
        assert!(prompt.contains("<FOCUS>"));
        assert!(prompt.ends_with("{}"));
    }
}
