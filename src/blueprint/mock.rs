//! Mock blueprints
//!
//! Served whenever the model cannot produce a usable blueprint. The shape is
//! fixed; scores are random inside fixed bands so repeated submissions do not
//! look canned. Content is derived from the idea title.

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::json;

use crate::constants::generation::{MOCK_PILLAR_BANDS, MOCK_SCORE_MAX, MOCK_SCORE_MIN};
use crate::types::{Blueprint, BlueprintTask, Features, Priority, Validation};

/// Mock blueprint using the thread-local RNG.
pub fn mock_blueprint(title: &str, description: &str) -> Blueprint {
    mock_blueprint_with(title, description, &mut rand::rng())
}

/// Mock blueprint drawing scores from `rng`.
pub fn mock_blueprint_with<R: Rng + ?Sized>(
    title: &str,
    description: &str,
    rng: &mut R,
) -> Blueprint {
    let name = display_name(title);

    let pillars: BTreeMap<String, f64> = MOCK_PILLAR_BANDS
        .iter()
        .map(|(pillar, min, max)| (pillar.to_string(), rng.random_range(*min..=*max) as f64))
        .collect();

    let score = rng.random_range(MOCK_SCORE_MIN..=MOCK_SCORE_MAX) as f64;

    Blueprint {
        idea_id: String::new(),
        validation: Validation {
            score,
            feedback: format!(
                "{} addresses a real need. Validate demand with a small group of target users \
                 before investing in premium features.",
                name
            ),
            strengths: vec![
                "Clear problem statement".to_string(),
                "Recurring revenue potential".to_string(),
                "Can launch with a small MVP".to_string(),
            ],
            weaknesses: vec![
                "Crowded market with established players".to_string(),
                "Differentiation needs to be sharpened".to_string(),
            ],
            pillars,
        },
        features: Features {
            core: vec![
                "User accounts and onboarding".to_string(),
                format!("Core {} workflow", name),
                "Dashboard with key metrics".to_string(),
            ],
            premium: vec![
                "Team collaboration".to_string(),
                "Advanced analytics".to_string(),
                "Integrations with popular tools".to_string(),
            ],
            future: vec![
                "Mobile apps".to_string(),
                "AI-assisted recommendations".to_string(),
            ],
        },
        tech_stack: json!({
            "frontend": ["Next.js", "TypeScript", "Tailwind CSS"],
            "backend": ["Node.js", "REST API"],
            "database": ["PostgreSQL"],
            "infrastructure": ["Vercel", "Managed Postgres"]
        }),
        pricing_model: json!({
            "tiers": [
                {"name": "Free", "price": "$0/month", "features": ["Core features", "1 project"]},
                {"name": "Pro", "price": "$19/month", "features": ["Unlimited projects", "Premium features"]},
                {"name": "Team", "price": "$49/month", "features": ["Collaboration", "Priority support"]}
            ]
        }),
        market: json!({
            "targetAudience": format!("Teams and individuals who need {}", name.to_lowercase()),
            "marketSize": "Growing SaaS segment",
            "competitors": ["Established incumbents", "Spreadsheet workflows"]
        }),
        market_analysis: json!({
            "trends": ["Remote work adoption", "Shift to self-serve SaaS"],
            "opportunities": ["Underserved small teams", "Simpler onboarding than incumbents"],
            "threats": ["Incumbents adding similar features", "Low switching costs"]
        }),
        competitor_analysis: json!({
            "competitors": [
                {"name": "Incumbent suites", "strengths": ["Brand", "Feature depth"], "weaknesses": ["Complexity", "Price"]},
                {"name": "Spreadsheets", "strengths": ["Familiar", "Free"], "weaknesses": ["Manual", "Error-prone"]}
            ]
        }),
        marketing_strategy: json!({
            "channels": ["Content marketing", "Product Hunt launch", "Community engagement"],
            "launch": format!("Private beta of {} with 20 design partners, then public launch", name)
        }),
        development_timeline: json!({
            "phases": [
                {"name": "MVP", "duration": "4 weeks", "deliverables": ["Core workflow", "Auth"]},
                {"name": "Beta", "duration": "4 weeks", "deliverables": ["Feedback loop", "Billing"]},
                {"name": "Launch", "duration": "2 weeks", "deliverables": ["Marketing site", "Onboarding"]}
            ]
        }),
        tasks: mock_tasks(&name, description),
        user_flow: default_user_flow(&name),
    }
}

/// User flow used when none was generated or the generated one is unusable.
pub fn default_user_flow(title: &str) -> String {
    let name = sanitize_label(&display_name(title));
    format!(
        "graph TD\n    A[Landing Page] --> B[Sign Up]\n    B --> C[Onboarding]\n    C --> D[{} Dashboard]\n    D --> E[Core Workflow]\n    E --> F[Review Results]\n    F --> D",
        name
    )
}

fn mock_tasks(name: &str, description: &str) -> Vec<BlueprintTask> {
    let research = if description.trim().is_empty() {
        "Interview target users about the problem".to_string()
    } else {
        format!(
            "Interview target users about: {}",
            crate::types::utils::excerpt(description, 80)
        )
    };

    vec![
        BlueprintTask::new(
            "Validate the problem",
            &research,
            Priority::High,
            "Research",
        ),
        BlueprintTask::new(
            "Design core workflow",
            &format!("Wireframe the main {} flow", name),
            Priority::High,
            "Design",
        ),
        BlueprintTask::new(
            "Build MVP",
            "Implement accounts, core workflow and dashboard",
            Priority::High,
            "Development",
        ),
        BlueprintTask::new(
            "Set up billing",
            "Integrate payments for the Pro and Team tiers",
            Priority::Medium,
            "Development",
        ),
        BlueprintTask::new(
            "Launch beta",
            "Recruit design partners and collect feedback",
            Priority::Medium,
            "Marketing",
        ),
        BlueprintTask::new(
            "Plan growth",
            "Prepare content and launch announcements",
            Priority::Low,
            "Marketing",
        ),
    ]
}

fn display_name(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        "Your Product".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Mermaid node labels cannot contain brackets or quotes.
fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | '"' | '|'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::is_valid_mermaid;
    use crate::types::{PILLARS, TaskStatus};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_mock_scores_within_bands() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let blueprint = mock_blueprint_with("Task Tracker", "A tool for teams", &mut rng);

            let score = blueprint.validation.score;
            assert!((5.0..=8.0).contains(&score), "score {}", score);
            assert_eq!(score.fract(), 0.0);

            assert_eq!(blueprint.validation.pillars.len(), 6);
            for (pillar, min, max) in MOCK_PILLAR_BANDS {
                let value = blueprint.validation.pillars[pillar];
                assert!(
                    (min as f64..=max as f64).contains(&value),
                    "{} = {}",
                    pillar,
                    value
                );
                assert!((4.0..=8.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_mock_has_exactly_the_six_pillars() {
        let blueprint = mock_blueprint("Task Tracker", "A tool for teams");
        let mut expected: Vec<&str> = PILLARS.to_vec();
        expected.sort();
        let actual: Vec<&str> = blueprint.validation.pillars.keys().map(String::as_str).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_mock_content_derived_from_title() {
        let blueprint = mock_blueprint("Task Tracker", "A tool for teams");
        assert!(blueprint.features.core.iter().any(|f| f.contains("Task Tracker")));
        assert!(blueprint.user_flow.contains("Task Tracker Dashboard"));
        assert!(blueprint.tasks.iter().all(|t| t.status == TaskStatus::Todo));
        assert!(blueprint.tasks[0].description.contains("A tool for teams"));
        assert_eq!(blueprint.pricing_model["tiers"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_default_user_flow_is_valid() {
        assert!(is_valid_mermaid(&default_user_flow("Task Tracker")));
        assert!(is_valid_mermaid(&default_user_flow("Weird [title] (v2)")));
        assert!(is_valid_mermaid(&default_user_flow("")));
    }
}
