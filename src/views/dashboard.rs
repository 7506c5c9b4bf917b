//! Dashboard idea cards

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chart::ScoreBand;
use crate::constants::views::CARD_EXCERPT_CHARS;
use crate::storage::StoredIdea;
use crate::types::utils::excerpt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub score: f64,
    pub band: ScoreBand,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub saved: bool,
}

impl IdeaCard {
    pub fn from_stored(stored: &StoredIdea) -> Self {
        let idea = &stored.idea;
        let band = ScoreBand::for_score(idea.validation_score);
        Self {
            id: idea.id.clone(),
            title: idea.title.clone(),
            excerpt: excerpt(&idea.description, CARD_EXCERPT_CHARS),
            score: idea.validation_score,
            band,
            color: band.color().hex(),
            created_at: idea.created_at,
            saved: stored.saved,
        }
    }
}

/// Cards in reconciled order
pub fn dashboard(ideas: &[StoredIdea]) -> Vec<IdeaCard> {
    ideas.iter().map(IdeaCard::from_stored).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Idea;

    #[test]
    fn test_cards_keep_order_and_bands() {
        let long = "x".repeat(CARD_EXCERPT_CHARS + 50);
        let ideas = vec![
            StoredIdea {
                idea: Idea::new("Session idea", long.as_str()).with_score(8.0),
                saved: false,
            },
            StoredIdea {
                idea: Idea::new("Saved idea", "short").with_score(2.5),
                saved: true,
            },
        ];

        let cards = dashboard(&ideas);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Session idea");
        assert_eq!(cards[0].band, ScoreBand::Excellent);
        assert!(cards[0].excerpt.chars().count() <= CARD_EXCERPT_CHARS + 1);
        assert!(cards[0].excerpt.ends_with('…'));
        assert!(!cards[0].saved);

        assert_eq!(cards[1].excerpt, "short");
        assert_eq!(cards[1].color, "#ef4444");
        assert!(cards[1].saved);
    }
}
