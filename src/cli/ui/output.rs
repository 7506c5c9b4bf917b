use console::{StyledObject, style};

use crate::chart::ScoreBand;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), style(message).yellow());
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn field(&self, label: &str, value: &str) {
        println!("  {:<14} {}", style(label).dim(), value);
    }

    /// `label  7.2 ███████░░░` coloured by band
    pub fn score(&self, label: &str, score: f64) {
        let filled = score.clamp(0.0, 10.0).round() as usize;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
        println!(
            "  {:<14} {} {}",
            label,
            banded(format!("{:>4.1}", score), ScoreBand::for_score(score)),
            banded(bar, ScoreBand::for_score(score))
        );
    }

    pub fn bullet(&self, message: &str) {
        println!("  • {}", message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal colour for a score band, matching the chart palette
pub fn banded<D>(value: D, band: ScoreBand) -> StyledObject<D> {
    match band {
        ScoreBand::Low => style(value).red(),
        ScoreBand::Fair => style(value).yellow(),
        ScoreBand::Good => style(value).blue(),
        ScoreBand::Excellent => style(value).green(),
    }
}
