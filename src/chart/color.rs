//! Score colour buckets
//!
//! One bucketing rule shared by point fills, legend badges and tooltips:
//! `[0, 3]` red, `(3, 5]` amber, `(5, 7]` blue, `(7, 10]` green.

use std::fmt;

use serde::Serialize;

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba()` with the given opacity (clamped to [0, 1])
    pub fn rgba(&self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

pub const RED: Rgb = Rgb::new(0xef, 0x44, 0x44);
pub const AMBER: Rgb = Rgb::new(0xf5, 0x9e, 0x0b);
pub const BLUE: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
pub const GREEN: Rgb = Rgb::new(0x22, 0xc5, 0x5e);

/// Polygon accent (stroke, gradient, glow)
pub const ACCENT: Rgb = Rgb::new(0x63, 0x66, 0xf1);
/// Rings, spokes and muted labels
pub const GRID: Rgb = Rgb::new(0x94, 0xa3, 0xb8);
pub const LABEL: Rgb = Rgb::new(0x33, 0x41, 0x55);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    /// Bucket a score. Non-finite scores fall in the lowest band.
    pub fn for_score(score: f64) -> Self {
        if !score.is_finite() || score <= 3.0 {
            ScoreBand::Low
        } else if score <= 5.0 {
            ScoreBand::Fair
        } else if score <= 7.0 {
            ScoreBand::Good
        } else {
            ScoreBand::Excellent
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            ScoreBand::Low => RED,
            ScoreBand::Fair => AMBER,
            ScoreBand::Good => BLUE,
            ScoreBand::Excellent => GREEN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Low => "low",
            ScoreBand::Fair => "fair",
            ScoreBand::Good => "good",
            ScoreBand::Excellent => "excellent",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour for a score
pub fn score_color(score: f64) -> Rgb {
    ScoreBand::for_score(score).color()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(score_color(0.0), RED);
        assert_eq!(score_color(3.0), RED);
        assert_eq!(score_color(3.01), AMBER);
        assert_eq!(score_color(5.0), AMBER);
        assert_eq!(score_color(5.01), BLUE);
        assert_eq!(score_color(7.0), BLUE);
        assert_eq!(score_color(7.01), GREEN);
        assert_eq!(score_color(10.0), GREEN);
    }

    #[test]
    fn test_hex_values() {
        assert_eq!(RED.hex(), "#ef4444");
        assert_eq!(AMBER.hex(), "#f59e0b");
        assert_eq!(BLUE.hex(), "#3b82f6");
        assert_eq!(GREEN.hex(), "#22c55e");
        assert_eq!(BLUE.rgba(0.5), "rgba(59, 130, 246, 0.50)");
    }

    #[test]
    fn test_non_finite_is_low() {
        assert_eq!(ScoreBand::for_score(f64::NAN), ScoreBand::Low);
        assert_eq!(ScoreBand::for_score(f64::NEG_INFINITY), ScoreBand::Low);
    }

    proptest! {
        #[test]
        fn prop_band_is_monotonic(a in 0.0f64..=10.0, b in 0.0f64..=10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ScoreBand::for_score(lo) <= ScoreBand::for_score(hi));
        }
    }
}
