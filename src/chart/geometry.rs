//! Radar layout
//!
//! Pure geometry in CSS pixels with the y axis pointing down. Axes are laid
//! out clockwise from 12 o'clock in lexicographic name order.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::Serialize;

use crate::constants::chart::{
    LABEL_OFFSET, LABEL_PADDING, MAX_SCORE, RING_COUNT, RING_STEP, START_ANGLE_DEG,
};
use crate::types::clamp_score;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point at `radius` from `self` in direction `angle_deg`
    pub fn polar(&self, radius: f64, angle_deg: f64) -> Point {
        let rad = angle_deg * PI / 180.0;
        Point::new(self.x + radius * rad.cos(), self.y + radius * rad.sin())
    }
}

/// One pillar axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub index: usize,
    pub name: String,
    /// Score after clamping into [0, 10]
    pub score: f64,
    pub angle_deg: f64,
    /// Data point
    pub point: Point,
    /// Outer end of the spoke
    pub end: Point,
    pub label_anchor: Point,
}

/// Concentric reference ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring {
    pub radius: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLayout {
    pub center: Point,
    pub max_radius: f64,
    pub axes: Vec<Axis>,
    pub rings: Vec<Ring>,
}

/// Angle of axis `k` out of `n`, in degrees. Callers guarantee `n > 0`.
pub fn axis_angle_deg(k: usize, n: usize) -> f64 {
    k as f64 * (360.0 / n as f64) + START_ANGLE_DEG
}

/// Distance of a score's data point from the centre
pub fn score_radius(score: f64, max_radius: f64) -> f64 {
    clamp_score(score) / MAX_SCORE * max_radius
}

impl RadarLayout {
    /// Lay out `scores` on a `width` x `height` surface.
    pub fn compute(scores: &BTreeMap<String, f64>, width: f64, height: f64) -> Self {
        let center = Point::new(width / 2.0, height / 2.0);
        let max_radius = (width.min(height) / 2.0 - LABEL_PADDING).max(0.0);

        let n = scores.len();
        if n == 0 {
            return Self {
                center,
                max_radius,
                axes: Vec::new(),
                rings: Vec::new(),
            };
        }

        let axes = scores
            .iter()
            .enumerate()
            .map(|(index, (name, score))| {
                let score = clamp_score(*score);
                let angle_deg = axis_angle_deg(index, n);
                Axis {
                    index,
                    name: name.clone(),
                    score,
                    angle_deg,
                    point: center.polar(score_radius(score, max_radius), angle_deg),
                    end: center.polar(max_radius, angle_deg),
                    label_anchor: center.polar(max_radius + LABEL_OFFSET, angle_deg),
                }
            })
            .collect();

        let rings = (1..=RING_COUNT)
            .map(|i| Ring {
                radius: max_radius * i as f64 / RING_COUNT as f64,
                label: format!("{}", (i as f64 * RING_STEP) as u32),
            })
            .collect();

        Self {
            center,
            max_radius,
            axes,
            rings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Data points in axis order
    pub fn polygon(&self) -> Vec<Point> {
        self.axes.iter().map(|a| a.point).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_short_circuits() {
        let layout = RadarLayout::compute(&BTreeMap::new(), 400.0, 400.0);
        assert!(layout.is_empty());
        assert!(layout.rings.is_empty());
        assert!(layout.polygon().is_empty());
    }

    #[test]
    fn test_two_axes_opposite() {
        let layout = RadarLayout::compute(&scores(&[("B", 0.0), ("A", 10.0)]), 400.0, 400.0);
        let a = layout.axis("A").unwrap();
        let b = layout.axis("B").unwrap();

        assert_eq!(a.index, 0);
        assert!((b.angle_deg - a.angle_deg - 180.0).abs() < EPS);
        assert!((a.point.distance(&layout.center) - layout.max_radius).abs() < EPS);
        assert!(b.point.distance(&layout.center) < EPS);
        // A points straight up
        assert!((a.point.x - layout.center.x).abs() < EPS);
        assert!(a.point.y < layout.center.y);
    }

    #[test]
    fn test_rings() {
        let layout = RadarLayout::compute(&scores(&[("A", 5.0)]), 400.0, 400.0);
        let labels: Vec<&str> = layout.rings.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["2", "4", "6", "8", "10"]);
        assert!((layout.rings[4].radius - layout.max_radius).abs() < EPS);
        assert!((layout.rings[0].radius - layout.max_radius / 5.0).abs() < EPS);
    }

    #[test]
    fn test_out_of_range_scores_clamped() {
        let layout =
            RadarLayout::compute(&scores(&[("A", 14.0), ("B", -3.0), ("C", f64::NAN)]), 400.0, 400.0);
        assert_eq!(layout.axis("A").unwrap().score, 10.0);
        assert_eq!(layout.axis("B").unwrap().score, 0.0);
        assert_eq!(layout.axis("C").unwrap().score, 0.0);
    }

    #[test]
    fn test_tiny_surface_has_zero_radius() {
        let layout = RadarLayout::compute(&scores(&[("A", 5.0)]), 50.0, 50.0);
        assert_eq!(layout.max_radius, 0.0);
    }

    proptest! {
        #[test]
        fn prop_axis_angles_and_radii(
            values in prop::collection::vec(0.0f64..=10.0, 1..12),
            size in 200.0f64..1200.0,
        ) {
            let map: BTreeMap<String, f64> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("p{:02}", i), *v))
                .collect();
            let n = map.len();
            let layout = RadarLayout::compute(&map, size, size);

            prop_assert_eq!(layout.axes.len(), n);
            for (k, axis) in layout.axes.iter().enumerate() {
                let expected = k as f64 * 360.0 / n as f64 - 90.0;
                prop_assert!((axis.angle_deg - expected).abs() < EPS);

                let r = axis.point.distance(&layout.center);
                prop_assert!((r - axis.score / 10.0 * layout.max_radius).abs() < 1e-6);
            }
        }
    }
}
