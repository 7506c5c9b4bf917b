//! Hover and tap model
//!
//! The active axis is chosen by Euclidean distance from the pointer to each
//! data point. Legend hover sets the same state from the layout directly.

use serde::Serialize;

use super::color::ScoreBand;
use super::geometry::{Point, RadarLayout};
use crate::constants::chart::DEFAULT_ACTIVATION_RADIUS;

/// Tooltip payload raised for the active axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub label: String,
    pub value: f64,
    pub position: Point,
    pub band: ScoreBand,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    activation_radius: f64,
    active: Option<usize>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_RADIUS)
    }
}

impl Interaction {
    pub fn new(activation_radius: f64) -> Self {
        Self {
            activation_radius: activation_radius.max(0.0),
            active: None,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Nearest axis whose data point lies within the activation radius.
    pub fn hit_test(&self, layout: &RadarLayout, pointer: Point) -> Option<usize> {
        layout
            .axes
            .iter()
            .map(|axis| (axis.index, axis.point.distance(&pointer)))
            .filter(|(_, d)| *d <= self.activation_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Pointer moved. Returns whether the active axis changed.
    pub fn pointer_move(&mut self, layout: &RadarLayout, pointer: Point) -> bool {
        let hit = self.hit_test(layout, pointer);
        let changed = hit != self.active;
        self.active = hit;
        changed
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Legend entry hovered. Unknown names clear the active axis.
    pub fn legend_enter(&mut self, layout: &RadarLayout, name: &str) -> bool {
        let next = layout.axis(name).map(|a| a.index);
        let changed = next != self.active;
        self.active = next;
        changed
    }

    pub fn legend_leave(&mut self) -> bool {
        self.pointer_leave()
    }

    pub fn tooltip(&self, layout: &RadarLayout) -> Option<Tooltip> {
        let axis = layout.axes.get(self.active?)?;
        let band = ScoreBand::for_score(axis.score);
        Some(Tooltip {
            label: axis.name.clone(),
            value: axis.score,
            position: axis.point,
            band,
            color: band.color().hex(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn layout() -> RadarLayout {
        let scores: BTreeMap<String, f64> = [("Execution", 8.0), ("Market Fit", 4.0), ("Revenue", 6.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        RadarLayout::compute(&scores, 400.0, 400.0)
    }

    #[test]
    fn test_pointer_on_point_activates() {
        let layout = layout();
        let mut interaction = Interaction::default();
        let target = layout.axis("Revenue").unwrap().point;

        assert!(interaction.pointer_move(&layout, Point::new(target.x + 5.0, target.y)));
        assert_eq!(interaction.active(), Some(2));

        let tooltip = interaction.tooltip(&layout).unwrap();
        assert_eq!(tooltip.label, "Revenue");
        assert_eq!(tooltip.value, 6.0);
        assert_eq!(tooltip.position, target);
        assert_eq!(tooltip.color, "#3b82f6");
    }

    #[test]
    fn test_outside_radius_clears() {
        let layout = layout();
        let mut interaction = Interaction::default();
        let target = layout.axis("Execution").unwrap().point;
        interaction.pointer_move(&layout, target);

        assert!(interaction.pointer_move(&layout, Point::new(target.x + 21.0, target.y)));
        assert_eq!(interaction.active(), None);
        assert!(interaction.tooltip(&layout).is_none());
    }

    #[test]
    fn test_pointer_leave_clears() {
        let layout = layout();
        let mut interaction = Interaction::default();
        interaction.pointer_move(&layout, layout.axes[0].point);
        assert!(interaction.pointer_leave());
        assert!(!interaction.pointer_leave());
    }

    #[test]
    fn test_nearest_point_wins() {
        let scores: BTreeMap<String, f64> =
            [("A", 0.0), ("B", 0.5)].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let layout = RadarLayout::compute(&scores, 400.0, 400.0);
        let interaction = Interaction::new(50.0);

        // Both points are within range of the centre; A sits on it.
        assert_eq!(interaction.hit_test(&layout, layout.center), Some(0));
    }

    #[test]
    fn test_legend_matches_hit_test() {
        let layout = layout();
        let mut from_legend = Interaction::default();
        let mut from_pointer = Interaction::default();

        from_legend.legend_enter(&layout, "Market Fit");
        from_pointer.pointer_move(&layout, layout.axis("Market Fit").unwrap().point);
        assert_eq!(from_legend.tooltip(&layout), from_pointer.tooltip(&layout));

        assert!(from_legend.legend_enter(&layout, "Unknown"));
        assert_eq!(from_legend.active(), None);
    }

    #[test]
    fn test_empty_layout() {
        let layout = RadarLayout::compute(&BTreeMap::new(), 400.0, 400.0);
        let mut interaction = Interaction::default();
        assert!(!interaction.pointer_move(&layout, Point::new(200.0, 200.0)));
        assert!(interaction.tooltip(&layout).is_none());
    }
}
