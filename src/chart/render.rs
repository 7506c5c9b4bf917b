//! Radar chart
//!
//! Turns pillar scores plus transient interaction and animation state into a
//! display list. Rendering is a pure function of that state and never fails.

use std::collections::BTreeMap;

use serde::Serialize;

use super::animation::AnimationState;
use super::color::{ACCENT, GRID, LABEL, ScoreBand};
use super::geometry::{Point, RadarLayout};
use super::interaction::{Interaction, Tooltip};
use super::surface::{DrawCommand, Paint, Stroke, Surface, SurfaceSize, TextAnchor};
use super::svg::SvgSurface;
use crate::constants::chart::{
    ACTIVE_POINT_RADIUS, DEFAULT_ACTIVATION_RADIUS, POINT_RADIUS, START_ANGLE_DEG,
};

const LABEL_FONT_SIZE: f64 = 12.0;
const RING_FONT_SIZE: f64 = 9.0;

/// Legend row for one pillar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub name: String,
    pub score: f64,
    pub band: ScoreBand,
    pub color: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct RadarChart {
    size: SurfaceSize,
    layout: RadarLayout,
    interaction: Interaction,
    animation: AnimationState,
}

impl RadarChart {
    /// A settled chart; call [`RadarChart::set_animation`] to drive the entrance.
    pub fn new(scores: &BTreeMap<String, f64>, size: SurfaceSize) -> Self {
        Self {
            size,
            layout: RadarLayout::compute(scores, size.css_width, size.css_height),
            interaction: Interaction::new(DEFAULT_ACTIVATION_RADIUS),
            animation: AnimationState::Settled,
        }
    }

    pub fn with_activation_radius(mut self, radius: f64) -> Self {
        self.interaction = Interaction::new(radius);
        self
    }

    pub fn layout(&self) -> &RadarLayout {
        &self.layout
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    pub fn set_animation(&mut self, state: AnimationState) {
        self.animation = state;
        if !state.is_interactive() {
            self.interaction.pointer_leave();
        }
    }

    // -------------------------------------------------------------------------
    // Interaction (ignored until the entrance animation settles)
    // -------------------------------------------------------------------------

    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        self.animation.is_interactive() && self.interaction.pointer_move(&self.layout, pointer)
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.interaction.pointer_leave()
    }

    pub fn legend_enter(&mut self, name: &str) -> bool {
        self.animation.is_interactive() && self.interaction.legend_enter(&self.layout, name)
    }

    pub fn legend_leave(&mut self) -> bool {
        self.interaction.legend_leave()
    }

    pub fn active(&self) -> Option<&str> {
        self.interaction
            .active()
            .and_then(|i| self.layout.axes.get(i))
            .map(|a| a.name.as_str())
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        self.interaction.tooltip(&self.layout)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        let active = self.interaction.active();
        self.layout
            .axes
            .iter()
            .map(|axis| {
                let band = ScoreBand::for_score(axis.score);
                LegendEntry {
                    name: axis.name.clone(),
                    score: axis.score,
                    band,
                    color: band.color().hex(),
                    active: active == Some(axis.index),
                }
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    pub fn display_list(&self) -> Vec<DrawCommand> {
        let layout = &self.layout;
        if layout.is_empty() {
            return Vec::new();
        }

        let mut commands = Vec::with_capacity(layout.rings.len() * 2 + layout.axes.len() * 3 + 4);
        let center = layout.center;

        for ring in &layout.rings {
            commands.push(DrawCommand::Circle {
                center,
                radius: ring.radius,
                fill: None,
                stroke: Some(Stroke::new(GRID.rgba(0.35), 1.0)),
            });
            commands.push(DrawCommand::Text {
                position: Point::new(center.x + 4.0, center.y - ring.radius),
                text: ring.label.clone(),
                size: RING_FONT_SIZE,
                color: GRID.hex(),
                anchor: TextAnchor::Start,
                bold: false,
            });
        }

        for axis in &layout.axes {
            commands.push(DrawCommand::Line {
                from: center,
                to: axis.end,
                stroke: Stroke::new(GRID.rgba(0.25), 1.0),
            });
        }

        let sweeping = matches!(self.animation, AnimationState::Animating { .. })
            || self.animation == AnimationState::Idle;
        if sweeping {
            commands.push(DrawCommand::PushSweepClip {
                center,
                radius: layout.max_radius + POINT_RADIUS * 2.0,
                start_deg: START_ANGLE_DEG,
                sweep_deg: self.animation.sweep_deg(),
            });
        }

        let polygon = layout.polygon();
        commands.push(DrawCommand::Polygon {
            points: polygon.clone(),
            fill: None,
            stroke: Some(Stroke::new(ACCENT.rgba(0.35), 6.0).glow(4.0)),
        });
        commands.push(DrawCommand::Polygon {
            points: polygon,
            fill: Some(Paint::RadialGradient {
                center,
                radius: layout.max_radius,
                inner: ACCENT.rgba(0.15),
                outer: ACCENT.rgba(0.45),
            }),
            stroke: Some(Stroke::new(ACCENT.hex(), 2.0)),
        });

        let active = self.interaction.active();
        for axis in &layout.axes {
            let is_active = active == Some(axis.index);
            commands.push(DrawCommand::Circle {
                center: axis.point,
                radius: if is_active {
                    ACTIVE_POINT_RADIUS
                } else {
                    POINT_RADIUS
                },
                fill: Some(Paint::solid(ScoreBand::for_score(axis.score).color().hex())),
                stroke: Some(Stroke::new("#ffffff", if is_active { 2.0 } else { 1.0 })),
            });
        }

        if sweeping {
            commands.push(DrawCommand::PopClip);
        }

        for axis in &layout.axes {
            let is_active = active == Some(axis.index);
            commands.push(DrawCommand::Text {
                position: axis.label_anchor,
                text: axis.name.clone(),
                size: LABEL_FONT_SIZE,
                color: if is_active {
                    ScoreBand::for_score(axis.score).color().hex()
                } else {
                    LABEL.hex()
                },
                anchor: label_anchor(axis.label_anchor.x, center.x),
                bold: is_active,
            });
        }

        commands
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.draw_all(&self.display_list());
    }

    pub fn to_svg(&self) -> String {
        let mut surface = SvgSurface::new(self.size);
        self.render(&mut surface);
        surface.finish()
    }
}

fn label_anchor(x: f64, center_x: f64) -> TextAnchor {
    const DEAD_ZONE: f64 = 1.0;
    if (x - center_x).abs() < DEAD_ZONE {
        TextAnchor::Middle
    } else if x > center_x {
        TextAnchor::Start
    } else {
        TextAnchor::End
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillars() -> BTreeMap<String, f64> {
        crate::types::PILLARS
            .iter()
            .zip([7.0, 4.0, 6.0, 3.0, 8.0, 5.0])
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Records commands and the size it was asked for
    struct Recorder {
        size: SurfaceSize,
        commands: Vec<DrawCommand>,
    }

    impl Surface for Recorder {
        fn size(&self) -> SurfaceSize {
            self.size
        }

        fn draw(&mut self, command: &DrawCommand) {
            self.commands.push(command.clone());
        }
    }

    fn count<F: Fn(&DrawCommand) -> bool>(commands: &[DrawCommand], f: F) -> usize {
        commands.iter().filter(|c| f(c)).count()
    }

    #[test]
    fn test_empty_scores_draw_nothing() {
        let chart = RadarChart::new(&BTreeMap::new(), SurfaceSize::default());
        assert!(chart.display_list().is_empty());
        assert!(chart.legend().is_empty());
        let svg = chart.to_svg();
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn test_settled_chart_contents() {
        let chart = RadarChart::new(&pillars(), SurfaceSize::default());
        let mut recorder = Recorder {
            size: chart.size(),
            commands: Vec::new(),
        };
        chart.render(&mut recorder);
        let commands = recorder.commands;

        // 5 rings + 6 points
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::Circle { .. })), 11);
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::Line { .. })), 6);
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::Polygon { .. })), 2);
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::PushSweepClip { .. })), 0);
    }

    #[test]
    fn test_animating_chart_is_clipped() {
        let mut chart = RadarChart::new(&pillars(), SurfaceSize::default());
        chart.set_animation(AnimationState::Animating { progress: 0.25 });

        let commands = chart.display_list();
        let sweep = commands.iter().find_map(|c| match c {
            DrawCommand::PushSweepClip { sweep_deg, .. } => Some(*sweep_deg),
            _ => None,
        });
        assert_eq!(sweep, Some(90.0));
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::PopClip)), 1);
    }

    #[test]
    fn test_hover_ignored_until_settled() {
        let mut chart = RadarChart::new(&pillars(), SurfaceSize::default());
        chart.set_animation(AnimationState::Animating { progress: 0.5 });
        let point = chart.layout().axis("Revenue").unwrap().point;

        assert!(!chart.pointer_move(point));
        assert!(chart.tooltip().is_none());

        chart.set_animation(AnimationState::Settled);
        assert!(chart.pointer_move(point));
        assert_eq!(chart.active(), Some("Revenue"));
    }

    #[test]
    fn test_active_point_enlarged_and_label_highlighted() {
        let mut chart = RadarChart::new(&pillars(), SurfaceSize::default());
        chart.legend_enter("Execution");

        let commands = chart.display_list();
        let enlarged = count(&commands, |c| {
            matches!(c, DrawCommand::Circle { radius, .. } if *radius == ACTIVE_POINT_RADIUS)
        });
        assert_eq!(enlarged, 1);

        let bold: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, bold: true, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(bold, vec!["Execution"]);

        let legend = chart.legend();
        assert!(legend.iter().any(|e| e.name == "Execution" && e.active));
        assert_eq!(legend.iter().filter(|e| e.active).count(), 1);
    }

    #[test]
    fn test_legend_colors() {
        let chart = RadarChart::new(&pillars(), SurfaceSize::default());
        let legend = chart.legend();
        let revenue = legend.iter().find(|e| e.name == "Revenue").unwrap();
        assert_eq!(revenue.score, 3.0);
        assert_eq!(revenue.color, "#ef4444");
        let execution = legend.iter().find(|e| e.name == "Execution").unwrap();
        assert_eq!(execution.band, ScoreBand::Excellent);
    }

    #[test]
    fn test_svg_honours_dpr() {
        let chart = RadarChart::new(&pillars(), SurfaceSize::new(400.0, 400.0, 2.0));
        let svg = chart.to_svg();
        assert!(svg.contains(r#"width="800" height="800""#));
        assert!(svg.contains(r#"transform="scale(2)""#));
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains("Market Fit"));
    }
}
