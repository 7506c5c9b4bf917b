//! Pillar radar chart
//!
//! - [`geometry`]: axis, ring and data point layout
//! - [`color`]: score colour buckets
//! - [`animation`]: entrance sweep state machine and its driver
//! - [`interaction`]: hit testing, legend hover and tooltips
//! - [`surface`] / [`svg`]: display list and the SVG backend

pub mod animation;
pub mod color;
pub mod geometry;
pub mod interaction;
pub mod render;
pub mod surface;
pub mod svg;

pub use animation::{AnimationDriver, AnimationState, EntranceAnimation};
pub use color::{Rgb, ScoreBand, score_color};
pub use geometry::{Axis, Point, RadarLayout, Ring};
pub use interaction::{Interaction, Tooltip};
pub use render::{LegendEntry, RadarChart};
pub use surface::{DrawCommand, Paint, Stroke, Surface, SurfaceSize, TextAnchor};
pub use svg::SvgSurface;

use crate::config::ChartConfig;

impl SurfaceSize {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.width, config.height, config.device_pixel_ratio)
    }
}
