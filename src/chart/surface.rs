//! Drawing surface seam
//!
//! The chart emits a display list in CSS pixels. A surface owns a draw
//! buffer of `css size x device pixel ratio` and scales every command by the
//! ratio so strokes stay crisp on dense displays.

use serde::Serialize;

use super::geometry::Point;
use crate::constants::chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceSize {
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, 1.0)
    }
}

impl SurfaceSize {
    /// Non-positive or non-finite ratios fall back to 1.
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            css_width: css_width.max(0.0),
            css_height: css_height.max(0.0),
            device_pixel_ratio: dpr,
        }
    }

    pub fn buffer_width(&self) -> u32 {
        (self.css_width * self.device_pixel_ratio).round() as u32
    }

    pub fn buffer_height(&self) -> u32 {
        (self.css_height * self.device_pixel_ratio).round() as u32
    }

    pub fn scale(&self) -> f64 {
        self.device_pixel_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Paint {
    Solid { color: String },
    RadialGradient {
        center: Point,
        radius: f64,
        inner: String,
        outer: String,
    },
}

impl Paint {
    pub fn solid(color: impl Into<String>) -> Self {
        Paint::Solid {
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    /// Blur radius for glow strokes; 0 for a plain stroke
    pub blur: f64,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            blur: 0.0,
        }
    }

    pub fn glow(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// One display-list entry, in CSS pixels
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Point>,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Text {
        position: Point,
        text: String,
        size: f64,
        color: String,
        anchor: TextAnchor,
        bold: bool,
    },
    /// Clip following commands to a wedge swept clockwise from `start_deg`
    PushSweepClip {
        center: Point,
        radius: f64,
        start_deg: f64,
        sweep_deg: f64,
    },
    PopClip,
}

/// Something a display list can be drawn onto
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    fn draw(&mut self, command: &DrawCommand);

    fn draw_all(&mut self, commands: &[DrawCommand]) {
        for command in commands {
            self.draw(command);
        }
    }
}
