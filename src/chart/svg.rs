//! SVG surface
//!
//! Writes the display list as an SVG document whose pixel size is the draw
//! buffer. Content sits in one group scaled by the device pixel ratio.

use std::fmt::Write as _;

use super::geometry::Point;
use super::surface::{DrawCommand, Paint, Stroke, Surface, SurfaceSize};

pub struct SvgSurface {
    size: SurfaceSize,
    defs: String,
    body: String,
    next_id: usize,
    open_clips: usize,
}

impl SvgSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            defs: String::new(),
            body: String::new(),
            next_id: 0,
            open_clips: 0,
        }
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn paint_attr(&mut self, paint: Option<&Paint>) -> String {
        match paint {
            None => "none".to_string(),
            Some(Paint::Solid { color }) => escape(color),
            Some(Paint::RadialGradient {
                center,
                radius,
                inner,
                outer,
            }) => {
                let id = self.id("fill");
                let _ = write!(
                    self.defs,
                    r#"<radialGradient id="{}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}"><stop offset="0%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></radialGradient>"#,
                    id,
                    num(center.x),
                    num(center.y),
                    num(*radius),
                    escape(inner),
                    escape(outer)
                );
                format!("url(#{})", id)
            }
        }
    }

    fn stroke_attrs(&mut self, stroke: Option<&Stroke>) -> String {
        let Some(stroke) = stroke else {
            return r#" stroke="none""#.to_string();
        };
        let mut attrs = format!(
            r#" stroke="{}" stroke-width="{}" stroke-linejoin="round""#,
            escape(&stroke.color),
            num(stroke.width)
        );
        if stroke.blur > 0.0 {
            let id = self.id("glow");
            let _ = write!(
                self.defs,
                r#"<filter id="{}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{}"/></filter>"#,
                id,
                num(stroke.blur)
            );
            let _ = write!(attrs, r#" filter="url(#{})""#, id);
        }
        attrs
    }

    /// Finish the document.
    pub fn finish(mut self) -> String {
        for _ in 0..self.open_clips {
            self.body.push_str("</g>");
        }

        let mut svg = String::with_capacity(self.defs.len() + self.body.len() + 256);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="width:{cw}px;height:{ch}px">"#,
            w = self.size.buffer_width(),
            h = self.size.buffer_height(),
            cw = num(self.size.css_width),
            ch = num(self.size.css_height),
        );
        if !self.defs.is_empty() {
            let _ = write!(svg, "<defs>{}</defs>", self.defs);
        }
        let _ = write!(
            svg,
            r#"<g transform="scale({})">{}</g></svg>"#,
            num(self.size.scale()),
            self.body
        );
        svg
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let fill = self.paint_attr(fill.as_ref());
                let stroke = self.stroke_attrs(stroke.as_ref());
                let _ = write!(
                    self.body,
                    r#"<circle cx="{}" cy="{}" r="{}" fill="{}"{}/>"#,
                    num(center.x),
                    num(center.y),
                    num(*radius),
                    fill,
                    stroke
                );
            }
            DrawCommand::Line { from, to, stroke } => {
                let stroke = self.stroke_attrs(Some(stroke));
                let _ = write!(
                    self.body,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y),
                    stroke
                );
            }
            DrawCommand::Polygon {
                points,
                fill,
                stroke,
            } => {
                if points.is_empty() {
                    return;
                }
                let fill = self.paint_attr(fill.as_ref());
                let stroke = self.stroke_attrs(stroke.as_ref());
                let _ = write!(
                    self.body,
                    r#"<polygon points="{}" fill="{}"{}/>"#,
                    points_attr(points),
                    fill,
                    stroke
                );
            }
            DrawCommand::Text {
                position,
                text,
                size,
                color,
                anchor,
                bold,
            } => {
                let _ = write!(
                    self.body,
                    r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{}" dominant-baseline="middle" font-family="sans-serif"{}>{}</text>"#,
                    num(position.x),
                    num(position.y),
                    num(*size),
                    escape(color),
                    anchor.as_str(),
                    if *bold { r#" font-weight="bold""# } else { "" },
                    escape(text)
                );
            }
            DrawCommand::PushSweepClip {
                center,
                radius,
                start_deg,
                sweep_deg,
            } => {
                let id = self.id("sweep");
                let _ = write!(
                    self.defs,
                    r#"<clipPath id="{}"><path d="{}"/></clipPath>"#,
                    id,
                    wedge_path(*center, *radius, *start_deg, *sweep_deg)
                );
                let _ = write!(self.body, r#"<g clip-path="url(#{})">"#, id);
                self.open_clips += 1;
            }
            DrawCommand::PopClip => {
                if self.open_clips > 0 {
                    self.body.push_str("</g>");
                    self.open_clips -= 1;
                }
            }
        }
    }
}

/// Path of a circular wedge swept clockwise (screen coordinates).
fn wedge_path(center: Point, radius: f64, start_deg: f64, sweep_deg: f64) -> String {
    let sweep = sweep_deg.clamp(0.0, 360.0);
    if sweep <= 0.0 || radius <= 0.0 {
        return format!("M{} {}Z", num(center.x), num(center.y));
    }
    if sweep >= 360.0 {
        // Two half arcs; a single 360 degree arc is degenerate in SVG
        let top = center.polar(radius, start_deg);
        let bottom = center.polar(radius, start_deg + 180.0);
        return format!(
            "M{} {}A{r} {r} 0 1 1 {} {}A{r} {r} 0 1 1 {} {}Z",
            num(top.x),
            num(top.y),
            num(bottom.x),
            num(bottom.y),
            num(top.x),
            num(top.y),
            r = num(radius)
        );
    }

    let from = center.polar(radius, start_deg);
    let to = center.polar(radius, start_deg + sweep);
    let large_arc = u8::from(sweep > 180.0);
    format!(
        "M{} {}L{} {}A{r} {r} 0 {} 1 {} {}Z",
        num(center.x),
        num(center.y),
        num(from.x),
        num(from.y),
        large_arc,
        num(to.x),
        num(to.y),
        r = num(radius)
    )
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two decimals, without trailing zeros
fn num(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::surface::TextAnchor;

    #[test]
    fn test_document_uses_buffer_size_and_scale() {
        let surface = SvgSurface::new(SurfaceSize::new(400.0, 300.0, 2.0));
        let svg = surface.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="800" height="600""#));
        assert!(svg.contains("width:400px;height:300px"));
        assert!(svg.contains(r#"transform="scale(2)""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut surface = SvgSurface::new(SurfaceSize::default());
        surface.draw(&DrawCommand::Text {
            position: Point::new(1.0, 2.0),
            text: "R&D <fit>".to_string(),
            size: 12.0,
            color: "#000".to_string(),
            anchor: TextAnchor::Middle,
            bold: true,
        });
        let svg = surface.finish();
        assert!(svg.contains("R&amp;D &lt;fit&gt;"));
        assert!(svg.contains(r#"font-weight="bold""#));
    }

    #[test]
    fn test_unbalanced_clip_is_closed() {
        let mut surface = SvgSurface::new(SurfaceSize::default());
        surface.draw(&DrawCommand::PushSweepClip {
            center: Point::new(200.0, 200.0),
            radius: 100.0,
            start_deg: -90.0,
            sweep_deg: 90.0,
        });
        let svg = surface.finish();
        assert!(svg.contains("<clipPath"));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_glow_adds_filter() {
        let mut surface = SvgSurface::new(SurfaceSize::default());
        surface.draw(&DrawCommand::Line {
            from: Point::new(0.0, 0.0),
            to: Point::new(10.0, 10.0),
            stroke: Stroke::new("#fff", 2.0).glow(3.0),
        });
        let svg = surface.finish();
        assert!(svg.contains("<feGaussianBlur"));
        assert!(svg.contains(r#"filter="url(#glow-1)""#));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(2.0), "2");
        assert_eq!(num(1.5), "1.5");
        assert_eq!(num(1.256), "1.26");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(f64::NAN), "0");
    }

    #[test]
    fn test_wedge_paths() {
        let c = Point::new(100.0, 100.0);
        assert_eq!(wedge_path(c, 50.0, -90.0, 0.0), "M100 100Z");
        assert!(wedge_path(c, 50.0, -90.0, 270.0).contains(" 0 1 1 "));
        assert!(wedge_path(c, 50.0, -90.0, 90.0).contains(" 0 0 1 "));
        assert_eq!(wedge_path(c, 50.0, -90.0, 360.0).matches('A').count(), 2);
    }
}
