//! An SVG document writer that implements [`Surface`].

use std::fmt::Write as _;

use crate::layout::Point;
use crate::render::{RadialGradient, Rgba, Stroke, Surface, TextStyle};
use crate::wrap::{AverageGlyphMeasure, TextMeasure};

pub const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

/// Accumulates drawing calls as SVG elements. Transforms open nested `<g>`
/// groups; `restore` closes every group opened since the matching `save`.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    defs: String,
    body: String,
    open_groups: usize,
    saved: Vec<usize>,
    gradients: usize,
    measure: AverageGlyphMeasure,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            open_groups: 0,
            saved: Vec::new(),
            gradients: 0,
            measure: AverageGlyphMeasure::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Close any groups left open and return the complete document.
    pub fn finish(mut self) -> String {
        while self.open_groups > 0 {
            self.close_group();
        }
        let mut doc = String::with_capacity(self.defs.len() + self.body.len() + 256);
        let _ = write!(
            doc,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            doc.push_str("<defs>");
            doc.push_str(&self.defs);
            doc.push_str("</defs>");
        }
        doc.push_str(&self.body);
        doc.push_str("</svg>");
        doc
    }

    fn open_group(&mut self, transform: String) {
        let _ = write!(self.body, r#"<g transform="{transform}">"#);
        self.open_groups += 1;
    }

    fn close_group(&mut self) {
        self.body.push_str("</g>");
        self.open_groups -= 1;
    }
}

impl TextMeasure for SvgSurface {
    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        self.measure.measure_text(text, font_px)
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self) {
        self.defs.clear();
        self.body.clear();
        self.open_groups = 0;
        self.saved.clear();
        self.gradients = 0;
        let _ = write!(
            self.body,
            r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
            self.width, self.height
        );
    }

    fn save(&mut self) {
        self.saved.push(self.open_groups);
    }

    fn restore(&mut self) {
        let target = self.saved.pop().unwrap_or(0);
        while self.open_groups > target {
            self.close_group();
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.open_group(format!("translate({} {})", num(dx), num(dy)));
    }

    fn scale(&mut self, factor: f64) {
        self.open_group(format!("scale({})", num(factor)));
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        let _ = write!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            stroke_attrs(stroke)
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: &RadialGradient) {
        let id = format!("node-fill-{}", self.gradients);
        self.gradients += 1;
        let _ = write!(
            self.defs,
            r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{cx}" cy="{cy}" r="{r}"><stop offset="0" {inner}/><stop offset="1" {outer}/></radialGradient>"#,
            cx = num(fill.center.x),
            cy = num(fill.center.y),
            r = num(fill.radius),
            inner = stop_attrs(fill.inner),
            outer = stop_attrs(fill.outer),
        );
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="url(#{id})"/>"#,
            num(center.x),
            num(center.y),
            num(radius)
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &Stroke) {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="none" {}/>"#,
            num(center.x),
            num(center.y),
            num(radius),
            stroke_attrs(stroke)
        );
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}"{} text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            num(at.x),
            num(at.y),
            FONT_FAMILY,
            num(style.font_px),
            style.color.to_hex(),
            opacity_attr("fill-opacity", style.color.a),
            escape_xml_text(text)
        );
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    format!(
        r#"stroke="{}"{} stroke-width="{}""#,
        stroke.color.to_hex(),
        opacity_attr("stroke-opacity", stroke.color.a),
        num(stroke.width)
    )
}

fn stop_attrs(color: Rgba) -> String {
    format!(r#"stop-color="{}" stop-opacity="{}""#, color.to_hex(), num(color.a))
}

fn opacity_attr(name: &str, alpha: f64) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" {name}="{}""#, num(alpha))
    }
}

/// Shortest representation with at most three decimals: `400`, `296.3`.
fn num(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn escape_xml_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
