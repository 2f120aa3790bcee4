//! Draw sequence for a mind map against an abstract 2-D surface.

use crate::layout::{MindMap, Point};
use crate::transform::ViewTransform;
use crate::wrap::{layout_label, TextMeasure};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 1.0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

/// Radial fill from `inner` at the centre to `outer` at `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub radius: f64,
    pub inner: Rgba,
    pub outer: Rgba,
}

/// Centred text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_px: f64,
    pub color: Rgba,
}

/// A 2-D drawing target with a canvas-like transform stack.
pub trait Surface: TextMeasure {
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn scale(&mut self, factor: f64);
    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke);
    fn fill_circle(&mut self, center: Point, radius: f64, fill: &RadialGradient);
    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &Stroke);
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);
}

pub const EDGE_STROKE: Stroke = Stroke { color: Rgba::rgb(0xe5, 0xe7, 0xeb), width: 2.0 };
pub const NODE_BORDER: Stroke = Stroke { color: Rgba::WHITE, width: 3.0 };
pub const GRADIENT_EDGE_ALPHA: f64 = 0.5;

/// Draw `map` under `view`: edges first, then node discs, then labels.
pub fn render_mind_map<S: Surface + ?Sized>(map: &MindMap, view: &ViewTransform, surface: &mut S) {
    surface.clear();
    surface.save();
    surface.translate(view.offset_x, view.offset_y);
    surface.scale(view.scale);

    for edge in &map.edges {
        if let (Some(from), Some(to)) = (map.node(&edge.from), map.node(&edge.to)) {
            surface.stroke_line(from.position, to.position, &EDGE_STROKE);
        }
    }

    for node in &map.nodes {
        let base = Rgba::from_hex(node.color.hex()).unwrap_or(Rgba::WHITE);
        let fill = RadialGradient {
            center: node.position,
            radius: node.radius,
            inner: base,
            outer: base.with_alpha(GRADIENT_EDGE_ALPHA),
        };
        surface.fill_circle(node.position, node.radius, &fill);
        surface.stroke_circle(node.position, node.radius, &NODE_BORDER);

        let label = layout_label(node, &*surface);
        let style = TextStyle { font_px: label.font_px, color: Rgba::WHITE };
        for line in &label.lines {
            surface.fill_text(&line.text, line.at, &style);
        }
    }

    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use genelinker_common::AnalysisResult;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Save,
        Restore,
        Translate(f64, f64),
        Scale(f64),
        Line,
        Fill(String),
        Border,
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl TextMeasure for Recorder {
        fn measure_text(&self, text: &str, font_px: f64) -> f64 {
            text.len() as f64 * font_px * 0.5
        }
    }

    impl Surface for Recorder {
        fn clear(&mut self) { self.ops.push(Op::Clear) }
        fn save(&mut self) { self.ops.push(Op::Save) }
        fn restore(&mut self) { self.ops.push(Op::Restore) }
        fn translate(&mut self, dx: f64, dy: f64) { self.ops.push(Op::Translate(dx, dy)) }
        fn scale(&mut self, factor: f64) { self.ops.push(Op::Scale(factor)) }
        fn stroke_line(&mut self, _: Point, _: Point, stroke: &Stroke) {
            assert_eq!(stroke.width, 2.0);
            self.ops.push(Op::Line)
        }
        fn fill_circle(&mut self, _: Point, _: f64, fill: &RadialGradient) {
            assert_eq!(fill.outer.a, 0.5);
            self.ops.push(Op::Fill(fill.inner.to_hex()))
        }
        fn stroke_circle(&mut self, _: Point, _: f64, stroke: &Stroke) {
            assert_eq!(stroke.color, Rgba::WHITE);
            self.ops.push(Op::Border)
        }
        fn fill_text(&mut self, text: &str, _: Point, _: &TextStyle) {
            self.ops.push(Op::Text(text.to_string()))
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            title: "BRCA1".into(),
            summary: String::new(),
            key_findings: vec!["Homologous recombination".into()],
            methodology: None,
            conclusions: None,
            research_gaps: vec![],
            future_directions: vec![],
            confidence_score: 0.8,
        }
    }

    #[test]
    fn test_draw_order() {
        let map = layout(&analysis());
        let view = ViewTransform { scale: 1.5, offset_x: 12.0, offset_y: -4.0 };
        let mut rec = Recorder::default();
        render_mind_map(&map, &view, &mut rec);

        assert_eq!(
            rec.ops[..4].to_vec(),
            vec![Op::Clear, Op::Save, Op::Translate(12.0, -4.0), Op::Scale(1.5)]
        );
        assert_eq!(rec.ops.last(), Some(&Op::Restore));

        let lines: Vec<usize> = rec.ops.iter().enumerate().filter(|(_, o)| **o == Op::Line).map(|(i, _)| i).collect();
        let first_fill = rec.ops.iter().position(|o| matches!(o, Op::Fill(_))).unwrap();
        assert_eq!(lines.len(), map.edges.len());
        assert!(lines.iter().all(|&i| i < first_fill));
    }

    #[test]
    fn test_nodes_drawn_with_kind_colours() {
        let map = layout(&analysis());
        let mut rec = Recorder::default();
        render_mind_map(&map, &ViewTransform::identity(), &mut rec);
        let fills: Vec<&Op> = rec.ops.iter().filter(|o| matches!(o, Op::Fill(_))).collect();
        assert_eq!(fills.len(), map.nodes.len());
        assert_eq!(fills[0], &Op::Fill("#3b82f6".into()));
        assert_eq!(fills[1], &Op::Fill("#10b981".into()));
        assert_eq!(fills.last().copied(), Some(&Op::Fill("#10b981".into())));
        assert!(rec.ops.contains(&Op::Text("BRCA1".into())));
    }

    #[test]
    fn test_every_fill_is_followed_by_border() {
        let map = layout(&analysis());
        let mut rec = Recorder::default();
        render_mind_map(&map, &ViewTransform::identity(), &mut rec);
        for (i, op) in rec.ops.iter().enumerate() {
            if matches!(op, Op::Fill(_)) {
                assert_eq!(rec.ops[i + 1], Op::Border);
            }
        }
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#e5e7eb"), Some(Rgba::rgb(0xe5, 0xe7, 0xeb)));
        assert_eq!(Rgba::from_hex("e5e7eb"), None);
        assert_eq!(Rgba::from_hex("#zzzzzz"), None);
        assert_eq!(Rgba::rgb(59, 130, 246).to_hex(), "#3b82f6");
    }
}
