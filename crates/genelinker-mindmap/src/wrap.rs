//! Label wrapping and placement inside node circles.

use serde::Serialize;

use crate::layout::{MindMapNode, NodeKind, Point};

/// Vertical distance between wrapped label lines.
pub const LINE_SPACING: f64 = 14.0;
/// Lift applied to multi-word labels on central and branch nodes.
pub const MULTI_WORD_LIFT: f64 = 5.0;
/// Label width relative to the node diameter.
pub const WIDTH_FACTOR: f64 = 1.5;

/// Measures the rendered width of a string at a given font size.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font_px: f64) -> f64;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f64) -> f64,
{
    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        self(text, font_px)
    }
}

/// Width estimate for a proportional sans-serif face: every glyph is
/// `em_ratio` of the font size wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageGlyphMeasure {
    pub em_ratio: f64,
}

impl AverageGlyphMeasure {
    /// Courier-style fixed pitch.
    pub const MONOSPACE: Self = Self { em_ratio: 0.6 };
}

impl Default for AverageGlyphMeasure {
    fn default() -> Self {
        Self { em_ratio: 0.55 }
    }
}

impl TextMeasure for AverageGlyphMeasure {
    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * self.em_ratio
    }
}

/// Greedy first-fit wrap. A candidate line is measured with a trailing space
/// (`"line word "`), so a line fits only if it also has room for the
/// separator that would follow it. The first word of a label is never
/// checked, and a word that alone exceeds `max_width` gets a line of its own
/// rather than being split. Returned lines carry no trailing space.
pub fn wrap_words<M: TextMeasure + ?Sized>(text: &str, max_width: f64, font_px: f64, measure: &M) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word} ");
        if measure.measure_text(&candidate, font_px) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line.push(' ');
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLine {
    pub text: String,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLayout {
    pub font_px: f64,
    pub lines: Vec<LabelLine>,
}

/// Wrap a node's label to its circle and compute each line's baseline centre.
pub fn layout_label<M: TextMeasure + ?Sized>(node: &MindMapNode, measure: &M) -> LabelLayout {
    let font_px = node.kind.font_px();
    let max_width = node.radius * 2.0 * WIDTH_FACTOR;
    let word_count = node.label.split_whitespace().count();
    let start_y = if word_count > 2 && node.kind != NodeKind::Leaf {
        node.position.y - MULTI_WORD_LIFT
    } else {
        node.position.y
    };
    let lines = wrap_words(&node.label, max_width, font_px, measure)
        .into_iter()
        .enumerate()
        .map(|(i, text)| LabelLine {
            text,
            at: Point::new(node.position.x, start_y + i as f64 * LINE_SPACING),
        })
        .collect();
    LabelLayout { font_px, lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, NodeColor};
    use genelinker_common::AnalysisResult;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    /// One unit per character, ignoring font size.
    fn char_count(text: &str, _font_px: f64) -> f64 {
        text.chars().count() as f64
    }

    /// Reference first-fit: pack words while the joined length plus one
    /// trailing space stays within `max`.
    fn manual_first_fit(words: &[&str], max: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for word in words {
            match out.last_mut() {
                Some(last) if last.len() + 1 + word.len() + 1 <= max => {
                    last.push(' ');
                    last.push_str(word);
                }
                _ => out.push(word.to_string()),
            }
        }
        out
    }

    #[test]
    fn test_wrap_matches_manual_first_fit() {
        let text = "DNA repair pathways coordinate responses to replication stress in dividing cells";
        let words: Vec<&str> = text.split_whitespace().collect();
        for max in [5usize, 10, 18, 25, 80] {
            let wrapped = wrap_words(text, max as f64, 12.0, &char_count);
            assert_eq!(wrapped, manual_first_fit(&words, max), "max width {max}");
        }
    }

    #[test]
    fn test_trailing_space_counts_toward_width() {
        // "ab cd " is 6 units: fits at 6, breaks at 5 even though "ab cd" is 5.
        assert_eq!(wrap_words("ab cd", 6.0, 10.0, &char_count), vec!["ab cd"]);
        assert_eq!(wrap_words("ab cd", 5.0, 10.0, &char_count), vec!["ab", "cd"]);
    }

    #[test]
    fn test_leaf_width_breaks_on_trailing_space() {
        // "abcd efghi " at 5.5 px per glyph is 60.5 px, over a leaf's 60 px.
        let wrapped = wrap_words("abcd efghi", 60.0, 10.0, &AverageGlyphMeasure::default());
        assert_eq!(wrapped, vec!["abcd", "efghi"]);
    }

    #[test]
    fn test_first_word_is_never_checked() {
        assert_eq!(wrap_words("pseudouridylation", 3.0, 10.0, &char_count), vec!["pseudouridylation"]);
    }

    #[test]
    fn test_oversized_word_stays_whole() {
        let wrapped = wrap_words("a pseudouridylation b", 5.0, 10.0, &char_count);
        assert_eq!(wrapped, vec!["a", "pseudouridylation", "b"]);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap_words("   ", 100.0, 10.0, &char_count).is_empty());
    }

    #[test]
    fn test_average_glyph_measure_scales_with_font() {
        let m = AverageGlyphMeasure::default();
        assert_eq!(m.measure_text("abcd", 10.0), 22.0);
        assert!(m.measure_text("abcd", 14.0) > m.measure_text("abcd", 10.0));
    }

    fn node(label: &str, kind: NodeKind) -> MindMapNode {
        MindMapNode {
            id: "n".into(),
            label: label.into(),
            position: Point::new(100.0, 100.0),
            kind,
            color: NodeColor::for_kind(kind),
            radius: kind.radius(),
            edges: BTreeSet::new(),
        }
    }

    #[test]
    fn test_multi_word_branch_label_is_lifted() {
        let layout = layout_label(&node("one two three", NodeKind::Branch), &char_count);
        assert_eq!(layout.font_px, 12.0);
        assert_eq!(layout.lines[0].at, Point::new(100.0, 95.0));
    }

    #[test]
    fn test_leaf_label_is_not_lifted() {
        let layout = layout_label(&node("one two three", NodeKind::Leaf), &char_count);
        assert_eq!(layout.lines[0].at.y, 100.0);
    }

    #[test]
    fn test_lines_are_spaced() {
        // Leaf diameter 40 → max width 60 units; each word is 40 units wide.
        let wide = |t: &str, _: f64| t.split(' ').count() as f64 * 40.0;
        let layout = layout_label(&node("alpha beta gamma", NodeKind::Leaf), &wide);
        let ys: Vec<f64> = layout.lines.iter().map(|l| l.at.y).collect();
        assert_eq!(ys, vec![100.0, 114.0, 128.0]);
    }

    #[test]
    fn test_layout_labels_fit_for_real_map() {
        let analysis = AnalysisResult {
            title: "Research Gaps".into(),
            summary: String::new(),
            key_findings: vec!["x".into()],
            methodology: None,
            conclusions: None,
            research_gaps: vec![],
            future_directions: vec![],
            confidence_score: 0.8,
        };
        let map = layout(&analysis);
        let branch = map.node("future").unwrap();
        let label = layout_label(branch, &AverageGlyphMeasure::default());
        assert_eq!(
            label.lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join(" "),
            "Future Directions"
        );
    }
}
