//! genelinker-mindmap — turns an [`AnalysisResult`](genelinker_common::AnalysisResult)
//! into a radial mind map and draws it.
//!
//! Layout is pure and deterministic. Drawing goes through the [`Surface`]
//! trait so the same draw sequence feeds the SVG writer, the PNG exporter
//! and test recorders.

pub mod layout;
pub mod wrap;
pub mod transform;
pub mod render;
pub mod svg;
pub mod canvas;
pub mod export;
#[cfg(feature = "png")]
pub mod png;

pub use layout::{layout, truncate, Branch, Edge, MindMap, MindMapNode, NodeColor, NodeKind, Point};
pub use wrap::{wrap_words, AverageGlyphMeasure, TextMeasure};
pub use transform::{DragState, ViewTransform, MAX_SCALE, MIN_SCALE, ZOOM_STEP};
pub use render::{render_mind_map, RadialGradient, Rgba, Stroke, Surface, TextStyle};
pub use svg::SvgSurface;
pub use canvas::MindMapCanvas;
