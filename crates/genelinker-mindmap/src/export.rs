//! Writing rendered mind maps to disk.

use std::path::{Path, PathBuf};

use genelinker_common::{sanitize_filename, write_artifact, GeneLinkerError};

use crate::layout::MindMap;
use crate::render::render_mind_map;
use crate::svg::SvgSurface;
use crate::transform::ViewTransform;

pub fn png_filename(title: &str) -> String {
    format!("mindmap_{}.png", sanitize_filename(title))
}

pub fn svg_filename(title: &str) -> String {
    format!("mindmap_{}.svg", sanitize_filename(title))
}

/// Render `map` to a standalone SVG document of the given canvas size.
pub fn render_svg(map: &MindMap, view: &ViewTransform, width: u32, height: u32) -> String {
    let mut surface = SvgSurface::new(width, height);
    render_mind_map(map, view, &mut surface);
    surface.finish()
}

pub fn export_svg(
    map: &MindMap,
    view: &ViewTransform,
    (width, height): (u32, u32),
    dir: &Path,
    title: &str,
) -> Result<PathBuf, GeneLinkerError> {
    let svg = render_svg(map, view, width, height);
    let path = write_artifact(dir, &svg_filename(title), svg.as_bytes())?;
    tracing::info!(path = %path.display(), "mind map exported as SVG");
    Ok(path)
}

/// Render and rasterize `map`. `png_width` rescales the output image.
#[cfg(feature = "png")]
pub fn export_png(
    map: &MindMap,
    view: &ViewTransform,
    (width, height): (u32, u32),
    png_width: Option<u32>,
    dir: &Path,
    title: &str,
) -> Result<PathBuf, GeneLinkerError> {
    let svg = render_svg(map, view, width, height);
    let png = crate::png::svg_to_png(&svg, png_width)?;
    let path = write_artifact(dir, &png_filename(title), &png)?;
    tracing::info!(path = %path.display(), bytes = png.len(), "mind map exported as PNG");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use genelinker_common::AnalysisResult;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            title: "CRISPR screens".into(),
            summary: String::new(),
            key_findings: vec!["Essential genes".into()],
            methodology: None,
            conclusions: None,
            research_gaps: vec![],
            future_directions: vec![],
            confidence_score: 0.9,
        }
    }

    #[test]
    fn test_filenames_are_sanitized() {
        assert_eq!(png_filename("CRISPR screens: 2024"), "mindmap_crispr_screens__2024.png");
        assert_eq!(svg_filename("TP53"), "mindmap_tp53.svg");
    }

    #[test]
    fn test_export_svg_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let map = layout(&analysis());
        let path = export_svg(&map, &ViewTransform::identity(), (800, 600), dir.path(), "CRISPR screens").unwrap();
        assert_eq!(path.file_name().unwrap(), "mindmap_crispr_screens.svg");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("CRISPR"));
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_export_png_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let map = layout(&analysis());
        let path = export_png(&map, &ViewTransform::identity(), (800, 600), Some(400), dir.path(), "CRISPR screens").unwrap();
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
