//! Rasterize SVG documents to PNG with resvg.

use std::sync::Arc;

use genelinker_common::GeneLinkerError;
use resvg::tiny_skia;
use resvg::usvg;
use tracing::warn;

/// System fonts used for label text.
fn font_database() -> usvg::fontdb::Database {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    check_fonts(&fontdb);
    fontdb
}

/// Returns false, with a warning, when no font is available. resvg then
/// drops every text node, so the PNG has circles and edges but no labels.
fn check_fonts(fontdb: &usvg::fontdb::Database) -> bool {
    if fontdb.is_empty() {
        warn!("no system fonts found; PNG mind maps will be rendered without labels");
        return false;
    }
    true
}

/// Rasterize `svg` to PNG bytes. With `width` set the image is scaled to that
/// width and the height follows the aspect ratio; otherwise 1:1.
pub fn svg_to_png(svg: &str, width: Option<u32>) -> Result<Vec<u8>, GeneLinkerError> {
    let opts = usvg::Options {
        font_family: "Arial".to_string(),
        fontdb: Arc::new(font_database()),
        ..usvg::Options::default()
    };

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| GeneLinkerError::Render(format!("failed to parse SVG: {e}")))?;

    let size = tree.size();
    let (svg_w, svg_h) = (size.width(), size.height());
    let (px_w, px_h) = match width {
        Some(w) => (w, (svg_h * (w as f32 / svg_w)).ceil() as u32),
        None => (svg_w.ceil() as u32, svg_h.ceil() as u32),
    };
    if px_w == 0 || px_h == 0 {
        return Err(GeneLinkerError::Render("computed image dimensions are zero".to_string()));
    }

    let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
        .ok_or_else(|| GeneLinkerError::Render("failed to allocate pixmap".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(px_w as f32 / svg_w, px_h as f32 / svg_h);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| GeneLinkerError::Render(format!("failed to encode PNG: {e}")))
}
