//! Interactive mind-map view: the current map, zoom/pan state and a dirty
//! flag that triggers a redraw after any change.

use genelinker_common::AnalysisResult;

use crate::layout::{layout, MindMap, Point};
use crate::render::{render_mind_map, Surface};
use crate::transform::{DragState, ViewTransform};

#[derive(Debug, Clone, Default)]
pub struct MindMapCanvas {
    map: MindMap,
    view: ViewTransform,
    drag: DragState,
    dirty: bool,
}

impl MindMapCanvas {
    pub fn new(analysis: &AnalysisResult) -> Self {
        Self { map: layout(analysis), dirty: true, ..Self::default() }
    }

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the node set with a fresh layout of `analysis`. The view is kept.
    pub fn set_analysis(&mut self, analysis: &AnalysisResult) {
        self.map = layout(analysis);
        self.dirty = true;
    }

    pub fn zoom_in(&mut self) {
        self.update_view(ViewTransform::zoom_in);
    }

    pub fn zoom_out(&mut self) {
        self.update_view(ViewTransform::zoom_out);
    }

    pub fn reset_view(&mut self) {
        self.update_view(ViewTransform::reset);
    }

    pub fn pointer_down(&mut self, at: Point) {
        self.drag.begin(at);
    }

    pub fn pointer_move(&mut self, at: Point) {
        if self.drag.move_to(at, &mut self.view) {
            self.dirty = true;
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    /// Draw onto `surface` if anything changed since the last draw.
    pub fn render_if_dirty<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.dirty {
            return false;
        }
        render_mind_map(&self.map, &self.view, surface);
        self.dirty = false;
        true
    }

    fn update_view(&mut self, f: impl FnOnce(&mut ViewTransform)) {
        let before = self.view;
        f(&mut self.view);
        if self.view != before {
            self.dirty = true;
        }
    }
}
