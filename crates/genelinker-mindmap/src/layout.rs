//! Radial layout: one central topic, five fixed branches, up to three
//! leaves per branch.

use std::collections::BTreeSet;

use genelinker_common::AnalysisResult;
use serde::Serialize;

pub const CANVAS_CENTER: Point = Point { x: 400.0, y: 300.0 };
pub const BRANCH_DISTANCE: f64 = 250.0;
pub const LEAF_DISTANCE: f64 = 120.0;
/// Angular gap between sibling leaves, in radians.
pub const LEAF_ANGLE_STEP: f64 = 0.5;
pub const MAX_LEAVES_PER_BRANCH: usize = 3;
pub const CENTRAL_LABEL_MAX: usize = 40;
pub const LEAF_LABEL_MAX: usize = 25;
pub const ELLIPSIS: char = '…';

const CENTRAL_ID: &str = "central";
const UNTITLED: &str = "Research Analysis";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Central,
    Branch,
    Leaf,
}

impl NodeKind {
    pub fn radius(self) -> f64 {
        match self {
            NodeKind::Central => 40.0,
            NodeKind::Branch  => 30.0,
            NodeKind::Leaf    => 20.0,
        }
    }

    pub fn font_px(self) -> f64 {
        match self {
            NodeKind::Central => 14.0,
            NodeKind::Branch  => 12.0,
            NodeKind::Leaf    => 10.0,
        }
    }
}

/// Semantic colour tag. Each kind of node has its own hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    Primary,
    Secondary,
    Accent,
}

impl NodeColor {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Central => NodeColor::Primary,
            NodeKind::Branch  => NodeColor::Secondary,
            NodeKind::Leaf    => NodeColor::Accent,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            NodeColor::Primary   => "#3b82f6",
            NodeColor::Secondary => "#10b981",
            NodeColor::Accent    => "#8b5cf6",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MindMapNode {
    pub id: String,
    pub label: String,
    pub position: Point,
    pub kind: NodeKind,
    pub color: NodeColor,
    pub radius: f64,
    /// Ids of the nodes this node links to.
    pub edges: BTreeSet<String>,
}

impl MindMapNode {
    fn new(id: impl Into<String>, label: String, position: Point, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label,
            position,
            kind,
            color: NodeColor::for_kind(kind),
            radius: kind.radius(),
            edges: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// The five sections of an analysis, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Findings,
    Methodology,
    Conclusions,
    Gaps,
    Future,
}

impl Branch {
    pub const ALL: [Branch; 5] = [
        Branch::Findings,
        Branch::Methodology,
        Branch::Conclusions,
        Branch::Gaps,
        Branch::Future,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Branch::Findings    => "findings",
            Branch::Methodology => "methodology",
            Branch::Conclusions => "conclusions",
            Branch::Gaps        => "gaps",
            Branch::Future      => "future",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Branch::Findings    => "Key Findings",
            Branch::Methodology => "Methodology",
            Branch::Conclusions => "Conclusions",
            Branch::Gaps        => "Research Gaps",
            Branch::Future      => "Future Directions",
        }
    }

    /// Unit direction from the canvas centre.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Branch::Findings    => (-0.8, -0.6),
            Branch::Methodology => (0.8, -0.6),
            Branch::Conclusions => (-0.8, 0.6),
            Branch::Gaps        => (0.8, 0.6),
            Branch::Future      => (0.0, 1.0),
        }
    }

    fn items(self, analysis: &AnalysisResult) -> Vec<String> {
        match self {
            Branch::Findings    => analysis.key_findings.clone(),
            Branch::Methodology => analysis.methodology_items(),
            Branch::Conclusions => analysis.conclusion_items(),
            Branch::Gaps        => analysis.research_gaps.clone(),
            Branch::Future      => analysis.future_directions.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MindMap {
    pub nodes: Vec<MindMapNode>,
    pub edges: Vec<Edge>,
}

impl MindMap {
    pub fn node(&self, id: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn central(&self) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.kind == NodeKind::Central)
    }

    pub fn branches(&self) -> impl Iterator<Item = &MindMapNode> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Branch)
    }

    /// Leaves hanging off `branch_id`, in layout order.
    pub fn leaves_of<'a>(&'a self, branch_id: &'a str) -> impl Iterator<Item = &'a MindMapNode> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.from == branch_id)
            .filter_map(move |e| self.node(&e.to))
            .filter(|n| n.kind == NodeKind::Leaf)
    }

    /// True when every edge endpoint names a node in the map.
    pub fn edges_resolve(&self) -> bool {
        self.edges
            .iter()
            .all(|e| self.node(&e.from).is_some() && self.node(&e.to).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push_node(&mut self, node: MindMapNode) {
        self.nodes.push(node);
    }

    fn link(&mut self, from: &str, to: &str) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == from) {
            node.edges.insert(to.to_string());
        }
        self.edges.push(Edge { from: from.to_string(), to: to.to_string() });
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let kept: String = text.chars().take(max - 1).collect();
    let mut out = kept.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Lay out `analysis` as a radial mind map around [`CANVAS_CENTER`].
pub fn layout(analysis: &AnalysisResult) -> MindMap {
    let mut map = MindMap::default();

    let title = analysis.title.trim();
    let title = if title.is_empty() { UNTITLED } else { title };
    map.push_node(MindMapNode::new(
        CENTRAL_ID,
        truncate(title, CENTRAL_LABEL_MAX),
        CANVAS_CENTER,
        NodeKind::Central,
    ));

    for branch in Branch::ALL {
        let (dx, dy) = branch.direction();
        let anchor = Point::new(
            CANVAS_CENTER.x + dx * BRANCH_DISTANCE,
            CANVAS_CENTER.y + dy * BRANCH_DISTANCE,
        );
        map.push_node(MindMapNode::new(branch.id(), branch.label().to_string(), anchor, NodeKind::Branch));
        map.link(CENTRAL_ID, branch.id());

        let items = branch.items(analysis);
        let midpoint = (MAX_LEAVES_PER_BRANCH as f64 - 1.0) / 2.0;
        for (index, item) in items.iter().take(MAX_LEAVES_PER_BRANCH).enumerate() {
            let angle = (index as f64 - midpoint) * LEAF_ANGLE_STEP;
            let position = Point::new(
                anchor.x + angle.cos() * LEAF_DISTANCE,
                anchor.y + angle.sin() * LEAF_DISTANCE,
            );
            let id = format!("{}_sub_{index}", branch.id());
            map.push_node(MindMapNode::new(
                id.clone(),
                truncate(item.trim(), LEAF_LABEL_MAX),
                position,
                NodeKind::Leaf,
            ));
            map.link(branch.id(), &id);
        }
    }

    tracing::debug!(nodes = map.nodes.len(), edges = map.edges.len(), "mind map laid out");
    map
}
