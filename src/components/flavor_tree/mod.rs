//! Strain lineage viewer: entity tree to graph, layered layout, ancestry
//! folding and an interactive canvas.

mod component;
mod dom;
#[cfg(test)]
mod fixtures;
mod graph;
mod layout;
mod legend;
mod render;
mod scene;
mod state;
mod types;
mod visibility;

pub use component::FlavorTreeCanvas;
pub use graph::{GraphError, build_graph};
pub use layout::{LayoutConfig, content_bounds, layout};
pub use legend::ColorLegend;
pub use scene::{CubicCurve, Point, Scene, SceneEdge, SceneNode, compose_scene, edge_curve};
pub use state::{ViewTransform, ViewportConfig, ViewportController};
pub use types::{Bounds, Entity, GraphData, GraphEdge, GraphNode, MAX_TAGS, PositionedNode, slugify};
pub use visibility::{ClosurePolicy, HiddenSet, ancestor_closure, edge_visible, toggle, toggle_with};
