//! Drawable primitives for one frame, in layout space.

use std::collections::HashMap;

use super::layout::LayoutConfig;
use super::types::{GraphEdge, PositionedNode};
use super::visibility::{HiddenSet, edge_visible};
use crate::palette::{Rgb, mix_colors, tag_to_color, tag_to_icon};

pub const SUPPRESSED_OPACITY: f64 = 0.15;
pub const ARROW_SIZE: f64 = 12.0;
/// Control-point offset per unit of horizontal distance between endpoints.
pub const CURVE_FACTOR: f64 = 0.3;

const SWATCH_FALLBACK: [Rgb; 3] = [
	Rgb::new(255, 255, 0),
	Rgb::new(0, 255, 0),
	Rgb::new(0, 0, 255),
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: String,
	pub name: String,
	pub category: String,
	/// Top-left corner.
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub fill: Rgb,
	pub swatches: [Rgb; 3],
	pub icons: Vec<&'static str>,
	pub suppressed: bool,
}

impl SceneNode {
	pub fn opacity(&self) -> f64 {
		if self.suppressed {
			SUPPRESSED_OPACITY
		} else {
			1.0
		}
	}

	pub fn contains(&self, gx: f64, gy: f64) -> bool {
		gx >= self.x && gx <= self.x + self.width && gy >= self.y && gy <= self.y + self.height
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicCurve {
	pub start: Point,
	pub c1: Point,
	pub c2: Point,
	pub end: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub source: String,
	pub target: String,
	pub curve: CubicCurve,
	/// Tip first.
	pub arrow: [Point; 3],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
}

impl Scene {
	/// Topmost node under a layout-space point. Suppressed nodes still count
	/// so they can be re-shown.
	pub fn node_at(&self, gx: f64, gy: f64) -> Option<&SceneNode> {
		self.nodes.iter().rev().find(|n| n.contains(gx, gy))
	}
}

/// S-curve from the bottom-centre of the source box to the top-centre of the
/// target box. Wider horizontal offsets bend more.
pub fn edge_curve(source: &PositionedNode, target: &PositionedNode, config: &LayoutConfig) -> CubicCurve {
	let half = config.node_height / 2.0;
	let start = Point::new(source.x, source.y + half);
	let end = Point::new(target.x, target.y - half);
	let bend = (end.x - start.x).abs() * CURVE_FACTOR;
	CubicCurve {
		start,
		c1: Point::new(start.x, start.y + bend),
		c2: Point::new(end.x, end.y - bend),
		end,
	}
}

fn arrow_head(curve: &CubicCurve) -> [Point; 3] {
	let (mut dx, mut dy) = (curve.end.x - curve.c2.x, curve.end.y - curve.c2.y);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 1e-9 {
		// Straight curve: the control point sits on the tip.
		(dx, dy) = (curve.end.x - curve.start.x, curve.end.y - curve.start.y);
	}
	let len = (dx * dx + dy * dy).sqrt();
	let (ux, uy) = if len < 1e-9 { (0.0, 1.0) } else { (dx / len, dy / len) };
	let tip = curve.end;
	let (bx, by) = (tip.x - ux * ARROW_SIZE, tip.y - uy * ARROW_SIZE);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	[tip, Point::new(bx + px, by + py), Point::new(bx - px, by - py)]
}

/// Join layout output with the hidden set. Hidden nodes stay in the scene as
/// suppressed; edges appear only when both endpoints exist and are visible.
pub fn compose_scene(
	positioned: &[PositionedNode],
	edges: &[GraphEdge],
	hidden: &HiddenSet,
	config: &LayoutConfig,
) -> Scene {
	let by_id: HashMap<&str, &PositionedNode> = positioned
		.iter()
		.map(|p| (p.node.id.as_str(), p))
		.collect();

	let edges = edges
		.iter()
		.filter(|e| edge_visible(e, hidden))
		.filter_map(|e| {
			let source = by_id.get(e.source.as_str())?;
			let target = by_id.get(e.target.as_str())?;
			let curve = edge_curve(source, target, config);
			Some(SceneEdge {
				source: e.source.clone(),
				target: e.target.clone(),
				arrow: arrow_head(&curve),
				curve,
			})
		})
		.collect();

	let nodes = positioned
		.iter()
		.map(|p| {
			let flavors = &p.node.flavors;
			let mut swatches = SWATCH_FALLBACK;
			for (slot, tag) in swatches.iter_mut().zip(flavors) {
				if let Some(rgb) = tag_to_color(tag) {
					*slot = rgb;
				}
			}
			SceneNode {
				id: p.node.id.clone(),
				name: p.node.name.clone(),
				category: p.node.category.clone(),
				x: p.x - config.node_width / 2.0,
				y: p.y - config.node_height / 2.0,
				width: config.node_width,
				height: config.node_height,
				fill: mix_colors(flavors.as_slice()),
				swatches,
				icons: flavors.iter().map(|f| tag_to_icon(f)).collect(),
				suppressed: hidden.contains(&p.node.id),
			}
		})
		.collect();

	Scene { nodes, edges }
}
