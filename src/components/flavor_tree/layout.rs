//! Layered top-to-bottom layout: longest-path ranks, median-sweep ordering
//! inside each rank, then centred coordinates per rank.

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};

use super::types::{Bounds, GraphEdge, GraphNode, PositionedNode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
	pub node_width: f64,
	pub node_height: f64,
	/// Horizontal gap between boxes of the same rank.
	pub node_sep: f64,
	/// Vertical gap between ranks.
	pub rank_sep: f64,
	pub margin_x: f64,
	pub margin_y: f64,
	pub ordering_passes: usize,
	pub bounds_pad_x: f64,
	pub bounds_pad_y: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_width: 180.0,
			node_height: 100.0,
			node_sep: 100.0,
			rank_sep: 180.0,
			margin_x: 60.0,
			margin_y: 60.0,
			ordering_passes: 4,
			bounds_pad_x: 150.0,
			bounds_pad_y: 100.0,
		}
	}
}

/// Index-based adjacency with unknown endpoints, self loops and duplicate
/// edges removed.
struct Adjacency {
	preds: Vec<Vec<usize>>,
	succs: Vec<Vec<usize>>,
}

impl Adjacency {
	fn new(nodes: &[GraphNode], edges: &[GraphEdge]) -> Self {
		let index: HashMap<&str, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let mut preds = vec![Vec::new(); nodes.len()];
		let mut succs = vec![Vec::new(); nodes.len()];
		for edge in edges {
			let (Some(&u), Some(&v)) = (
				index.get(edge.source.as_str()),
				index.get(edge.target.as_str()),
			) else {
				continue;
			};
			if u == v || succs[u].contains(&v) {
				continue;
			}
			succs[u].push(v);
			preds[v].push(u);
		}
		Self { preds, succs }
	}

	fn len(&self) -> usize {
		self.preds.len()
	}
}

/// Lay out `nodes` top-to-bottom. Output order matches input order.
pub fn layout(
	nodes: &[GraphNode],
	edges: &[GraphEdge],
	config: &LayoutConfig,
) -> Vec<PositionedNode> {
	if nodes.is_empty() {
		return Vec::new();
	}
	let adj = Adjacency::new(nodes, edges);
	let ranks = assign_ranks(&adj);
	let layers = order_layers(initial_layers(&ranks), &adj, config.ordering_passes);
	debug!(
		"layout: {} nodes in {} ranks, {} crossings",
		nodes.len(),
		layers.len(),
		count_crossings(&layers, &adj)
	);

	let widest = layers.iter().map(Vec::len).max().unwrap_or(1);
	let pitch_x = config.node_width + config.node_sep;
	let pitch_y = config.node_height + config.rank_sep;
	let block_width = |len: usize| len as f64 * pitch_x - config.node_sep;
	let center_x = config.margin_x + block_width(widest) / 2.0;

	let mut coords = vec![(0.0, 0.0); nodes.len()];
	for (rank, layer) in layers.iter().enumerate() {
		let left = center_x - block_width(layer.len()) / 2.0;
		let y = config.margin_y + config.node_height / 2.0 + rank as f64 * pitch_y;
		for (slot, &v) in layer.iter().enumerate() {
			coords[v] = (left + config.node_width / 2.0 + slot as f64 * pitch_x, y);
		}
	}

	nodes
		.iter()
		.zip(ranks)
		.zip(coords)
		.map(|((node, rank), (x, y))| PositionedNode {
			node: node.clone(),
			rank,
			x,
			y,
		})
		.collect()
}

/// Longest path from any source, so every edge points strictly downward.
fn assign_ranks(adj: &Adjacency) -> Vec<usize> {
	let n = adj.len();
	let mut indegree: Vec<usize> = adj.preds.iter().map(Vec::len).collect();
	let mut queued: Vec<bool> = indegree.iter().map(|&d| d == 0).collect();
	let mut queue: VecDeque<usize> = (0..n).filter(|&v| queued[v]).collect();
	let mut rank = vec![0; n];
	let mut processed = 0;

	loop {
		while let Some(v) = queue.pop_front() {
			processed += 1;
			for &w in &adj.succs[v] {
				if queued[w] {
					continue;
				}
				rank[w] = rank[w].max(rank[v] + 1);
				indegree[w] -= 1;
				if indegree[w] == 0 {
					queued[w] = true;
					queue.push_back(w);
				}
			}
		}
		if processed == n {
			break;
		}
		// Only reachable with cyclic input; release nodes in declaration order.
		let Some(v) = (0..n).find(|&v| !queued[v]) else {
			break;
		};
		warn!("layout input contains a cycle; breaking it at node #{v}");
		queued[v] = true;
		queue.push_back(v);
	}
	rank
}

fn initial_layers(ranks: &[usize]) -> Vec<Vec<usize>> {
	let depth = ranks.iter().max().map_or(0, |r| r + 1);
	let mut layers = vec![Vec::new(); depth];
	for (v, &r) in ranks.iter().enumerate() {
		layers[r].push(v);
	}
	layers
}

/// Slot coordinate of every node, centred so layers of different widths
/// line up on the same axis.
fn slot_positions(layers: &[Vec<usize>], n: usize) -> Vec<f64> {
	let mut pos = vec![0.0; n];
	for layer in layers {
		let mid = (layer.len() as f64 - 1.0) / 2.0;
		for (i, &v) in layer.iter().enumerate() {
			pos[v] = i as f64 - mid;
		}
	}
	pos
}

fn median(values: &mut [f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	values.sort_by(f64::total_cmp);
	let mid = values.len() / 2;
	Some(if values.len() % 2 == 1 {
		values[mid]
	} else {
		(values[mid - 1] + values[mid]) / 2.0
	})
}

fn sort_layer(layer: &mut [usize], neighbours: &[Vec<usize>], pos: &[f64]) {
	let mut keyed: Vec<(f64, usize)> = layer
		.iter()
		.map(|&v| {
			let mut around: Vec<f64> = neighbours[v].iter().map(|&u| pos[u]).collect();
			(median(&mut around).unwrap_or(pos[v]), v)
		})
		.collect();
	// Stable: ties keep their current order.
	keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
	for (slot, (_, v)) in layer.iter_mut().zip(keyed) {
		*slot = v;
	}
}

/// Alternate downward (by parents) and upward (by children) median sweeps,
/// keeping the ordering with the fewest crossings seen.
fn order_layers(mut layers: Vec<Vec<usize>>, adj: &Adjacency, passes: usize) -> Vec<Vec<usize>> {
	let mut best = layers.clone();
	let mut best_crossings = count_crossings(&layers, adj);

	for pass in 0..passes {
		if best_crossings == 0 {
			break;
		}
		if pass % 2 == 0 {
			for r in 1..layers.len() {
				let pos = slot_positions(&layers, adj.len());
				sort_layer(&mut layers[r], &adj.preds, &pos);
			}
		} else {
			for r in (0..layers.len().saturating_sub(1)).rev() {
				let pos = slot_positions(&layers, adj.len());
				sort_layer(&mut layers[r], &adj.succs, &pos);
			}
		}
		let crossings = count_crossings(&layers, adj);
		if crossings < best_crossings {
			best_crossings = crossings;
			best = layers.clone();
		}
	}
	best
}

/// Crossings between edges joining adjacent ranks.
fn count_crossings(layers: &[Vec<usize>], adj: &Adjacency) -> usize {
	let pos = slot_positions(layers, adj.len());
	let mut total = 0;
	for pair in layers.windows(2) {
		let (upper, lower) = (&pair[0], &pair[1]);
		let mut segments: Vec<(f64, f64)> = Vec::new();
		for &u in upper {
			for &w in &adj.succs[u] {
				if lower.contains(&w) {
					segments.push((pos[u], pos[w]));
				}
			}
		}
		for (i, a) in segments.iter().enumerate() {
			for b in &segments[i + 1..] {
				if (a.0 - b.0) * (a.1 - b.1) < 0.0 {
					total += 1;
				}
			}
		}
	}
	total
}

/// Padded rectangle around all boxes; `Bounds::FALLBACK` when empty.
pub fn content_bounds(nodes: &[PositionedNode], config: &LayoutConfig) -> Bounds {
	if nodes.is_empty() {
		return Bounds::FALLBACK;
	}
	let mut b = Bounds {
		min_x: f64::INFINITY,
		max_x: f64::NEG_INFINITY,
		min_y: f64::INFINITY,
		max_y: f64::NEG_INFINITY,
	};
	for n in nodes {
		b.min_x = b.min_x.min(n.x);
		b.max_x = b.max_x.max(n.x);
		b.min_y = b.min_y.min(n.y);
		b.max_y = b.max_y.max(n.y);
	}
	b.min_x -= config.bounds_pad_x;
	b.max_x += config.bounds_pad_x;
	b.min_y -= config.bounds_pad_y;
	b.max_y += config.bounds_pad_y;
	if b.is_degenerate() {
		return Bounds::FALLBACK;
	}
	b
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use proptest::prelude::*;

	use super::*;
	use crate::components::flavor_tree::fixtures::{diamond, random_graph};
	use crate::components::flavor_tree::graph::build_graph;

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.to_uppercase(),
			category: String::new(),
			flavors: Vec::new(),
			thc: None,
			cbd: None,
		}
	}

	fn by_id(out: &[PositionedNode]) -> HashMap<&str, &PositionedNode> {
		out.iter().map(|p| (p.node.id.as_str(), p)).collect()
	}

	#[test]
	fn diamond_ranks_and_coordinates() {
		let g = build_graph(&diamond()).unwrap();
		let out = layout(&g.nodes, &g.edges, &LayoutConfig::default());
		let p = by_id(&out);

		assert_eq!(p["d"].rank, 0);
		assert_eq!(p["b"].rank, 1);
		assert_eq!(p["c"].rank, 1);
		assert_eq!(p["a"].rank, 2);

		assert_eq!((p["d"].x, p["d"].y), (290.0, 110.0));
		assert_eq!((p["b"].x, p["b"].y), (150.0, 390.0));
		assert_eq!((p["c"].x, p["c"].y), (430.0, 390.0));
		assert_eq!((p["a"].x, p["a"].y), (290.0, 670.0));
	}

	#[test]
	fn output_follows_input_order() {
		let g = build_graph(&diamond()).unwrap();
		let out = layout(&g.nodes, &g.edges, &LayoutConfig::default());
		let ids: Vec<&str> = out.iter().map(|p| p.node.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b", "d", "c"]);
	}

	#[test]
	fn rank_is_longest_path() {
		// r -> x -> y -> t and r -> t: t sits below y, not directly under r.
		let nodes = vec![node("t"), node("y"), node("x"), node("r")];
		let edges = vec![
			GraphEdge::new("r", "x"),
			GraphEdge::new("x", "y"),
			GraphEdge::new("y", "t"),
			GraphEdge::new("r", "t"),
		];
		let out = layout(&nodes, &edges, &LayoutConfig::default());
		let p = by_id(&out);
		assert_eq!(p["r"].rank, 0);
		assert_eq!(p["t"].rank, 3);
	}

	#[test]
	fn median_sweep_untangles_crossed_children() {
		let nodes = vec![node("x"), node("y"), node("p"), node("q")];
		let edges = vec![GraphEdge::new("x", "q"), GraphEdge::new("y", "p")];
		let out = layout(&nodes, &edges, &LayoutConfig::default());
		let p = by_id(&out);
		assert!(p["x"].x < p["y"].x);
		assert!(p["q"].x < p["p"].x);
	}

	#[test]
	fn empty_graph_has_fallback_bounds() {
		let config = LayoutConfig::default();
		let out = layout(&[], &[], &config);
		assert!(out.is_empty());
		assert_eq!(content_bounds(&out, &config), Bounds::FALLBACK);
	}

	#[test]
	fn bounds_are_padded() {
		let g = build_graph(&diamond()).unwrap();
		let config = LayoutConfig::default();
		let b = content_bounds(&layout(&g.nodes, &g.edges, &config), &config);
		assert_eq!(
			b,
			Bounds {
				min_x: 0.0,
				max_x: 580.0,
				min_y: 10.0,
				max_y: 770.0
			}
		);
	}

	#[test]
	fn cycle_does_not_hang() {
		let nodes = vec![node("a"), node("b"), node("c")];
		let edges = vec![
			GraphEdge::new("a", "b"),
			GraphEdge::new("b", "c"),
			GraphEdge::new("c", "b"),
		];
		let out = layout(&nodes, &edges, &LayoutConfig::default());
		assert_eq!(out.len(), 3);
		let p = by_id(&out);
		assert!(p["a"].rank < p["b"].rank);
	}

	#[test]
	fn dangling_edges_are_ignored() {
		let nodes = vec![node("a")];
		let edges = vec![GraphEdge::new("ghost", "a")];
		let out = layout(&nodes, &edges, &LayoutConfig::default());
		assert_eq!(out[0].rank, 0);
	}

	proptest! {
		#[test]
		fn every_edge_points_down(g in random_graph()) {
			let out = layout(&g.nodes, &g.edges, &LayoutConfig::default());
			prop_assert_eq!(out.len(), g.nodes.len());
			let p = by_id(&out);
			for e in &g.edges {
				prop_assert!(p[e.source.as_str()].rank < p[e.target.as_str()].rank);
				prop_assert!(p[e.source.as_str()].y < p[e.target.as_str()].y);
			}
		}

		#[test]
		fn layout_is_deterministic(g in random_graph()) {
			let config = LayoutConfig::default();
			let first = layout(&g.nodes, &g.edges, &config);
			let second = layout(&g.nodes, &g.edges, &config);
			let bits = |v: &[PositionedNode]| -> Vec<(u64, u64)> {
				v.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect()
			};
			prop_assert_eq!(bits(&first), bits(&second));
		}

		#[test]
		fn boxes_in_a_rank_do_not_overlap(g in random_graph()) {
			let config = LayoutConfig::default();
			let out = layout(&g.nodes, &g.edges, &config);
			for a in &out {
				for b in &out {
					if a.node.id != b.node.id && a.rank == b.rank {
						prop_assert!((a.x - b.x).abs() >= config.node_width + config.node_sep - 1e-9);
					}
				}
			}
		}
	}
}
