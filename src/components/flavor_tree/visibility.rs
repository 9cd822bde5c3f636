//! Collapse/expand of ancestor subtrees.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use super::types::GraphEdge;

/// Identifiers of collapsed nodes. Edges are never stored; see [`edge_visible`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HiddenSet(HashSet<String>);

impl HiddenSet {
	pub fn contains(&self, id: &str) -> bool {
		self.0.contains(id)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

impl<S: Into<String>> FromIterator<S> for HiddenSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// How hiding treats ancestors that other visible nodes still descend from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClosurePolicy {
	/// Keep an ancestor visible while a visible node outside the toggled
	/// closure still reaches it through visible nodes.
	#[default]
	PreserveShared,
	/// Hide the whole ancestor closure of the toggled node.
	PerToggle,
}

fn parents_index(edges: &[GraphEdge]) -> HashMap<&str, Vec<&str>> {
	let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
	for e in edges {
		parents
			.entry(e.target.as_str())
			.or_default()
			.push(e.source.as_str());
	}
	parents
}

/// Walk parent edges backward from every start node, visiting each node once.
/// Nodes rejected by `can_enter` are neither returned nor walked through.
fn walk_up<'a>(
	starts: impl IntoIterator<Item = &'a str>,
	parents: &HashMap<&'a str, Vec<&'a str>>,
	mut can_enter: impl FnMut(&str) -> bool,
) -> HashSet<&'a str> {
	let mut seen: HashSet<&str> = HashSet::new();
	let mut queue: VecDeque<&str> = VecDeque::new();
	for s in starts {
		if seen.insert(s) {
			queue.push_back(s);
		}
	}
	while let Some(id) = queue.pop_front() {
		for &p in parents.get(id).into_iter().flatten() {
			if can_enter(p) && seen.insert(p) {
				queue.push_back(p);
			}
		}
	}
	seen
}

/// `node_id` plus every node reachable from it through parent edges.
pub fn ancestor_closure(node_id: &str, edges: &[GraphEdge]) -> HashSet<String> {
	let parents = parents_index(edges);
	walk_up([node_id], &parents, |_| true)
		.into_iter()
		.map(str::to_owned)
		.collect()
}

/// Toggle with the default [`ClosurePolicy`].
pub fn toggle(node_id: &str, hidden: &HiddenSet, edges: &[GraphEdge]) -> HiddenSet {
	toggle_with(node_id, hidden, edges, ClosurePolicy::default())
}

/// Show `node_id` and its ancestors if it is hidden, otherwise hide them.
pub fn toggle_with(
	node_id: &str,
	hidden: &HiddenSet,
	edges: &[GraphEdge],
	policy: ClosurePolicy,
) -> HiddenSet {
	let parents = parents_index(edges);
	let closure = walk_up([node_id], &parents, |_| true);
	let mut next = hidden.clone();

	if hidden.contains(node_id) {
		for id in &closure {
			next.0.remove(*id);
		}
		debug!("show `{node_id}`: {} nodes revealed", closure.len());
		return next;
	}

	let kept = match policy {
		ClosurePolicy::PerToggle => HashSet::new(),
		ClosurePolicy::PreserveShared => {
			// Every visible edge endpoint outside the closure.
			let anchors: Vec<&str> = edges
				.iter()
				.flat_map(|e| [e.source.as_str(), e.target.as_str()])
				.filter(|id| !closure.contains(id) && !hidden.contains(id))
				.collect();
			walk_up(anchors, &parents, |id| {
				id != node_id && !hidden.contains(id)
			})
		}
	};
	let mut added = 0;
	for id in closure.iter().filter(|id| !kept.contains(*id)) {
		if next.0.insert((*id).to_owned()) {
			added += 1;
		}
	}
	debug!(
		"hide `{node_id}`: {added} nodes hidden, {} shared ancestors kept",
		closure.iter().filter(|id| kept.contains(*id)).count()
	);
	next
}

/// An edge is drawn only when both endpoints are visible.
pub fn edge_visible(edge: &GraphEdge, hidden: &HiddenSet) -> bool {
	!hidden.contains(&edge.source) && !hidden.contains(&edge.target)
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;
	use proptest::sample::Index;

	use super::*;
	use crate::components::flavor_tree::fixtures::{diamond, random_graph};
	use crate::components::flavor_tree::graph::build_graph;

	fn diamond_edges() -> Vec<GraphEdge> {
		build_graph(&diamond()).unwrap().edges
	}

	fn set(ids: &[&str]) -> HiddenSet {
		ids.iter().copied().collect()
	}

	#[test]
	fn closure_follows_parents_only() {
		let edges = diamond_edges();
		let closure = ancestor_closure("b", &edges);
		assert_eq!(closure, ["b", "d"].into_iter().map(String::from).collect());
		assert_eq!(ancestor_closure("a", &edges).len(), 4);
		assert_eq!(ancestor_closure("d", &edges).len(), 1);
	}

	#[test]
	fn hiding_root_hides_every_ancestor() {
		let hidden = toggle("a", &HiddenSet::default(), &diamond_edges());
		assert_eq!(hidden, set(&["a", "b", "c", "d"]));
	}

	#[test]
	fn shared_ancestor_stays_while_sibling_is_visible() {
		let edges = diamond_edges();
		let hidden = toggle("b", &HiddenSet::default(), &edges);
		assert_eq!(hidden, set(&["b"]));
		assert!(!hidden.contains("d"));
	}

	#[test]
	fn shared_ancestor_goes_once_all_descendants_are_hidden() {
		let edges = diamond_edges();
		let hidden = toggle("b", &HiddenSet::default(), &edges);
		let hidden = toggle("c", &hidden, &edges);
		assert_eq!(hidden, set(&["b", "c", "d"]));
	}

	#[test]
	fn per_toggle_policy_hides_full_closure() {
		let edges = diamond_edges();
		let hidden = toggle_with("b", &HiddenSet::default(), &edges, ClosurePolicy::PerToggle);
		assert_eq!(hidden, set(&["b", "d"]));
	}

	#[test]
	fn showing_reveals_closure() {
		let edges = diamond_edges();
		let hidden = toggle("a", &HiddenSet::default(), &edges);
		let shown = toggle("b", &hidden, &edges);
		assert_eq!(shown, set(&["a", "c"]));
	}

	#[test]
	fn showing_also_reveals_ancestors_hidden_earlier() {
		let edges = diamond_edges();
		let hidden = toggle_with("d", &HiddenSet::default(), &edges, ClosurePolicy::PerToggle);
		let hidden = toggle_with("b", &hidden, &edges, ClosurePolicy::PerToggle);
		assert_eq!(hidden, set(&["b", "d"]));
		assert_eq!(toggle("b", &hidden, &edges), HiddenSet::default());
	}

	#[test]
	fn edges_touching_hidden_nodes_are_invisible() {
		let edges = diamond_edges();
		let hidden = set(&["b"]);
		let visible: Vec<(&str, &str)> = edges
			.iter()
			.filter(|e| edge_visible(e, &hidden))
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect();
		assert_eq!(visible, vec![("c", "a"), ("d", "c")]);
	}

	#[test]
	fn unknown_node_toggles_only_itself() {
		let edges = diamond_edges();
		let hidden = toggle("zz", &HiddenSet::default(), &edges);
		assert_eq!(hidden, set(&["zz"]));
		assert_eq!(toggle("zz", &hidden, &edges), HiddenSet::default());
	}

	proptest! {
		#[test]
		fn toggle_twice_restores_the_set(
			g in random_graph(),
			earlier in prop::collection::vec(any::<Index>(), 0..4),
			pick in any::<Index>(),
		) {
			let id = g.nodes[pick.index(g.nodes.len())].id.clone();
			let closure = ancestor_closure(&id, &g.edges);
			for policy in [ClosurePolicy::PreserveShared, ClosurePolicy::PerToggle] {
				let start = earlier.iter().fold(HiddenSet::default(), |s, i| {
					toggle_with(&g.nodes[i.index(g.nodes.len())].id, &s, &g.edges, policy)
				});
				// Showing reveals the whole closure, so only sets that keep
				// clear of it come back unchanged.
				if closure.iter().any(|n| start.contains(n)) {
					continue;
				}
				let once = toggle_with(&id, &start, &g.edges, policy);
				prop_assert!(once.contains(&id));
				let twice = toggle_with(&id, &once, &g.edges, policy);
				prop_assert_eq!(&twice, &start);
			}
		}

		#[test]
		fn per_toggle_hides_a_superset(g in random_graph(), pick in any::<Index>()) {
			let id = g.nodes[pick.index(g.nodes.len())].id.clone();
			let shared = toggle_with(&id, &HiddenSet::default(), &g.edges, ClosurePolicy::PreserveShared);
			let full = toggle_with(&id, &HiddenSet::default(), &g.edges, ClosurePolicy::PerToggle);
			prop_assert!(shared.0.iter().all(|n| full.contains(n)));
			prop_assert_eq!(full.len(), ancestor_closure(&id, &g.edges).len());
		}
	}
}
