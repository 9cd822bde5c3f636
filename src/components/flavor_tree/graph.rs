//! Flattens a nested strain record into a deduplicated parent -> child graph.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};

use super::types::{Entity, GraphData, GraphEdge, GraphNode};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
	#[error("invalid entity at {context}: neither an id nor a name is set")]
	InvalidEntity { context: String },
}

/// Build one node per distinct identifier and one edge per distinct
/// (parent, child) pair reachable from `root`.
pub fn build_graph(root: &Entity) -> Result<GraphData, GraphError> {
	let mut builder = GraphBuilder::default();
	builder.visit(root, None)?;
	let graph = builder.finish();
	debug!(
		"built graph: {} nodes, {} edges",
		graph.nodes.len(),
		graph.edges.len()
	);
	Ok(graph)
}

#[derive(Default)]
struct GraphBuilder {
	nodes: IndexMap<String, GraphNode>,
	edges: Vec<GraphEdge>,
	seen_edges: HashSet<(String, String)>,
	expanded: HashSet<String>,
}

/// Where an entity sits in the source tree, for error reporting.
struct Via<'a> {
	child: &'a str,
	role: &'a str,
}

impl GraphBuilder {
	fn visit(&mut self, entity: &Entity, via: Option<Via<'_>>) -> Result<(), GraphError> {
		let id = entity.identifier().ok_or_else(|| GraphError::InvalidEntity {
			context: match &via {
				Some(v) => format!("parent `{}` of `{}`", v.role, v.child),
				None => "root".to_owned(),
			},
		})?;

		if let Some(v) = &via {
			if v.child == id {
				warn!("skipping self-referencing parent `{}` of `{}`", v.role, id);
				return Ok(());
			}
			self.add_edge(&id, v.child);
		}

		if !self.nodes.contains_key(&id) {
			self.nodes
				.insert(id.clone(), GraphNode::from_entity(id.clone(), entity));
		}

		// Ancestry of an identifier is walked once, whichever child reaches it first.
		if !self.expanded.insert(id.clone()) {
			return Ok(());
		}
		for (role, parent) in &entity.parents {
			self.visit(
				parent,
				Some(Via {
					child: &id,
					role,
				}),
			)?;
		}
		Ok(())
	}

	fn add_edge(&mut self, source: &str, target: &str) {
		if self
			.seen_edges
			.insert((source.to_owned(), target.to_owned()))
		{
			self.edges.push(GraphEdge::new(source, target));
		}
	}

	fn finish(self) -> GraphData {
		GraphData {
			nodes: self.nodes.into_values().collect(),
			edges: self.edges,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;

	use super::*;
	use crate::components::flavor_tree::fixtures::{diamond, entity, random_lineage};

	fn edge_pairs(g: &GraphData) -> Vec<(&str, &str)> {
		g.edges
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect()
	}

	#[test]
	fn shared_ancestor_is_one_node_with_two_edges() {
		let g = build_graph(&diamond()).unwrap();
		let ids: Vec<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b", "d", "c"]);
		assert_eq!(
			edge_pairs(&g),
			vec![("b", "a"), ("d", "b"), ("c", "a"), ("d", "c")]
		);
	}

	#[test]
	fn landrace_without_parents_is_a_leaf_of_the_walk() {
		let g = build_graph(&entity("Thai", &[])).unwrap();
		assert_eq!(g.nodes.len(), 1);
		assert!(g.edges.is_empty());
		assert_eq!(g.nodes[0].id, "thai");
		assert_eq!(g.nodes[0].name, "Thai");
	}

	#[test]
	fn repeated_parent_relationship_is_not_duplicated() {
		// Same (d -> b) relationship written out twice under different roles.
		let d = entity("D", &[]);
		let b = entity("B", &[("p1", d.clone()), ("p2", d)]);
		let g = build_graph(&entity("A", &[("p1", b)])).unwrap();
		assert_eq!(edge_pairs(&g), vec![("b", "a"), ("d", "b")]);
	}

	#[test]
	fn missing_identifier_fails_with_context() {
		let anonymous = Entity::default();
		let root = entity("Mimosa", &[("p2", anonymous)]);
		let err = build_graph(&root).unwrap_err();
		assert_eq!(
			err,
			GraphError::InvalidEntity {
				context: "parent `p2` of `mimosa`".into()
			}
		);
		assert!(build_graph(&Entity::default()).is_err());
	}

	#[test]
	fn self_parent_is_dropped() {
		let inner = entity("A", &[]);
		let g = build_graph(&entity("A", &[("p1", inner)])).unwrap();
		assert_eq!(g.nodes.len(), 1);
		assert!(g.edges.is_empty());
	}

	#[test]
	fn first_occurrence_supplies_node_fields() {
		let mut first = entity("D", &[]);
		first.category = "Landrace".into();
		let mut second = entity("D", &[]);
		second.category = "Hybrid".into();
		let root = entity(
			"A",
			&[
				("p1", entity("B", &[("p1", first)])),
				("p2", entity("C", &[("p1", second)])),
			],
		);
		let g = build_graph(&root).unwrap();
		let d = g.nodes.iter().find(|n| n.id == "d").unwrap();
		assert_eq!(d.category, "Landrace");
	}

	proptest! {
		#[test]
		fn nodes_and_edges_are_unique(root in random_lineage()) {
			let g = build_graph(&root).unwrap();
			let ids: HashSet<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
			prop_assert_eq!(ids.len(), g.nodes.len());
			let pairs: HashSet<(&str, &str)> = edge_pairs(&g).into_iter().collect();
			prop_assert_eq!(pairs.len(), g.edges.len());
			for e in &g.edges {
				prop_assert!(ids.contains(e.source.as_str()));
				prop_assert!(ids.contains(e.target.as_str()));
			}
		}
	}
}
