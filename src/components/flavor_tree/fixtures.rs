//! Shared builders for the flavor tree tests.

use indexmap::IndexMap;
use proptest::prelude::*;
use proptest::sample::Index;

use super::graph::build_graph;
use super::types::{Entity, GraphData};

pub fn entity(name: &str, parents: &[(&str, Entity)]) -> Entity {
	Entity {
		name: Some(name.to_owned()),
		category: if parents.is_empty() {
			"Landrace".into()
		} else {
			"Hybrid".into()
		},
		parents: parents
			.iter()
			.map(|(role, e)| ((*role).to_owned(), e.clone()))
			.collect::<IndexMap<_, _>>(),
		..Default::default()
	}
}

/// `A` has parents `B` and `C`, both of which descend from `D`.
pub fn diamond() -> Entity {
	let d = entity("D", &[]);
	let b = entity("B", &[("p1", d.clone())]);
	let c = entity("C", &[("p1", d)]);
	entity("A", &[("p1", b), ("p2", c)])
}

fn nest(i: usize, parents: &[Vec<usize>]) -> Entity {
	let nested: Vec<(String, Entity)> = parents[i]
		.iter()
		.enumerate()
		.map(|(k, &p)| (format!("p{}", k + 1), nest(p, parents)))
		.collect();
	Entity {
		name: Some(format!("N{i}")),
		parents: nested.into_iter().collect(),
		..Default::default()
	}
}

/// Random ancestry rooted at the last generated node. Parents always have a
/// lower index, so shared ancestors are common and cycles are impossible.
pub fn random_lineage() -> impl Strategy<Value = Entity> {
	(1usize..10)
		.prop_flat_map(|n| prop::collection::vec(prop::collection::vec(any::<Index>(), 0..3), n))
		.prop_map(|choices| {
			let parents: Vec<Vec<usize>> = choices
				.iter()
				.enumerate()
				.map(|(i, picks)| {
					let mut ps: Vec<usize> = if i == 0 {
						Vec::new()
					} else {
						picks.iter().map(|p| p.index(i)).collect()
					};
					ps.dedup();
					ps
				})
				.collect();
			nest(parents.len() - 1, &parents)
		})
}

pub fn random_graph() -> impl Strategy<Value = GraphData> {
	random_lineage().prop_map(|root| build_graph(&root).unwrap_or_default())
}
