use indexmap::IndexMap;
use serde::Deserialize;

/// Maximum number of flavor tags carried by a graph node.
pub const MAX_TAGS: usize = 3;

/// A strain record as stored in the catalog, with its ancestry nested inline.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Entity {
	pub id: Option<String>,
	pub name: Option<String>,
	#[serde(rename = "type", default)]
	pub category: String,
	#[serde(rename = "publicFlavors", default)]
	pub flavors: Vec<String>,
	pub thc: Option<f64>,
	pub cbd: Option<f64>,
	/// Parent role (e.g. `p1`, `p2`) to parent entity.
	#[serde(default)]
	pub parents: IndexMap<String, Entity>,
}

impl Entity {
	/// Identifier used as the graph key: the explicit id, or the name
	/// lowercased with whitespace runs replaced by `_`.
	pub fn identifier(&self) -> Option<String> {
		match (&self.id, &self.name) {
			(Some(id), _) if !id.is_empty() => Some(id.clone()),
			(_, Some(name)) if !name.is_empty() => Some(slugify(name)),
			_ => None,
		}
	}

	pub fn display_name(&self) -> &str {
		self.name
			.as_deref()
			.or(self.id.as_deref())
			.unwrap_or_default()
	}
}

pub fn slugify(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	let mut in_space = false;
	for c in name.chars() {
		if c.is_whitespace() {
			if !in_space {
				out.push('_');
			}
			in_space = true;
		} else {
			out.extend(c.to_lowercase());
			in_space = false;
		}
	}
	out
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub category: String,
	pub flavors: Vec<String>,
	pub thc: Option<f64>,
	pub cbd: Option<f64>,
}

impl GraphNode {
	pub fn from_entity(id: String, entity: &Entity) -> Self {
		Self {
			id,
			name: entity.display_name().to_owned(),
			category: entity.category.clone(),
			flavors: entity.flavors.iter().take(MAX_TAGS).cloned().collect(),
			thc: entity.thc,
			cbd: entity.cbd,
		}
	}
}

/// `source` is a parent of `target`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
}

impl GraphEdge {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

/// A graph node with its box centre in layout space.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedNode {
	pub node: GraphNode,
	pub rank: usize,
	pub x: f64,
	pub y: f64,
}

/// Axis-aligned content rectangle in layout space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub max_x: f64,
	pub min_y: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Used when there is nothing to lay out.
	pub const FALLBACK: Bounds = Bounds {
		min_x: 0.0,
		max_x: 800.0,
		min_y: 0.0,
		max_y: 600.0,
	};

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn is_degenerate(&self) -> bool {
		!(self.width() > 0.0 && self.height() > 0.0)
	}
}

impl Default for Bounds {
	fn default() -> Self {
		Self::FALLBACK
	}
}
