//! Read-only strain catalog bundled with the app.

use std::sync::OnceLock;

use indexmap::IndexMap;
use log::warn;

use crate::components::flavor_tree::{Entity, slugify};

/// Strain shown when no strain is named in the route.
pub const DEFAULT_STRAIN: &str = "Mimosa";

const STRAIN_TREE_JSON: &str = include_str!("strain_tree.json");

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
	#[error("no strain named `{0}` in the catalog")]
	UnknownStrain(String),
	#[error("strain catalog is malformed: {0}")]
	Malformed(String),
}

/// Strains keyed by display name, in catalog order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrainCatalog {
	strains: IndexMap<String, Entity>,
}

impl StrainCatalog {
	pub fn from_json(json: &str) -> Result<Self, DataError> {
		let strains: IndexMap<String, Entity> =
			serde_json::from_str(json).map_err(|e| DataError::Malformed(e.to_string()))?;
		Ok(Self { strains })
	}

	/// Look a strain up by display name (any case) or by its identifier.
	pub fn find(&self, key: &str) -> Result<&Entity, DataError> {
		let wanted = slugify(key.trim());
		self.strains
			.iter()
			.find(|(name, entity)| {
				slugify(name) == wanted || entity.identifier().as_deref() == Some(wanted.as_str())
			})
			.map(|(_, entity)| entity)
			.ok_or_else(|| DataError::UnknownStrain(key.to_owned()))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.strains.keys().map(String::as_str)
	}
}

/// The bundled catalog, parsed on first use.
pub fn catalog() -> Result<&'static StrainCatalog, DataError> {
	static CATALOG: OnceLock<Result<StrainCatalog, DataError>> = OnceLock::new();
	CATALOG
		.get_or_init(|| {
			StrainCatalog::from_json(STRAIN_TREE_JSON).inspect_err(|e| warn!("{e}"))
		})
		.as_ref()
		.map_err(Clone::clone)
}

/// Find a strain in the bundled catalog.
pub fn strain(key: &str) -> Result<Entity, DataError> {
	let found = catalog()?.find(key).cloned();
	if let Err(e) = &found {
		warn!("{e}");
	}
	found
}
