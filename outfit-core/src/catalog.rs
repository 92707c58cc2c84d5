use std::{collections::HashSet, fs, path::Path};

use crate::{
    error::CatalogError,
    model::{ClothingItem, ClothingType},
};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// Read access to the full list of clothing items.
///
/// The engine reads the list once per call and treats it as static for the
/// duration of that call.
pub trait ClothingCatalog {
    fn items(&self) -> &[ClothingItem];
}

impl ClothingCatalog for [ClothingItem] {
    fn items(&self) -> &[ClothingItem] {
        self
    }
}

impl ClothingCatalog for Vec<ClothingItem> {
    fn items(&self) -> &[ClothingItem] {
        self
    }
}

/// A validated, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<ClothingItem>,
}

impl Catalog {
    /// Validate and wrap `items`. Every item must have `min <= max` and ids
    /// must be unique.
    pub fn new(items: Vec<ClothingItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());

        for item in &items {
            let range = item.temperature_range;
            if range.is_inverted() {
                return Err(CatalogError::InvalidTemperatureRange {
                    id: item.id.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }

        Ok(Self { items })
    }

    /// Parse a JSON array of items.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<ClothingItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), items = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// The catalog shipped with the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    pub fn by_type(&self, kind: ClothingType) -> impl Iterator<Item = &ClothingItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    pub fn get(&self, id: &str) -> Option<&ClothingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ClothingCatalog for Catalog {
    fn items(&self) -> &[ClothingItem] {
        &self.items
    }
}
