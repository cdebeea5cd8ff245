//! Catalog registry.
//!
//! Stores schema catalogs keyed by id. Lookups and iteration follow id order
//! so listings are stable regardless of registration order.

use std::collections::BTreeMap;
use std::sync::Arc;

use stepmap_core::errors::{StepmapError, StepmapResult};
use stepmap_core::schema::SchemaRegistry;

use crate::spec::CatalogSpec;

/// A catalog's spec plus its schema.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub spec: CatalogSpec,
    pub registry: Arc<SchemaRegistry>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding every built-in schema.
    #[cfg(feature = "builtin")]
    pub fn builtin() -> StepmapResult<Self> {
        let mut c = Self::new();
        crate::builtin::register_all(&mut c)?;
        Ok(c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a schema under its spec id. Ids are unique.
    pub fn register(
        &mut self,
        spec: CatalogSpec,
        registry: Arc<SchemaRegistry>,
    ) -> StepmapResult<()> {
        spec.validate(&registry)?;

        let id = spec.id.as_str().to_string();
        if self.entries.contains_key(&id) {
            return Err(StepmapError::invalid_argument(format!(
                "catalog id already registered: {id}"
            )));
        }

        tracing::debug!(catalog = %id, types = registry.len(), "catalog registered");
        self.entries.insert(id, CatalogEntry { spec, registry });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Like [`Catalog::get`] but reports the known ids when `id` is absent.
    pub fn resolve(&self, id: &str) -> StepmapResult<&CatalogEntry> {
        self.get(id).ok_or_else(|| {
            StepmapError::invalid_argument(format!(
                "unknown catalog: {id} (known: {})",
                self.list_ids().join(", ")
            ))
        })
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CatalogEntry)> {
        self.entries.iter()
    }
}
