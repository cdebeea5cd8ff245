//! Catalog specification types.
//!
//! A spec is the static, serializable description of a schema catalog:
//! - identity (id, display name, version)
//! - the standard it follows and the root types callers usually map onto
//! - free-form metadata for listings
//!
//! Specs are data-only; the schema itself lives in the registry entry.

use std::collections::BTreeMap;

use serde::Serialize;

use stepmap_core::errors::{StepmapError, StepmapResult};
use stepmap_core::schema::SchemaRegistry;

/// Stable catalog identifier, lowercase ASCII (`"iso14649"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CatalogId(pub String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSpec {
    pub id: CatalogId,
    pub name: String,
    pub version: String,

    /// Standard the catalog models, e.g. "ISO 14649-10".
    pub standards: Vec<String>,

    /// Types callers commonly pass as the build root.
    pub roots: Vec<String>,

    pub meta: BTreeMap<String, String>,
}

impl CatalogSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: CatalogId::new(id),
            name: name.into(),
            version: version.into(),
            standards: Vec::new(),
            roots: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn standard(mut self, s: impl Into<String>) -> Self {
        self.standards.push(s.into());
        self
    }

    pub fn root(mut self, type_name: impl Into<String>) -> Self {
        self.roots.push(type_name.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Check identity fields, and that every declared root exists in `registry`.
    pub fn validate(&self, registry: &SchemaRegistry) -> StepmapResult<()> {
        let id = self.id.as_str();
        if id.is_empty() {
            return Err(StepmapError::invalid_argument("catalog id is empty"));
        }
        let id_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-".contains(c);
        if !id.chars().all(id_char) {
            return Err(StepmapError::invalid_argument(format!(
                "catalog id must be lowercase ascii: {id}"
            )));
        }
        if self.name.trim().is_empty() {
            return Err(StepmapError::invalid_argument(format!("catalog {id} has no name")));
        }
        if self.version.trim().is_empty() {
            return Err(StepmapError::invalid_argument(format!("catalog {id} has no version")));
        }
        for r in &self.roots {
            if registry.lookup_type(r).is_none() {
                return Err(StepmapError::UnknownType(format!("{r} (root of catalog {id})")));
            }
        }
        Ok(())
    }
}
