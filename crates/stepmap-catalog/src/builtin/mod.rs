//! Built-in catalogs.
//!
//! - `iso14649`: process planning subset of ISO 14649 (STEP-NC) parts 10
//!   and 11, covering projects, workplans, milling and drilling operations,
//!   technologies, machine functions and cutting tools.
//!
//! The registries are pure data; nothing here does I/O.

use std::sync::{Arc, OnceLock};

use stepmap_core::errors::{StepmapError, StepmapResult};
use stepmap_core::schema::SchemaRegistry;

use crate::registry::Catalog;
use crate::spec::CatalogSpec;

pub mod iso14649;

/// Built-in catalog ids. Append-only.
pub const BUILTIN_CATALOG_IDS: [&str; 1] = ["iso14649"];

/// Catalog used when a caller names none.
pub const DEFAULT_CATALOG: &str = "iso14649";

pub fn builtin_specs() -> Vec<CatalogSpec> {
    vec![iso14649_spec()]
}

pub fn iso14649_spec() -> CatalogSpec {
    CatalogSpec::new("iso14649", "ISO 14649 process data", "0.1.0")
        .standard("ISO 14649-10")
        .standard("ISO 14649-11")
        .root("Project")
        .root("Workplan")
        .root("MachiningWorkingstep")
        .root("MachiningOperation")
        .root("Technology")
        .meta("category", "machining")
}

/// Register every built-in catalog into `catalog`.
pub fn register_all(catalog: &mut Catalog) -> StepmapResult<()> {
    catalog.register(iso14649_spec(), Arc::new(iso14649::registry()?))
}

static ISO14649: OnceLock<Result<SchemaRegistry, String>> = OnceLock::new();

/// The process-wide ISO 14649 registry, built on first use.
pub fn iso14649() -> StepmapResult<&'static SchemaRegistry> {
    ISO14649
        .get_or_init(|| iso14649::registry().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| StepmapError::invariant(format!("builtin iso14649 catalog: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_specs() {
        let specs = builtin_specs();
        let ids: Vec<&str> = specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, BUILTIN_CATALOG_IDS);
        assert!(ids.contains(&DEFAULT_CATALOG));
    }

    #[test]
    fn shared_registry_is_built_once() {
        let a = iso14649().unwrap();
        let b = iso14649().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn register_all_validates_roots() {
        let c = Catalog::builtin().unwrap();
        assert_eq!(c.list_ids(), BUILTIN_CATALOG_IDS);
    }
}
