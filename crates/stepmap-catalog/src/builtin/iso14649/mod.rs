//! ISO 14649 process data subset.
//!
//! Type names follow the standard's entity names in upper camel case
//! (`milling_technology` -> `MillingTechnology`); field names are the
//! standard's attribute names. Abstract supertypes are declared abstract so
//! the wire document always carries a concrete `xsi:type`.

use stepmap_core::errors::StepmapResult;
use stepmap_core::schema::{RegistryBuilder, SchemaRegistry};

pub mod enums;
mod operations;
mod process;
mod technology;

/// Build a fresh registry. Prefer [`super::iso14649`] for shared use.
pub fn registry() -> StepmapResult<SchemaRegistry> {
    let b = enums::declare(RegistryBuilder::new());
    let b = process::declare(b);
    let b = operations::declare(b);
    let b = technology::declare(b);
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_resolves_hierarchy() {
        let r = registry().unwrap();
        assert!(r.is_strict_subtype("MillingTechnology", "Technology"));
        assert!(r.is_strict_subtype("PlaneFinishMilling", "MachiningOperation"));
        assert!(r.is_strict_subtype("MachiningWorkingstep", "Executable"));
        assert!(r.is_polymorphic("Technology"));
        assert!(!r.is_polymorphic("MillingToolDimension"));
    }

    #[test]
    fn technology_fields() {
        let r = registry().unwrap();
        let fr = r.field("MillingTechnology", "feedrate_reference").unwrap();
        assert!(fr.required);
        assert!(!r.field("Technology", "feedrate").unwrap().required);
        assert!(r.field("Technology", "synchronize_spindle_with_feed").is_none());
        assert!(r.field("MillingTechnology", "synchronize_spindle_with_feed").is_some());
    }

    #[test]
    fn cutmode_has_fallback() {
        let r = registry().unwrap();
        let f = r.field("ContourParallel", "cutmode").unwrap();
        let policy = f.fallback.as_ref().unwrap();
        assert_eq!(policy.default, "climb");
        assert!(policy.is_synonym("Both"));
    }
}
