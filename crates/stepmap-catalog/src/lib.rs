//! stepmap-catalog
//!
//! Schema catalogs for stepmap:
//! - [`Catalog`]: id-keyed store of schema registries with their specs
//! - [`CatalogSpec`]: static description of a catalog
//! - `builtin` (default feature): the ISO 14649 machining-process subset,
//!   available process-wide through [`builtin::iso14649`]

pub mod registry;
pub mod spec;

#[cfg(feature = "builtin")]
pub mod builtin;

pub use registry::{Catalog, CatalogEntry};
pub use spec::{CatalogId, CatalogSpec};
