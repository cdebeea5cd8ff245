//! stepmap-core
//!
//! Core primitives for mapping flat key/value records onto typed,
//! schema-driven process trees:
//! - Schema registry (types, fields, enumerations, subtype relations)
//! - Target-path mapping and the tree builder (strict and lenient modes)
//! - Required-field validation with dotted, indexed paths
//! - Wire document rendering
//! - Path queries over wire documents (errors returned as documents)
//! - Deep merge of wire documents

pub mod builder;
pub mod config;
pub mod errors;
pub mod mapping;
pub mod merge;
pub mod model;
pub mod query;
pub mod schema;
pub mod wire;

pub use crate::errors::{StepmapError, StepmapResult};

/// Default wire document conventions.
/// Documents exchanged with other tools depend on these.
pub mod defaults {
    /// Prefix marking attribute keys in wire documents.
    pub const ATTRIBUTE_PREFIX: &str = "@";
    /// Synthetic element wrapping a mapped fragment.
    pub const ROOT_ELEMENT: &str = "process_fragment";
    /// Attribute carrying a branch's concrete type.
    pub const TYPE_ATTRIBUTE: &str = "xsi:type";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::builder::required::{check_required, validate_required};
    pub use crate::builder::{BuildOutput, TreeBuilder};
    pub use crate::config::{BuildMode, CoreConfig};
    pub use crate::mapping::{Mapping, MappingEntry, PathToken};
    pub use crate::merge::{merge, Merger};
    pub use crate::model::{Branch, LeafValue, Node};
    pub use crate::query::{evaluate, QueryError, QueryErrorCode, QueryEvaluator, QueryResponse};
    pub use crate::schema::{
        EnumType, FallbackPolicy, FieldKind, FieldSpec, SchemaRegistry, SchemaType,
    };
    pub use crate::wire::to_document;
    pub use crate::{StepmapError, StepmapResult};
}
