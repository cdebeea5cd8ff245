//! Configuration structures for stepmap-core.
//!
//! This module defines explicit, serializable configuration objects used by
//! higher-level components (CLI, services) to control tree building, path
//! queries, wire rendering and limits.
//!
//! The core crate itself does not read environment variables or files. All
//! configuration must be provided explicitly by the caller.

use serde::{Deserialize, Serialize};

use crate::errors::{StepmapError, StepmapResult};

/// Global configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub build: BuildConfig,
    pub query: QueryConfig,
    pub wire: WireConfig,
    pub limits: LimitsConfig,
}

/// Tree builder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub mode: BuildMode,
}

/// How the tree builder reports unknown fields and missing required values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Fail on the first violation.
    #[default]
    Strict,
    /// Skip unknown fields, collect missing required paths and keep going.
    Lenient,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Path-query and merge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Key prefix marking attributes in a parsed document.
    pub attribute_prefix: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            attribute_prefix: crate::defaults::ATTRIBUTE_PREFIX.to_string(),
        }
    }
}

/// Wire document rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Synthetic element wrapping every mapped fragment.
    pub root_element: String,
    /// Attribute carrying the discriminator, without the attribute prefix.
    pub type_attribute: String,
    /// Attribute prefix used when rendering the discriminator.
    pub attribute_prefix: String,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            root_element: crate::defaults::ROOT_ELEMENT.to_string(),
            type_attribute: crate::defaults::TYPE_ATTRIBUTE.to_string(),
            attribute_prefix: crate::defaults::ATTRIBUTE_PREFIX.to_string(),
        }
    }
}

/// Complexity limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of segments in a mapping target path.
    pub max_depth: usize,
    /// Maximum number of segments in a path query.
    pub max_query_segments: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_query_segments: 256,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> StepmapResult<()> {
    if cfg.limits.max_depth == 0 {
        return Err(StepmapError::invalid_argument(
            "max_depth must be greater than zero",
        ));
    }

    if cfg.limits.max_query_segments == 0 {
        return Err(StepmapError::invalid_argument(
            "max_query_segments must be greater than zero",
        ));
    }

    if cfg.query.attribute_prefix.is_empty() || cfg.wire.attribute_prefix.is_empty() {
        return Err(StepmapError::invalid_argument(
            "attribute prefix must not be empty",
        ));
    }

    if cfg.wire.root_element.trim().is_empty() {
        return Err(StepmapError::invalid_argument(
            "wire root element must not be empty",
        ));
    }

    if cfg.wire.type_attribute.trim().is_empty() {
        return Err(StepmapError::invalid_argument(
            "wire type attribute must not be empty",
        ));
    }

    Ok(())
}
