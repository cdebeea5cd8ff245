//! Error types for stepmap-core.
//!
//! Construction-time failures (registry building, mapping parsing, tree
//! building) are reported through [`StepmapError`]. Query-time failures have
//! their own type in `crate::query` because they never cross the public
//! boundary as errors.

use thiserror::Error;

pub type StepmapResult<T> = Result<T, StepmapError>;

#[derive(Debug, Error)]
pub enum StepmapError {
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("unknown field '{field}' on type {type_name} (path {path}, source key {source_key})")]
    UnknownField {
        type_name: String,
        field: String,
        path: String,
        source_key: String,
    },

    #[error("invalid value {value} for enum {enum_name} at {path}")]
    InvalidEnumValue {
        value: String,
        enum_name: String,
        path: String,
    },

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("missing {} required field(s): {}", .0.len(), .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    #[error("field {path} is declared as {expected} but is used as {found}")]
    KindMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("invalid target path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl StepmapError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Paths of all missing required fields carried by this error, if any.
    pub fn missing_paths(&self) -> Vec<String> {
        match self {
            Self::MissingRequiredField(p) => vec![p.clone()],
            Self::MissingRequiredFields(ps) => ps.clone(),
            _ => Vec::new(),
        }
    }
}

impl From<serde_json::Error> for StepmapError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
