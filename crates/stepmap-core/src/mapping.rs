//! Mapping files: flat `source_key -> Dotted.target.path` tables.
//!
//! Target path segments starting with an upper-case letter are type hints
//! ([`PathToken::Type`]); segments starting with a lower-case letter are
//! schema field names ([`PathToken::Field`]), optionally indexed
//! (`its_operations[2]`) when the field is a list of records.

use std::fmt;

use serde_json::Value;

use crate::errors::{StepmapError, StepmapResult};
use crate::model::split_index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Type(String),
    Field { name: String, index: Option<usize> },
}

impl PathToken {
    pub fn parse(seg: &str) -> StepmapResult<Self> {
        let (name, index) = split_index(seg);
        let first = name
            .chars()
            .next()
            .ok_or_else(|| StepmapError::invalid_path(seg, "empty segment"))?;

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StepmapError::invalid_path(seg, "segment is not an identifier"));
        }

        if first.is_ascii_uppercase() {
            if index.is_some() {
                return Err(StepmapError::invalid_path(seg, "type hints cannot be indexed"));
            }
            Ok(Self::Type(name.to_string()))
        } else if first.is_ascii_lowercase() {
            Ok(Self::Field {
                name: name.to_string(),
                index,
            })
        } else {
            Err(StepmapError::invalid_path(
                seg,
                "segment must start with a letter",
            ))
        }
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(t) => write!(f, "{t}"),
            Self::Field { name, index: None } => write!(f, "{name}"),
            Self::Field {
                name,
                index: Some(i),
            } => write!(f, "{name}[{i}]"),
        }
    }
}

/// One line of a mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub source_key: String,
    pub target: Vec<PathToken>,
}

impl MappingEntry {
    pub fn parse(source_key: impl Into<String>, target: &str) -> StepmapResult<Self> {
        let source_key = source_key.into();
        if source_key.trim().is_empty() {
            return Err(StepmapError::invalid_path(target, "empty source key"));
        }

        let target_tokens = target
            .split('.')
            .map(PathToken::parse)
            .collect::<StepmapResult<Vec<_>>>()?;

        match target_tokens.last() {
            Some(PathToken::Field { .. }) => {}
            _ => {
                return Err(StepmapError::invalid_path(
                    target,
                    "path must end with a field name",
                ))
            }
        }

        Ok(Self {
            source_key,
            target: target_tokens,
        })
    }

    /// The target path as written in the mapping file.
    pub fn target_string(&self) -> String {
        self.target
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// An ordered set of mapping entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    /// Parse a flat JSON object of `source_key -> target_path` strings.
    pub fn from_json(v: &Value) -> StepmapResult<Self> {
        let obj = v
            .as_object()
            .ok_or_else(|| StepmapError::invalid_argument("mapping must be a JSON object"))?;

        let mut entries = Vec::with_capacity(obj.len());
        for (k, t) in obj {
            let t = t.as_str().ok_or_else(|| {
                StepmapError::invalid_argument(format!("mapping target for {k} must be a string"))
            })?;
            entries.push(MappingEntry::parse(k.clone(), t)?);
        }
        Ok(Self { entries })
    }

    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> StepmapResult<Self> {
        let entries = pairs
            .into_iter()
            .map(|(k, t)| MappingEntry::parse(k, t))
            .collect::<StepmapResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Look up a source key in CAM JSON.
///
/// A literal top-level key wins. Otherwise the key is treated as a dotted
/// path where `name[i]` or a purely numeric segment indexes an array.
pub fn lookup_source<'a>(source: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(v) = source.as_object().and_then(|o| o.get(key)) {
        return Some(v);
    }

    let mut cur = source;
    for seg in key.split('.') {
        let (name, index) = split_index(seg);
        cur = match cur {
            Value::Array(items) => items.get(name.parse::<usize>().ok()?)?,
            Value::Object(o) => o.get(name)?,
            _ => return None,
        };
        if let Some(i) = index {
            cur = cur.as_array()?.get(i)?;
        }
    }
    Some(cur)
}
