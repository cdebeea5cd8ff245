//! Deep merge of two parsed documents.
//!
//! Rules, applied key by key over the union of both sides' keys:
//! 1. attribute keys keep `updates`' value when it is non-null, otherwise
//!    whichever side is non-null
//! 2. a null or absent side yields the other side
//! 3. object + object recurses
//! 4. object + list treats the object as a one-element list (an empty list
//!    yields `[object]`); list + object is symmetric
//! 5. list + list pairs elements by index and keeps `min(len(a), len(b))`
//!    elements; the tail of the longer list is dropped
//! 6. any scalar involved: `updates` wins
//!
//! The merge is total: every pair of values produces a result.

use serde_json::{Map, Value};

use crate::config::CoreConfig;
use crate::defaults::ATTRIBUTE_PREFIX;

#[derive(Debug, Clone)]
pub struct Merger {
    attribute_prefix: String,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new(ATTRIBUTE_PREFIX)
    }
}

impl Merger {
    pub fn new(attribute_prefix: impl Into<String>) -> Self {
        Self {
            attribute_prefix: attribute_prefix.into(),
        }
    }

    /// Uses the wire attribute prefix, so merged documents agree with
    /// what [`crate::wire::to_document`] produced.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.wire.attribute_prefix.clone())
    }

    pub fn merge(&self, original: &Value, updates: &Value) -> Value {
        match (original, updates) {
            (Value::Null, u) => u.clone(),
            (o, Value::Null) => o.clone(),
            (Value::Object(a), Value::Object(b)) => Value::Object(self.merge_maps(a, b)),
            (o @ Value::Object(_), Value::Array(items)) => match items.first() {
                Some(first) => Value::Array(vec![self.merge(o, first)]),
                None => Value::Array(vec![o.clone()]),
            },
            (Value::Array(items), u @ Value::Object(_)) => match items.first() {
                Some(first) => Value::Array(vec![self.merge(first, u)]),
                None => Value::Array(vec![u.clone()]),
            },
            (Value::Array(a), Value::Array(b)) => {
                if a.len() != b.len() {
                    tracing::debug!(
                        original = a.len(),
                        updates = b.len(),
                        "list merge truncates to shorter side"
                    );
                }
                Value::Array(a.iter().zip(b).map(|(x, y)| self.merge(x, y)).collect())
            }
            (_, u) => u.clone(),
        }
    }

    fn merge_maps(&self, a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();

        let keys = a.keys().chain(b.keys().filter(|k| !a.contains_key(k.as_str())));
        for k in keys {
            let merged = match (a.get(k), b.get(k)) {
                (Some(x), Some(y)) if self.is_attribute(k) => {
                    if y.is_null() {
                        x.clone()
                    } else {
                        y.clone()
                    }
                }
                (Some(x), Some(y)) => self.merge(x, y),
                (Some(x), None) => x.clone(),
                (None, Some(y)) => y.clone(),
                (None, None) => continue,
            };
            out.insert(k.clone(), merged);
        }

        out
    }

    fn is_attribute(&self, key: &str) -> bool {
        key.starts_with(self.attribute_prefix.as_str())
    }
}

/// Merge with the default attribute prefix.
pub fn merge(original: &Value, updates: &Value) -> Value {
    Merger::default().merge(original, updates)
}
