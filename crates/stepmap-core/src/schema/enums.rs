//! Enumeration types with dual wire-value/name lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One member of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Symbolic name, e.g. `CLIMB`.
    pub name: String,
    /// Value written to the wire document, e.g. `climb`.
    pub wire: String,
}

/// A resolved enumeration value stored in a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub enum_name: String,
    pub name: String,
    pub wire: String,
}

/// An ordered enumeration with case-insensitive lookup tables built once at
/// construction.
#[derive(Debug, Clone)]
pub struct EnumType {
    name: String,
    members: Vec<EnumMember>,
    by_wire: BTreeMap<String, usize>,
    by_name: BTreeMap<String, usize>,
}

impl EnumType {
    /// Build an enumeration from `(name, wire)` pairs.
    ///
    /// When two members fold to the same key the first one wins; the registry
    /// builder rejects such enumerations via [`EnumType::has_collisions`].
    pub fn new<I, N, W>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = (N, W)>,
        N: Into<String>,
        W: Into<String>,
    {
        let members: Vec<EnumMember> = members
            .into_iter()
            .map(|(n, w)| EnumMember {
                name: n.into(),
                wire: w.into(),
            })
            .collect();

        let mut by_wire = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for (idx, m) in members.iter().enumerate() {
            by_wire.entry(fold(&m.wire)).or_insert(idx);
            by_name.entry(fold(&m.name)).or_insert(idx);
        }

        Self {
            name: name.into(),
            members,
            by_wire,
            by_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Whether any lookup key reaches two different members: within the wire
    /// values, within the names, or a name folding to another member's wire
    /// value (which would shadow it on lookup).
    pub fn has_collisions(&self) -> bool {
        self.by_wire.len() != self.members.len()
            || self.by_name.len() != self.members.len()
            || self
                .by_name
                .iter()
                .any(|(key, idx)| self.by_wire.get(key).is_some_and(|w| w != idx))
    }

    /// Resolve a raw string: wire value first, then member name, both
    /// case-insensitive.
    pub fn resolve(&self, raw: &str) -> Option<EnumValue> {
        let key = fold(raw);
        let idx = self
            .by_wire
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .copied()?;
        Some(self.value_at(idx))
    }

    /// Resolve a JSON scalar. Booleans and numbers are matched through their
    /// textual form.
    pub fn resolve_json(&self, raw: &Value) -> Option<EnumValue> {
        match raw {
            Value::String(s) => self.resolve(s),
            Value::Bool(b) => self.resolve(if *b { "true" } else { "false" }),
            Value::Number(n) => self.resolve(&n.to_string()),
            _ => None,
        }
    }

    fn value_at(&self, idx: usize) -> EnumValue {
        let m = &self.members[idx];
        EnumValue {
            enum_name: self.name.clone(),
            name: m.name.clone(),
            wire: m.wire.clone(),
        }
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cut_mode() -> EnumType {
        EnumType::new("CutMode", [("CLIMB", "climb"), ("CONVENTIONAL", "conventional")])
    }

    #[test]
    fn resolves_by_wire_and_name_ignoring_case() {
        let e = cut_mode();
        assert_eq!(e.resolve("Climb").unwrap().name, "CLIMB");
        assert_eq!(e.resolve("CONVENTIONAL").unwrap().wire, "conventional");
        assert!(e.resolve("both").is_none());
    }

    #[test]
    fn name_shadowed_by_another_wire_value_collides() {
        // "b" is the wire value of A and the name of B.
        let e = EnumType::new("Odd", [("A", "b"), ("B", "c")]);
        assert!(e.has_collisions());

        // A member whose name and wire value fold together is fine.
        let e = EnumType::new("Same", [("On", "on"), ("Off", "OFF")]);
        assert!(!e.has_collisions());
        assert_eq!(e.resolve("off").unwrap().name, "Off");
    }

    #[test]
    fn json_scalars_resolve_textually() {
        let e = EnumType::new("Flag", [("YES", "true"), ("NO", "false")]);
        assert_eq!(e.resolve_json(&json!(true)).unwrap().name, "YES");
        assert!(e.resolve_json(&json!({"a": 1})).is_none());
    }

    #[test]
    fn collisions_are_reported() {
        let e = EnumType::new("Dup", [("A", "x"), ("a", "y")]);
        assert!(e.has_collisions());
        assert!(!cut_mode().has_collisions());
    }
}
