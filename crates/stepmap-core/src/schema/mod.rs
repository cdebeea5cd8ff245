//! Schema registry.
//!
//! The registry is the source of truth for record type names, their ordered
//! field specifications, required flags, enumerations and the subtype
//! relation. It is built once (see [`RegistryBuilder`]) and is read-only
//! afterwards, so a single instance can be shared by any number of callers.
//!
//! Record and list field kinds reference other types by name. All references
//! are checked when the registry is built:
//! - parents and field types must exist
//! - enumerations must exist and be collision free
//! - inheritance must be acyclic
//! - type names must be unique

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{StepmapError, StepmapResult};

pub mod def;
pub mod enums;

pub use enums::{EnumMember, EnumType, EnumValue};

/// The shape of a field's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Enum(String),
    Record(String),
    ListOfRecord(String),
    ListOfScalar,
}

impl FieldKind {
    /// Record type referenced by this kind, if any.
    pub fn record_type(&self) -> Option<&str> {
        match self {
            Self::Record(t) | Self::ListOfRecord(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_record(&self) -> bool {
        self.record_type().is_some()
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Scalar => "scalar".to_string(),
            Self::Enum(e) => format!("enum {e}"),
            Self::Record(t) => format!("record {t}"),
            Self::ListOfRecord(t) => format!("list of {t}"),
            Self::ListOfScalar => "list of scalar".to_string(),
        }
    }
}

/// Coercion applied to an enum field whose source value is missing,
/// ambiguous or unrecognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Wire value (or name) of the member substituted.
    pub default: String,
    /// Source values treated as ambiguous, compared case-insensitively.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl FallbackPolicy {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            synonyms: Vec::new(),
        }
    }

    pub fn synonym(mut self, s: impl Into<String>) -> Self {
        self.synonyms.push(s.into());
        self
    }

    pub fn is_synonym(&self, raw: &str) -> bool {
        let raw = raw.trim();
        self.synonyms.iter().any(|s| s.eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackPolicy>,
}

impl FieldSpec {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            fallback: None,
        }
    }

    pub fn scalar() -> Self {
        Self::new(FieldKind::Scalar)
    }

    pub fn enumeration(enum_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Enum(enum_name.into()))
    }

    pub fn record(type_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Record(type_name.into()))
    }

    pub fn list_of(type_name: impl Into<String>) -> Self {
        Self::new(FieldKind::ListOfRecord(type_name.into()))
    }

    pub fn list_of_scalar() -> Self {
        Self::new(FieldKind::ListOfScalar)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = Some(policy);
        self
    }
}

/// A named field of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub spec: FieldSpec,
}

/// A record type declaration. `fields` holds only the type's own fields;
/// inherited ones are resolved by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaType {
    pub name: String,
    pub parent: Option<String>,
    pub abstract_type: bool,
    pub fields: Vec<FieldEntry>,
}

impl SchemaType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            abstract_type: false,
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.abstract_type = true;
        self
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push(FieldEntry {
            name: name.into(),
            spec,
        });
        self
    }
}

/// Collects declarations and validates them into a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<SchemaType>,
    enums: Vec<EnumType>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, ty: SchemaType) -> Self {
        self.types.push(ty);
        self
    }

    pub fn enumeration(mut self, e: EnumType) -> Self {
        self.enums.push(e);
        self
    }

    pub fn build(self) -> StepmapResult<SchemaRegistry> {
        let mut enums = BTreeMap::new();
        for e in self.enums {
            if e.has_collisions() {
                return Err(StepmapError::invalid_argument(format!(
                    "enum {} has members colliding case-insensitively",
                    e.name()
                )));
            }
            let name = e.name().to_string();
            if enums.insert(name.clone(), e).is_some() {
                return Err(StepmapError::invalid_argument(format!(
                    "duplicate enum name: {name}"
                )));
            }
        }

        let mut types = BTreeMap::new();
        for t in self.types {
            let name = t.name.clone();
            if enums.contains_key(&name) || types.insert(name.clone(), t).is_some() {
                return Err(StepmapError::invalid_argument(format!(
                    "duplicate type name: {name}"
                )));
            }
        }

        for t in types.values() {
            if let Some(p) = &t.parent {
                if !types.contains_key(p) {
                    return Err(StepmapError::UnknownType(format!(
                        "{p} (parent of {})",
                        t.name
                    )));
                }
            }
            for f in &t.fields {
                match &f.spec.kind {
                    FieldKind::Record(r) | FieldKind::ListOfRecord(r) if !types.contains_key(r) => {
                        return Err(StepmapError::UnknownType(format!(
                            "{r} (field {}.{})",
                            t.name, f.name
                        )));
                    }
                    FieldKind::Enum(e) if !enums.contains_key(e) => {
                        return Err(StepmapError::UnknownType(format!(
                            "{e} (enum of field {}.{})",
                            t.name, f.name
                        )));
                    }
                    _ => {}
                }
                if let Some(policy) = &f.spec.fallback {
                    let FieldKind::Enum(e) = &f.spec.kind else {
                        return Err(StepmapError::invalid_argument(format!(
                            "fallback policy on non-enum field {}.{}",
                            t.name, f.name
                        )));
                    };
                    if enums[e].resolve(&policy.default).is_none() {
                        return Err(StepmapError::invalid_argument(format!(
                            "fallback default {} of field {}.{} is not a member of {e}",
                            policy.default, t.name, f.name
                        )));
                    }
                }
            }
        }

        // Ancestor chains, nearest parent first.
        let mut ancestry: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in types.keys() {
            let mut chain = Vec::new();
            let mut seen = BTreeSet::new();
            seen.insert(name.clone());
            let mut cur = types[name].parent.clone();
            while let Some(p) = cur {
                if !seen.insert(p.clone()) {
                    return Err(StepmapError::invalid_argument(format!(
                        "inheritance cycle through {name}"
                    )));
                }
                cur = types[&p].parent.clone();
                chain.push(p);
            }
            ancestry.insert(name.clone(), chain);
        }

        let mut effective = BTreeMap::new();
        for (name, chain) in &ancestry {
            let mut fields: Vec<FieldEntry> = Vec::new();
            for ty in chain.iter().rev().chain(std::iter::once(name)) {
                for f in &types[ty].fields {
                    match fields.iter_mut().find(|e| e.name == f.name) {
                        Some(existing) => *existing = f.clone(),
                        None => fields.push(f.clone()),
                    }
                }
            }
            effective.insert(name.clone(), fields);
        }

        let mut subtypes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (name, chain) in &ancestry {
            for a in chain {
                subtypes.entry(a.clone()).or_default().insert(name.clone());
            }
        }

        tracing::debug!(types = types.len(), enums = enums.len(), "schema registry built");

        Ok(SchemaRegistry {
            types,
            enums,
            ancestry,
            effective,
            subtypes,
        })
    }
}

/// Read-only, validated schema registry.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: BTreeMap<String, SchemaType>,
    enums: BTreeMap<String, EnumType>,
    ancestry: BTreeMap<String, Vec<String>>,
    effective: BTreeMap<String, Vec<FieldEntry>>,
    subtypes: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Parse and build a registry from its JSON declaration (see [`def`]).
    pub fn from_json_str(s: &str) -> StepmapResult<Self> {
        let d: def::RegistryDef = serde_json::from_str(s)?;
        d.into_registry()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn lookup_type(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    pub fn lookup_enum(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    /// Type names in stable order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }

    /// Effective fields of a type: inherited first (root ancestor first),
    /// then the type's own, in declaration order.
    pub fn fields_of(&self, type_name: &str) -> Option<&[FieldEntry]> {
        self.effective.get(type_name).map(|v| v.as_slice())
    }

    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldSpec> {
        self.fields_of(type_name)?
            .iter()
            .find(|e| e.name == field)
            .map(|e| &e.spec)
    }

    /// Reflexive subtype check: every type is a subtype of itself.
    pub fn is_subtype(&self, a: &str, b: &str) -> bool {
        (a == b && self.types.contains_key(a)) || self.is_strict_subtype(a, b)
    }

    pub fn is_strict_subtype(&self, a: &str, b: &str) -> bool {
        self.ancestry
            .get(a)
            .map(|chain| chain.iter().any(|p| p == b))
            .unwrap_or(false)
    }

    /// Ancestors of a type, nearest parent first.
    pub fn ancestors_of(&self, type_name: &str) -> Vec<&str> {
        self.ancestry
            .get(type_name)
            .map(|chain| chain.iter().map(|x| x.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn has_subtypes(&self, type_name: &str) -> bool {
        self.subtypes
            .get(type_name)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    /// All transitive subtypes of a type, in stable order.
    pub fn subtypes_of(&self, type_name: &str) -> Vec<&str> {
        self.subtypes
            .get(type_name)
            .map(|s| s.iter().map(|x| x.as_str()).collect())
            .unwrap_or_default()
    }

    /// A field declared with this type may hold a more specific type.
    pub fn is_polymorphic(&self, type_name: &str) -> bool {
        self.types
            .get(type_name)
            .map(|t| t.abstract_type)
            .unwrap_or(false)
            || self.has_subtypes(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .enumeration(EnumType::new("Ref", [("TCP", "tcp"), ("CCP", "ccp")]))
            .record(
                SchemaType::new("Technology")
                    .abstract_type()
                    .field("feedrate", FieldSpec::scalar())
                    .field("feedrate_reference", FieldSpec::enumeration("Ref").required()),
            )
            .record(
                SchemaType::new("MillingTechnology")
                    .extends("Technology")
                    .field("spindle", FieldSpec::scalar()),
            )
            .record(SchemaType::new("FastMilling").extends("MillingTechnology"))
            .build()
            .unwrap()
    }

    #[test]
    fn fields_are_inherited_in_order() {
        let r = registry();
        let names: Vec<&str> = r
            .fields_of("FastMilling")
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["feedrate", "feedrate_reference", "spindle"]);
        assert!(r.field("MillingTechnology", "feedrate_reference").unwrap().required);
        assert!(r.field("Technology", "spindle").is_none());
    }

    #[test]
    fn subtype_relation() {
        let r = registry();
        assert!(r.is_subtype("FastMilling", "Technology"));
        assert!(r.is_subtype("Technology", "Technology"));
        assert!(!r.is_strict_subtype("Technology", "Technology"));
        assert!(!r.is_subtype("Technology", "MillingTechnology"));
        assert!(!r.is_subtype("Nope", "Nope"));
        assert_eq!(r.subtypes_of("Technology"), vec!["FastMilling", "MillingTechnology"]);
        assert!(r.is_polymorphic("Technology"));
        assert!(!r.is_polymorphic("FastMilling"));
        assert_eq!(r.ancestors_of("FastMilling"), vec!["MillingTechnology", "Technology"]);
        assert!(r.ancestors_of("Technology").is_empty());
    }

    #[test]
    fn dangling_references_are_rejected() {
        let err = SchemaRegistry::builder()
            .record(SchemaType::new("A").field("b", FieldSpec::record("B")))
            .build()
            .unwrap_err();
        assert!(matches!(err, StepmapError::UnknownType(_)));

        let err = SchemaRegistry::builder()
            .record(SchemaType::new("A").extends("Z"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("parent of A"));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = SchemaRegistry::builder()
            .record(SchemaType::new("A").extends("B"))
            .record(SchemaType::new("B").extends("A"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn fallback_only_on_enums() {
        let err = SchemaRegistry::builder()
            .record(
                SchemaType::new("A")
                    .field("x", FieldSpec::scalar().with_fallback(FallbackPolicy::new("y"))),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("non-enum"));
    }

    #[test]
    fn enums_with_shadowed_names_are_rejected() {
        let err = SchemaRegistry::builder()
            .enumeration(EnumType::new("Odd", [("A", "b"), ("B", "c")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, StepmapError::InvalidArgument(_)));
        assert!(err.to_string().contains("Odd"));
    }
}
