//! JSON declaration format for schema registries.
//!
//! ```json
//! {
//!   "enums": [{ "name": "CutMode", "members": [{ "name": "CLIMB", "wire": "climb" }] }],
//!   "types": [{
//!     "name": "MillingTechnology",
//!     "parent": "Technology",
//!     "fields": [{ "name": "spindle", "kind": { "kind": "scalar" } }]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::{EnumMember, EnumType, FieldSpec, RegistryBuilder, SchemaRegistry, SchemaType};
use crate::errors::StepmapResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDef {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_type: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub spec: FieldSpec,
}

impl RegistryDef {
    pub fn into_registry(self) -> StepmapResult<SchemaRegistry> {
        let mut b = RegistryBuilder::new();
        for e in self.enums {
            b = b.enumeration(EnumType::new(
                e.name,
                e.members.into_iter().map(|m| (m.name, m.wire)),
            ));
        }
        for t in self.types {
            let mut ty = SchemaType::new(t.name);
            ty.parent = t.parent;
            ty.abstract_type = t.abstract_type;
            for f in t.fields {
                ty = ty.field(f.name, f.spec);
            }
            b = b.record(ty);
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    #[test]
    fn parses_declaration() {
        let src = r#"{
            "enums": [{"name": "CutMode", "members": [
                {"name": "CLIMB", "wire": "climb"},
                {"name": "CONVENTIONAL", "wire": "conventional"}
            ]}],
            "types": [
                {"name": "Technology", "abstract": true, "fields": [
                    {"name": "feedrate", "kind": {"kind": "scalar"}},
                    {"name": "mode", "kind": {"kind": "enum", "of": "CutMode"}, "required": true,
                     "fallback": {"default": "climb", "synonyms": ["both"]}}
                ]},
                {"name": "MillingTechnology", "parent": "Technology"}
            ]
        }"#;
        let r = SchemaRegistry::from_json_str(src).unwrap();
        assert_eq!(r.len(), 2);
        let mode = r.field("MillingTechnology", "mode").unwrap();
        assert_eq!(mode.kind, FieldKind::Enum("CutMode".into()));
        assert!(mode.required);
        assert!(mode.fallback.as_ref().unwrap().is_synonym("BOTH"));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = SchemaRegistry::from_json_str("{").unwrap_err();
        assert!(matches!(err, crate::errors::StepmapError::Serialization(_)));
    }
}
