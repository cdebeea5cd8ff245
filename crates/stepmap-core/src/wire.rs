//! Wire document rendering.
//!
//! A built [`Node`] becomes the JSON shape of the XML exchange document:
//! - the configured root element wraps the tree
//! - fields become child keys in insertion order
//! - tagged branches of a polymorphic type carry `"@xsi:type": "<snake_case_type>"`
//! - enumeration leaves render as their wire value
//! - list-of-record fields render as arrays
//!
//! The output is what [`crate::query`] and [`crate::merge`] consume.

use serde_json::{Map, Value};

use crate::config::WireConfig;
use crate::model::Node;
use crate::schema::{FieldKind, SchemaRegistry};

/// Render `tree` (declared as `root_type`) as a wire document.
pub fn to_document(
    tree: &Node,
    root_type: &str,
    registry: &SchemaRegistry,
    cfg: &WireConfig,
) -> Value {
    let w = Writer { registry, cfg };
    let mut doc = Map::new();
    doc.insert(cfg.root_element.clone(), w.node(tree, Some(root_type)));
    Value::Object(doc)
}

struct Writer<'a> {
    registry: &'a SchemaRegistry,
    cfg: &'a WireConfig,
}

impl Writer<'_> {
    fn node(&self, node: &Node, declared: Option<&str>) -> Value {
        match node {
            Node::Leaf(l) => l.to_json(),
            Node::List(items) => {
                Value::Array(items.iter().map(|n| self.node(n, declared)).collect())
            }
            Node::Branch(b) => {
                let mut m = Map::new();

                // Branches without a discriminator are never tagged.
                if let Some(d) = b.discriminator() {
                    let tagged = match declared {
                        Some(t) => t != d || self.registry.is_polymorphic(t),
                        None => true,
                    };
                    if tagged {
                        m.insert(
                            format!("{}{}", self.cfg.attribute_prefix, self.cfg.type_attribute),
                            Value::String(snake_case(d)),
                        );
                    }
                }
                let actual = b.discriminator().or(declared);

                for (name, child) in b.children() {
                    let child_type = actual
                        .and_then(|t| self.registry.field(t, name))
                        .and_then(|spec| match &spec.kind {
                            FieldKind::Record(t) | FieldKind::ListOfRecord(t) => Some(t.as_str()),
                            _ => None,
                        });
                    m.insert(name.to_string(), self.node(child, child_type));
                }

                Value::Object(m)
            }
        }
    }
}

/// `MillingTechnology` -> `milling_technology`. Acronym runs stay together
/// (`CNCMachine` -> `cnc_machine`).
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None => false,
                Some(p) if p == '_' => false,
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Branch;
    use crate::schema::{EnumType, FieldSpec, SchemaType};
    use serde_json::json;

    #[test]
    fn snake_case_names() {
        assert_eq!(snake_case("MillingTechnology"), "milling_technology");
        assert_eq!(snake_case("Technology"), "technology");
        assert_eq!(snake_case("CNCMachine"), "cnc_machine");
        assert_eq!(snake_case("Plane2D"), "plane2_d");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .enumeration(EnumType::new("Ref", [("TCP", "tcp"), ("CCP", "ccp")]))
            .record(
                SchemaType::new("Step")
                    .field("name", FieldSpec::scalar())
                    .field("its_technology", FieldSpec::record("Technology")),
            )
            .record(
                SchemaType::new("Technology")
                    .abstract_type()
                    .field("feedrate_reference", FieldSpec::enumeration("Ref")),
            )
            .record(SchemaType::new("MillingTechnology").extends("Technology"))
            .build()
            .unwrap()
    }

    #[test]
    fn polymorphic_branches_carry_type_attribute() {
        let r = registry();
        let tech_ref = r.lookup_enum("Ref").unwrap().resolve("TCP").unwrap();

        let mut tech = Branch::new();
        tech.set_discriminator("MillingTechnology", &r);
        tech.insert("feedrate_reference", Node::Leaf(crate::model::LeafValue::Enum(tech_ref)));

        let mut step = Branch::new();
        step.insert("name", Node::scalar("rough"));
        step.insert("its_technology", Node::Branch(tech));

        let doc = to_document(&Node::Branch(step), "Step", &r, &WireConfig::default());
        assert_eq!(
            doc,
            json!({
                "process_fragment": {
                    "name": "rough",
                    "its_technology": {
                        "@xsi:type": "milling_technology",
                        "feedrate_reference": "tcp"
                    }
                }
            })
        );
    }

    #[test]
    fn custom_root_element() {
        let r = registry();
        let cfg = WireConfig {
            root_element: "fragment".into(),
            ..WireConfig::default()
        };
        let doc = to_document(&Node::branch(), "Step", &r, &cfg);
        assert_eq!(doc, json!({"fragment": {}}));
    }
}
