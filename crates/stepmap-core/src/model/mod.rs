//! The typed process tree produced by the tree builder.
//!
//! A tree is a [`Node`]: leaves carry scalars or resolved enumeration values,
//! branches carry an ordered map of children and an optional discriminator,
//! lists carry the elements of list-of-record fields.
//!
//! Discriminators are narrowed monotonically: once a branch is tagged with
//! type `T`, only a strict subtype of `T` may replace it. All writes go
//! through [`Branch::set_discriminator`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{EnumValue, SchemaRegistry};

/// Value held by a leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LeafValue {
    Scalar(Value),
    Enum(EnumValue),
}

impl LeafValue {
    /// Absent, null, empty string or empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(v) => is_empty_json(v),
            Self::Enum(_) => false,
        }
    }

    /// JSON rendering; enumeration values render as their wire value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Enum(e) => Value::String(e.wire.clone()),
        }
    }
}

pub(crate) fn is_empty_json(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Outcome of a discriminator write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// No discriminator was present.
    Set,
    /// The candidate equals the current discriminator.
    Unchanged,
    /// The candidate is a strict subtype and replaced the current one.
    Narrowed,
    /// The candidate is unrelated or less specific; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branch {
    discriminator: Option<String>,
    children: Vec<(String, Node)>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    /// Tag this branch with `candidate`, narrowing only.
    pub fn set_discriminator(&mut self, candidate: &str, registry: &SchemaRegistry) -> Stamp {
        match self.discriminator.as_deref() {
            None => {
                self.discriminator = Some(candidate.to_string());
                Stamp::Set
            }
            Some(cur) if cur == candidate => Stamp::Unchanged,
            Some(cur) if registry.is_strict_subtype(candidate, cur) => {
                tracing::debug!(from = cur, to = candidate, "discriminator narrowed");
                self.discriminator = Some(candidate.to_string());
                Stamp::Narrowed
            }
            Some(cur) => {
                tracing::debug!(current = cur, candidate, "discriminator widening ignored");
                Stamp::Rejected
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, n)| n)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Node> {
        self.children
            .iter_mut()
            .find(|(k, _)| k == field)
            .map(|(_, n)| n)
    }

    /// Child `field`, inserted via `make` when absent. Insertion order is kept.
    pub fn child_or_insert_with(&mut self, field: &str, make: impl FnOnce() -> Node) -> &mut Node {
        let idx = match self.children.iter().position(|(k, _)| k == field) {
            Some(i) => i,
            None => {
                self.children.push((field.to_string(), make()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }

    /// Insert or replace a child.
    pub fn insert(&mut self, field: impl Into<String>, node: Node) {
        let field = field.into();
        match self.get_mut(&field) {
            Some(slot) => *slot = node,
            None => self.children.push((field, node)),
        }
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(LeafValue),
    Branch(Branch),
    List(Vec<Node>),
}

impl Node {
    pub fn branch() -> Self {
        Self::Branch(Branch::new())
    }

    pub fn scalar(v: impl Into<Value>) -> Self {
        Self::Leaf(LeafValue::Scalar(v.into()))
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Self::Branch(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut Branch> {
        match self {
            Self::Branch(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafValue> {
        match self {
            Self::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Branch(_) => "record",
            Self::List(_) => "list",
        }
    }

    /// Whether the node counts as absent for required-field purposes.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(l) => l.is_empty(),
            Self::Branch(_) => false,
            Self::List(items) => items.is_empty(),
        }
    }

    /// Follow a dotted field path (`a.b[1].c`) from this node.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut cur = self;
        for seg in path.split('.') {
            let (name, index) = split_index(seg);
            cur = cur.as_branch()?.get(name)?;
            if let Some(i) = index {
                cur = cur.as_list()?.get(i)?;
            }
        }
        Some(cur)
    }

    /// Untyped JSON view: branches become objects (discriminator under
    /// `"$type"`), lists become arrays, leaves become scalars.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(l) => l.to_json(),
            Self::List(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Self::Branch(b) => {
                let mut m = Map::new();
                if let Some(d) = b.discriminator() {
                    m.insert("$type".to_string(), Value::String(d.to_string()));
                }
                for (k, n) in b.children() {
                    m.insert(k.to_string(), n.to_json());
                }
                Value::Object(m)
            }
        }
    }
}

/// Split `name[3]` into `("name", Some(3))`.
pub(crate) fn split_index(seg: &str) -> (&str, Option<usize>) {
    if let Some(open) = seg.find('[') {
        if let Some(inner) = seg[open + 1..].strip_suffix(']') {
            if let Ok(i) = inner.parse::<usize>() {
                return (&seg[..open], Some(i));
            }
        }
    }
    (seg, None)
}
