//! Schema-aware tree construction.
//!
//! The builder applies each mapping entry in order, walking its target path
//! with a current type (starting at the root type) and a cursor into the
//! tree:
//! - a type hint that is a subtype of the declared type at the cursor stamps
//!   the cursor's discriminator and becomes the current type; other hints are
//!   ignored
//! - a field name must exist on the current type and moves the cursor into
//!   the record (or list element) it names
//! - the final field receives the source value, converted by its kind
//!
//! An entry is resolved in full before the tree is touched, so a skipped
//! entry leaves no records or discriminators behind.
//!
//! Two operating modes exist. Strict mode fails on the first unknown field or
//! missing required value. Lenient mode skips unknown fields and collects
//! missing paths. [`TreeBuilder::build_checked`] collects everything first and
//! raises a single aggregated error.

use itertools::Itertools;
use serde_json::Value;

use crate::config::{BuildMode, CoreConfig, LimitsConfig};
use crate::errors::{StepmapError, StepmapResult};
use crate::mapping::{lookup_source, Mapping, MappingEntry, PathToken};
use crate::model::{is_empty_json, Branch, LeafValue, Node};
use crate::schema::{EnumType, FallbackPolicy, FieldKind, FieldSpec, SchemaRegistry};

pub mod required;

pub use required::{check_required, validate_required};

/// Result of a build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub tree: Node,
    /// Dotted paths of missing required fields (lenient builds only).
    pub missing: Vec<String>,
}

impl BuildOutput {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub struct TreeBuilder<'r> {
    registry: &'r SchemaRegistry,
    mode: BuildMode,
    limits: LimitsConfig,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            mode: BuildMode::default(),
            limits: LimitsConfig::default(),
        }
    }

    pub fn with_config(registry: &'r SchemaRegistry, cfg: &CoreConfig) -> Self {
        Self {
            registry,
            mode: cfg.build.mode,
            limits: cfg.limits.clone(),
        }
    }

    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build and validate a tree in the configured mode.
    ///
    /// Strict: the first violation is returned as an error.
    /// Lenient: missing required paths are returned in [`BuildOutput::missing`].
    pub fn build(
        &self,
        source: &Value,
        mapping: &Mapping,
        root_type: &str,
    ) -> StepmapResult<BuildOutput> {
        self.run(source, mapping, root_type, self.mode)
    }

    /// Build leniently, then raise one error listing every missing path.
    pub fn build_checked(
        &self,
        source: &Value,
        mapping: &Mapping,
        root_type: &str,
    ) -> StepmapResult<Node> {
        let out = self.run(source, mapping, root_type, BuildMode::Lenient)?;
        if out.missing.is_empty() {
            Ok(out.tree)
        } else {
            Err(StepmapError::MissingRequiredFields(out.missing))
        }
    }

    fn run(
        &self,
        source: &Value,
        mapping: &Mapping,
        root_type: &str,
        mode: BuildMode,
    ) -> StepmapResult<BuildOutput> {
        if self.registry.lookup_type(root_type).is_none() {
            return Err(StepmapError::UnknownType(root_type.to_string()));
        }

        let mut root = Branch::new();
        let mut missing = Vec::new();

        for entry in mapping.entries() {
            tracing::trace!(
                source_key = %entry.source_key,
                target = %entry.target_string(),
                "applying mapping entry"
            );
            self.apply_entry(&mut root, root_type, entry, source, mode, &mut missing)?;
        }

        let tree = Node::Branch(root);
        let validated = validate_required(self.registry, &tree, root_type)?;

        if mode.is_strict() {
            if let Some(first) = validated.into_iter().next() {
                return Err(StepmapError::MissingRequiredField(first));
            }
            return Ok(BuildOutput { tree, missing });
        }

        let missing: Vec<String> = missing.into_iter().chain(validated).unique().collect();
        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "required fields missing");
        }

        Ok(BuildOutput { tree, missing })
    }

    fn apply_entry(
        &self,
        root: &mut Branch,
        root_type: &str,
        entry: &MappingEntry,
        source: &Value,
        mode: BuildMode,
        missing: &mut Vec<String>,
    ) -> StepmapResult<()> {
        // Nothing touches the tree until the whole path has resolved.
        let Some(target) = self.resolve(root, root_type, entry, mode)? else {
            return Ok(());
        };

        let Some(value) = self.leaf_value(&target, entry, source)? else {
            if !target.spec.required {
                tracing::trace!(
                    path = %target.path,
                    source_key = %entry.source_key,
                    "optional value absent"
                );
                return Ok(());
            }
            if mode.is_strict() {
                return Err(StepmapError::MissingRequiredField(target.path));
            }
            tracing::debug!(
                path = %target.path,
                source_key = %entry.source_key,
                "required value missing"
            );
            // The enclosing records are kept so validation reports beneath them.
            self.commit(root, &target.steps)?;
            missing.push(target.path);
            return Ok(());
        };

        let cursor = self.commit(root, &target.steps)?;
        cursor.insert(target.leaf, Node::Leaf(value));
        Ok(())
    }

    /// Walk the target path against the registry and the current tree without
    /// modifying either. `None` means a lenient build skips the entry.
    fn resolve(
        &self,
        root: &Branch,
        root_type: &str,
        entry: &MappingEntry,
        mode: BuildMode,
    ) -> StepmapResult<Option<Target<'r>>> {
        let Some(last) = entry.target.len().checked_sub(1) else {
            return Err(StepmapError::invalid_path(
                entry.target_string(),
                "target path is empty",
            ));
        };
        if entry.target.len() > self.limits.max_depth {
            return Err(StepmapError::invalid_argument(format!(
                "target path {} exceeds max depth {}",
                entry.target_string(),
                self.limits.max_depth
            )));
        }

        let reg = self.registry;
        let mut existing: Option<&Branch> = Some(root);
        // Declared type of the field the cursor sits on.
        let mut declared = root_type.to_string();
        // Type whose fields the next segment is looked up on.
        let mut current = root_type.to_string();
        let mut segments: Vec<String> = Vec::new();
        let mut steps = Vec::new();

        for (pos, token) in entry.target.iter().enumerate() {
            match token {
                PathToken::Type(t) => {
                    if reg.lookup_type(t).is_none() {
                        return Err(StepmapError::UnknownType(t.clone()));
                    }
                    if !reg.is_subtype(t, &declared) {
                        tracing::debug!(
                            hint = %t,
                            declared = %declared,
                            "type hint is not a subtype; ignored"
                        );
                        continue;
                    }
                    steps.push(Step::Stamp(t.clone()));
                    current = t.clone();
                }
                PathToken::Field { name, index } => {
                    let Some(spec) = reg.field(&current, name) else {
                        let path = join_path(&segments, name);
                        if mode.is_strict() {
                            return Err(StepmapError::UnknownField {
                                type_name: current,
                                field: name.clone(),
                                path,
                                source_key: entry.source_key.clone(),
                            });
                        }
                        tracing::debug!(
                            type_name = %current,
                            field = %name,
                            source_key = %entry.source_key,
                            "unknown field skipped"
                        );
                        return Ok(None);
                    };

                    if pos == last {
                        if index.is_some() {
                            return Err(StepmapError::invalid_path(
                                entry.target_string(),
                                "only list-of-record fields can be indexed",
                            ));
                        }
                        return Ok(Some(Target {
                            steps,
                            leaf: name.clone(),
                            spec,
                            path: join_path(&segments, name),
                        }));
                    }

                    let (child_type, next) = match &spec.kind {
                        FieldKind::Record(t) => {
                            if index.is_some() {
                                return Err(StepmapError::invalid_path(
                                    entry.target_string(),
                                    "only list-of-record fields can be indexed",
                                ));
                            }
                            segments.push(name.clone());
                            steps.push(Step::Record(name.clone()));
                            (t, existing.and_then(|b| b.get(name)))
                        }
                        FieldKind::ListOfRecord(t) => {
                            let i = index.unwrap_or(0);
                            segments.push(format!("{name}[{i}]"));
                            steps.push(Step::Element(name.clone(), i));
                            let item = match existing.and_then(|b| b.get(name)) {
                                None => None,
                                Some(Node::List(items)) => items.get(i),
                                Some(other) => {
                                    return Err(kind_mismatch(&segments, "list", other.kind_name()));
                                }
                            };
                            (t, item)
                        }
                        other => {
                            return Err(StepmapError::KindMismatch {
                                path: join_path(&segments, name),
                                expected: other.describe(),
                                found: "record".to_string(),
                            });
                        }
                    };

                    existing = match next {
                        None => None,
                        Some(Node::Branch(b)) => Some(b),
                        Some(other) => {
                            return Err(kind_mismatch(&segments, "record", other.kind_name()));
                        }
                    };
                    declared = child_type.clone();
                    current = existing
                        .and_then(Branch::discriminator)
                        .filter(|d| reg.is_subtype(d, child_type))
                        .unwrap_or(child_type)
                        .to_string();
                }
            }
        }

        Err(StepmapError::invalid_path(
            entry.target_string(),
            "path must end with a field name",
        ))
    }

    /// Apply resolved steps to the tree, returning the record that receives the leaf.
    fn commit<'t>(&self, root: &'t mut Branch, steps: &[Step]) -> StepmapResult<&'t mut Branch> {
        let mut cursor = root;
        for step in steps {
            let slot = match step {
                Step::Stamp(t) => {
                    cursor.set_discriminator(t, self.registry);
                    continue;
                }
                Step::Record(name) => cursor.child_or_insert_with(name, Node::branch),
                Step::Element(name, i) => {
                    let list = cursor.child_or_insert_with(name, || Node::List(Vec::new()));
                    let Node::List(items) = list else {
                        return Err(StepmapError::invariant(format!("{name} is not a list")));
                    };
                    if items.len() <= *i {
                        items.resize_with(i + 1, Node::branch);
                    }
                    &mut items[*i]
                }
            };
            let Node::Branch(next) = slot else {
                return Err(StepmapError::invariant("resolved path crosses a non-record node"));
            };
            cursor = next;
        }
        Ok(cursor)
    }

    /// Convert the source value for a resolved leaf. `None` when absent.
    fn leaf_value(
        &self,
        target: &Target<'_>,
        entry: &MappingEntry,
        source: &Value,
    ) -> StepmapResult<Option<LeafValue>> {
        let spec = target.spec;
        let path = target.path.as_str();
        let raw = lookup_source(source, &entry.source_key).filter(|v| !is_empty_json(v));

        let value = match &spec.kind {
            FieldKind::Enum(enum_name) => {
                let enum_type = self.registry.lookup_enum(enum_name).ok_or_else(|| {
                    StepmapError::invariant(format!("enum {enum_name} missing from registry"))
                })?;
                match (&spec.fallback, raw) {
                    (Some(policy), raw) => {
                        Some(LeafValue::Enum(apply_fallback(enum_type, policy, raw, path)?))
                    }
                    (None, None) => None,
                    (None, Some(v)) => {
                        let resolved = enum_type.resolve_json(v).ok_or_else(|| {
                            StepmapError::InvalidEnumValue {
                                value: v.to_string(),
                                enum_name: enum_name.clone(),
                                path: path.to_string(),
                            }
                        })?;
                        Some(LeafValue::Enum(resolved))
                    }
                }
            }
            FieldKind::Scalar => raw.map(|v| LeafValue::Scalar(v.clone())),
            FieldKind::ListOfScalar => raw.map(|v| match v {
                Value::Array(_) => LeafValue::Scalar(v.clone()),
                other => LeafValue::Scalar(Value::Array(vec![other.clone()])),
            }),
            FieldKind::Record(_) | FieldKind::ListOfRecord(_) => {
                return Err(StepmapError::KindMismatch {
                    path: path.to_string(),
                    expected: spec.kind.describe(),
                    found: "leaf".to_string(),
                });
            }
        };
        Ok(value)
    }
}

/// A mapping target resolved against the registry.
struct Target<'r> {
    steps: Vec<Step>,
    leaf: String,
    spec: &'r FieldSpec,
    path: String,
}

enum Step {
    /// Offer a type hint to the record under the cursor.
    Stamp(String),
    /// Descend into a record field, creating it if needed.
    Record(String),
    /// Descend into a list element, padding the list if needed.
    Element(String, usize),
}

/// Resolve an enum value under a fallback policy: absent, blank, synonym or
/// unrecognized values become the policy default.
fn apply_fallback(
    enum_type: &EnumType,
    policy: &FallbackPolicy,
    raw: Option<&Value>,
    path: &str,
) -> StepmapResult<crate::schema::EnumValue> {
    let default = enum_type.resolve(&policy.default).ok_or_else(|| {
        StepmapError::invariant(format!(
            "fallback default {} is not a member of {}",
            policy.default,
            enum_type.name()
        ))
    })?;

    let Some(v) = raw else {
        tracing::warn!(path, default = %default.wire, "value absent; using fallback default");
        return Ok(default);
    };

    if let Some(s) = v.as_str() {
        if policy.is_synonym(s) {
            tracing::warn!(
                path,
                value = s,
                default = %default.wire,
                "ambiguous value; using fallback default"
            );
            return Ok(default);
        }
    }

    match enum_type.resolve_json(v) {
        Some(resolved) => Ok(resolved),
        None => {
            tracing::warn!(
                path,
                value = %v,
                default = %default.wire,
                "unrecognized value; using fallback default"
            );
            Ok(default)
        }
    }
}

fn join_path(segments: &[String], name: &str) -> String {
    segments
        .iter()
        .map(|s| s.as_str())
        .chain(std::iter::once(name))
        .join(".")
}

fn kind_mismatch(segments: &[String], expected: &str, found: &str) -> StepmapError {
    StepmapError::KindMismatch {
        path: segments.join("."),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumType, SchemaType};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .enumeration(EnumType::new(
                "CutMode",
                [("CLIMB", "climb"), ("CONVENTIONAL", "conventional")],
            ))
            .enumeration(EnumType::new("Ref", [("TCP", "tcp"), ("CCP", "ccp")]))
            .record(
                SchemaType::new("Operation")
                    .abstract_type()
                    .field("id", FieldSpec::scalar())
                    .field("tech", FieldSpec::record("Tech"))
                    .field("passes", FieldSpec::list_of("Pass")),
            )
            .record(
                SchemaType::new("Milling")
                    .extends("Operation")
                    .field(
                        "mode",
                        FieldSpec::enumeration("CutMode")
                            .with_fallback(FallbackPolicy::new("climb").synonym("both")),
                    ),
            )
            .record(
                SchemaType::new("Tech")
                    .field("feed", FieldSpec::scalar())
                    .field("reference", FieldSpec::enumeration("Ref").required()),
            )
            .record(SchemaType::new("FastTech").extends("Tech").field("boost", FieldSpec::scalar()))
            .record(SchemaType::new("SlowTech").extends("Tech").field("drag", FieldSpec::scalar()))
            .record(SchemaType::new("Pass").field("depth", FieldSpec::scalar().required()))
            .record(SchemaType::new("Unrelated"))
            .build()
            .unwrap()
    }

    fn build(mode: BuildMode, pairs: &[(&str, &str)], src: Value) -> StepmapResult<BuildOutput> {
        let r = registry();
        let m = Mapping::from_pairs(pairs.iter().copied()).unwrap();
        TreeBuilder::new(&r).mode(mode).build(&src, &m, "Operation")
    }

    #[test]
    fn leading_type_hint_stamps_root() {
        let out = build(
            BuildMode::Lenient,
            &[("m", "Milling.mode"), ("i", "Operation.id")],
            json!({"m": "CONVENTIONAL", "i": 4}),
        )
        .unwrap();
        let root = out.tree.as_branch().unwrap();
        assert_eq!(root.discriminator(), Some("Milling"));
        let mode = out.tree.lookup("mode").unwrap().as_leaf().unwrap();
        assert_eq!(mode.to_json(), json!("conventional"));
        assert_eq!(out.tree.lookup("id"), Some(&Node::scalar(4)));
    }

    #[test]
    fn nested_hint_narrows_field_type() {
        let out = build(
            BuildMode::Lenient,
            &[("f", "tech.feed"), ("b", "tech.FastTech.boost"), ("r", "tech.reference")],
            json!({"f": 1.5, "b": true, "r": "TCP"}),
        )
        .unwrap();
        let tech = out.tree.lookup("tech").unwrap().as_branch().unwrap();
        assert_eq!(tech.discriminator(), Some("FastTech"));
        assert!(out.is_complete());
    }

    #[test]
    fn discriminator_remembers_most_specific_type() {
        // The second entry has no hint but still sees FastTech's fields.
        let out = build(
            BuildMode::Strict,
            &[("b", "tech.FastTech.boost"), ("b2", "tech.boost"), ("r", "tech.Tech.reference")],
            json!({"b": 1, "b2": 2, "r": "ccp"}),
        )
        .unwrap();
        let tech = out.tree.lookup("tech").unwrap().as_branch().unwrap();
        assert_eq!(tech.discriminator(), Some("FastTech"));
        assert_eq!(tech.get("boost"), Some(&Node::scalar(2)));
    }

    #[test]
    fn unrelated_hint_is_ignored() {
        let out = build(
            BuildMode::Strict,
            &[("r", "tech.Unrelated.reference")],
            json!({"r": "tcp"}),
        )
        .unwrap();
        let tech = out.tree.lookup("tech").unwrap().as_branch().unwrap();
        assert_eq!(tech.discriminator(), None);
    }

    #[test]
    fn unknown_type_fails() {
        let err = build(BuildMode::Lenient, &[("x", "tech.Ghost.feed")], json!({})).unwrap_err();
        assert_matches!(err, StepmapError::UnknownType(t) if t == "Ghost");
    }

    #[test]
    fn unknown_field_strict_vs_lenient() {
        let pairs = [("x", "tech.nope"), ("r", "tech.reference")];
        let src = json!({"x": 1, "r": "tcp"});
        let err = build(BuildMode::Strict, &pairs, src.clone()).unwrap_err();
        assert_matches!(
            err,
            StepmapError::UnknownField { ref field, ref path, .. }
                if field == "nope" && path == "tech.nope"
        );

        let out = build(BuildMode::Lenient, &pairs, src).unwrap();
        assert!(out.tree.lookup("tech.nope").is_none());
        assert!(out.is_complete());
    }

    #[test]
    fn invalid_enum_value() {
        let err = build(BuildMode::Lenient, &[("r", "tech.reference")], json!({"r": "sideways"}))
            .unwrap_err();
        assert_matches!(
            err,
            StepmapError::InvalidEnumValue { ref enum_name, ref path, .. }
                if enum_name == "Ref" && path == "tech.reference"
        );
    }

    #[test]
    fn fallback_policy_coerces() {
        for (raw, expected) in [
            (json!(null), "climb"),
            (json!(""), "climb"),
            (json!("Both"), "climb"),
            (json!("zigzag"), "climb"),
            (json!("conventional"), "conventional"),
        ] {
            let out =
                build(BuildMode::Strict, &[("m", "Milling.mode")], json!({ "m": raw })).unwrap();
            let leaf = out.tree.lookup("mode").unwrap().as_leaf().unwrap();
            assert_eq!(leaf.to_json(), json!(expected));
        }
    }

    #[test]
    fn missing_required_strict_vs_lenient() {
        let pairs = [("r", "tech.reference"), ("f", "tech.feed")];
        let src = json!({"f": 3});
        let err = build(BuildMode::Strict, &pairs, src.clone()).unwrap_err();
        assert_matches!(err, StepmapError::MissingRequiredField(p) if p == "tech.reference");

        let out = build(BuildMode::Lenient, &pairs, src).unwrap();
        // Recorded during construction and by the validator, reported once.
        assert_eq!(out.missing, vec!["tech.reference"]);
    }

    #[test]
    fn list_elements_are_addressed_by_index() {
        let out = build(
            BuildMode::Lenient,
            &[("a", "passes[1].depth"), ("b", "passes.depth")],
            json!({"a": 2.0, "b": 1.0}),
        )
        .unwrap();
        assert_eq!(out.tree.lookup("passes[0].depth"), Some(&Node::scalar(1.0)));
        assert_eq!(out.tree.lookup("passes[1].depth"), Some(&Node::scalar(2.0)));
    }

    #[test]
    fn padded_list_elements_are_reported_missing() {
        let out = build(BuildMode::Lenient, &[("a", "passes[2].depth")], json!({"a": 5})).unwrap();
        assert_eq!(out.missing, vec!["passes[0].depth", "passes[1].depth"]);
    }

    #[test]
    fn kind_mismatches() {
        let err = build(BuildMode::Lenient, &[("t", "tech")], json!({"t": 1})).unwrap_err();
        assert_matches!(err, StepmapError::KindMismatch { .. });
        let err = build(BuildMode::Lenient, &[("t", "id.feed")], json!({"t": 1})).unwrap_err();
        assert_matches!(err, StepmapError::KindMismatch { .. });
        let err = build(BuildMode::Lenient, &[("t", "tech[1].feed")], json!({"t": 1})).unwrap_err();
        assert_matches!(err, StepmapError::InvalidPath { .. });
    }

    #[test]
    fn build_checked_aggregates() {
        let r = registry();
        let m = Mapping::from_pairs([("a", "passes[1].depth"), ("r", "tech.reference")]).unwrap();
        let err = TreeBuilder::new(&r)
            .build_checked(&json!({"a": 1}), &m, "Operation")
            .unwrap_err();
        assert_eq!(err.missing_paths(), vec!["tech.reference", "passes[0].depth"]);
    }

    #[test]
    fn skipped_entry_leaves_tree_untouched() {
        // Unknown field after a hint: no record is created and nothing is stamped.
        let out = build(BuildMode::Lenient, &[("x", "tech.FastTech.nope")], json!({"x": 1}))
            .unwrap();
        assert!(out.tree.as_branch().unwrap().is_empty());
        assert!(out.missing.is_empty());

        // Same for an absent optional value.
        let out = build(BuildMode::Strict, &[("b", "tech.FastTech.boost")], json!({})).unwrap();
        assert!(out.tree.lookup("tech").is_none());
    }

    #[test]
    fn skipped_entry_does_not_stamp_existing_record() {
        let out = build(
            BuildMode::Lenient,
            &[("r", "tech.reference"), ("x", "tech.FastTech.nope")],
            json!({"r": "tcp", "x": 1}),
        )
        .unwrap();
        let tech = out.tree.lookup("tech").unwrap().as_branch().unwrap();
        assert_eq!(tech.discriminator(), None);
        assert!(out.is_complete());
    }

    #[test]
    fn sibling_hint_selects_its_own_fields() {
        // SlowTech cannot narrow a FastTech record but its fields are still found.
        let out = build(
            BuildMode::Strict,
            &[("b", "tech.FastTech.boost"), ("d", "tech.SlowTech.drag"), ("r", "tech.reference")],
            json!({"b": 1, "d": 2, "r": "ccp"}),
        )
        .unwrap();
        let tech = out.tree.lookup("tech").unwrap().as_branch().unwrap();
        assert_eq!(tech.discriminator(), Some("FastTech"));
        assert_eq!(tech.get("drag"), Some(&Node::scalar(2)));
    }

    #[test]
    fn empty_target_is_an_invalid_path() {
        let r = registry();
        let m = Mapping::new(vec![MappingEntry {
            source_key: "a".to_string(),
            target: Vec::new(),
        }]);
        for mode in [BuildMode::Strict, BuildMode::Lenient] {
            let err = TreeBuilder::new(&r)
                .mode(mode)
                .build(&json!({"a": 1}), &m, "Operation")
                .unwrap_err();
            assert_matches!(err, StepmapError::InvalidPath { .. });
        }
    }

    #[test]
    fn depth_limit() {
        let r = registry();
        let mut cfg = CoreConfig::default();
        cfg.limits.max_depth = 1;
        let m = Mapping::from_pairs([("f", "tech.feed")]).unwrap();
        let err = TreeBuilder::with_config(&r, &cfg)
            .build(&json!({"f": 1}), &m, "Operation")
            .unwrap_err();
        assert_matches!(err, StepmapError::InvalidArgument(_));
    }
}
