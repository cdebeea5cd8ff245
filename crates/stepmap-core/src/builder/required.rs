//! Required-field validation over a built tree.
//!
//! The walk never stops early: every required field that is absent or empty
//! (null, blank string, empty list) is reported by its dotted path relative
//! to the root, with list indices (`its_operations[2].its_technology`).
//! Absent optional records are not descended into.

use crate::errors::{StepmapError, StepmapResult};
use crate::model::Node;
use crate::schema::{FieldKind, SchemaRegistry};

/// Collect the paths of all missing required fields under `tree`.
pub fn validate_required(
    registry: &SchemaRegistry,
    tree: &Node,
    root_type: &str,
) -> StepmapResult<Vec<String>> {
    if registry.lookup_type(root_type).is_none() {
        return Err(StepmapError::UnknownType(root_type.to_string()));
    }

    let mut missing = Vec::new();
    walk(registry, tree, root_type, "", &mut missing);
    Ok(missing)
}

/// Like [`validate_required`] but raises one aggregated error.
pub fn check_required(
    registry: &SchemaRegistry,
    tree: &Node,
    root_type: &str,
) -> StepmapResult<()> {
    let missing = validate_required(registry, tree, root_type)?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StepmapError::MissingRequiredFields(missing))
    }
}

fn walk(
    registry: &SchemaRegistry,
    node: &Node,
    declared: &str,
    prefix: &str,
    out: &mut Vec<String>,
) {
    let Some(branch) = node.as_branch() else {
        return;
    };

    // The most specific type recorded on the node decides the field set.
    let ty = branch
        .discriminator()
        .filter(|d| registry.is_subtype(d, declared))
        .unwrap_or(declared);

    let Some(fields) = registry.fields_of(ty) else {
        return;
    };

    for f in fields {
        let path = join(prefix, &f.name);
        let Some(child) = branch.get(&f.name) else {
            if f.spec.required {
                out.push(path);
            }
            continue;
        };

        if f.spec.required && child.is_empty() {
            out.push(path);
            continue;
        }

        match &f.spec.kind {
            FieldKind::Record(t) => walk(registry, child, t, &path, out),
            FieldKind::ListOfRecord(t) => {
                if let Some(items) = child.as_list() {
                    for (i, item) in items.iter().enumerate() {
                        walk(registry, item, t, &format!("{path}[{i}]"), out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
