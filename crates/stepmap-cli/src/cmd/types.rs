use std::process::ExitCode;

use anyhow::{anyhow, Result};
use serde::Serialize;

use stepmap_core::schema::{FallbackPolicy, SchemaRegistry};

use crate::output;

#[derive(Debug, Serialize)]
pub struct TypeInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_type: bool,
}

#[derive(Debug, Serialize)]
pub struct TypesOut {
    pub types: Vec<TypeInfo>,
}

#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackPolicy>,
}

#[derive(Debug, Serialize)]
pub struct TypeDetail {
    #[serde(flatten)]
    pub info: TypeInfo,
    pub ancestors: Vec<String>,
    pub subtypes: Vec<String>,
    pub fields: Vec<FieldInfo>,
}

pub fn run(registry: &SchemaRegistry, name: Option<&str>) -> Result<ExitCode> {
    match name {
        None => {
            let types = registry
                .type_names()
                .filter_map(|n| registry.lookup_type(n))
                .map(|t| TypeInfo {
                    name: t.name.clone(),
                    parent: t.parent.clone(),
                    abstract_type: t.abstract_type,
                })
                .collect();
            output::print(&TypesOut { types })?;
        }
        Some(n) => {
            let t = registry.lookup_type(n).ok_or_else(|| anyhow!("unknown type: {n}"))?;
            let fields = registry
                .fields_of(n)
                .unwrap_or_default()
                .iter()
                .map(|f| FieldInfo {
                    name: f.name.clone(),
                    kind: f.spec.kind.describe(),
                    required: f.spec.required,
                    fallback: f.spec.fallback.clone(),
                })
                .collect();
            let detail = TypeDetail {
                info: TypeInfo {
                    name: t.name.clone(),
                    parent: t.parent.clone(),
                    abstract_type: t.abstract_type,
                },
                ancestors: registry.ancestors_of(n).into_iter().map(String::from).collect(),
                subtypes: registry.subtypes_of(n).into_iter().map(String::from).collect(),
                fields,
            };
            output::print(&detail)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
