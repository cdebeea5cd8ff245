use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use stepmap_catalog::Catalog;
use stepmap_core::config::{validate_config, CoreConfig};
use stepmap_core::schema::SchemaRegistry;

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let v: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("invalid json in {}", path.display()))?;
    Ok(v)
}

/// Core configuration from `--config`, or defaults.
pub fn load_config(path: Option<&str>) -> Result<CoreConfig> {
    let cfg = match path {
        Some(p) => {
            let v = read_json_file(p)?;
            serde_json::from_value(v).with_context(|| format!("invalid config in {p}"))?
        }
        None => CoreConfig::default(),
    };
    validate_config(&cfg).context("invalid configuration")?;
    Ok(cfg)
}

/// The schema in effect: a `--schema` declaration file, else the named
/// built-in catalog.
pub fn load_registry(schema: Option<&str>, catalog_id: &str) -> Result<Arc<SchemaRegistry>> {
    if let Some(p) = schema {
        let raw = fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
        let reg = SchemaRegistry::from_json_str(&raw)
            .with_context(|| format!("invalid schema in {p}"))?;
        tracing::debug!(path = p, types = reg.len(), "schema loaded");
        return Ok(Arc::new(reg));
    }

    let catalog = Catalog::builtin().context("building built-in catalogs")?;
    let entry = catalog.resolve(catalog_id)?;
    Ok(Arc::clone(&entry.registry))
}
