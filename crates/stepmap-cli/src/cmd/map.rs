use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use stepmap_core::builder::TreeBuilder;
use stepmap_core::config::{BuildMode, CoreConfig};
use stepmap_core::mapping::Mapping;
use stepmap_core::schema::SchemaRegistry;
use stepmap_core::wire;

use crate::io::input;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The configured build mode.
    Configured,
    Lenient,
    /// Lenient construction, one aggregated error at the end.
    Collect,
}

impl Mode {
    pub fn from_flags(lenient: bool, collect: bool) -> Self {
        match (lenient, collect) {
            (_, true) => Self::Collect,
            (true, false) => Self::Lenient,
            (false, false) => Self::Configured,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MapOut {
    pub document: Value,
    pub missing: Vec<String>,
}

pub fn run(
    registry: &SchemaRegistry,
    cfg: &CoreConfig,
    source_path: &str,
    mapping_path: &str,
    root: &str,
    mode: Mode,
) -> Result<ExitCode> {
    let source = input::read_json_file(source_path)?;
    let mapping_json = input::read_json_file(mapping_path)?;
    let mapping = Mapping::from_json(&mapping_json)
        .with_context(|| format!("invalid mapping in {mapping_path}"))?;

    let builder = TreeBuilder::with_config(registry, cfg);
    let (tree, missing) = match mode {
        Mode::Collect => (builder.build_checked(&source, &mapping, root)?, Vec::new()),
        Mode::Lenient => {
            let out = builder.mode(BuildMode::Lenient).build(&source, &mapping, root)?;
            (out.tree, out.missing)
        }
        Mode::Configured => {
            let out = builder.build(&source, &mapping, root)?;
            (out.tree, out.missing)
        }
    };

    if !missing.is_empty() {
        tracing::warn!(count = missing.len(), "required fields missing");
    }

    let document = wire::to_document(&tree, root, registry, &cfg.wire);
    output::print(&MapOut { document, missing })?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_wins_over_lenient() {
        assert_eq!(Mode::from_flags(true, true), Mode::Collect);
        assert_eq!(Mode::from_flags(true, false), Mode::Lenient);
        assert_eq!(Mode::from_flags(false, false), Mode::Configured);
    }
}
