use std::process::ExitCode;

use anyhow::Result;

use stepmap_core::config::CoreConfig;
use stepmap_core::merge::Merger;

use crate::io::input;
use crate::output;

pub fn run(cfg: &CoreConfig, original: &str, updates: &str) -> Result<ExitCode> {
    let a = input::read_json_file(original)?;
    let b = input::read_json_file(updates)?;

    let merged = Merger::from_config(cfg).merge(&a, &b);
    output::print(&merged)?;
    Ok(ExitCode::SUCCESS)
}
