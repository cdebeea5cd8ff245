use std::process::ExitCode;

use anyhow::Result;

use stepmap_core::config::CoreConfig;
use stepmap_core::query::QueryEvaluator;

use crate::io::input;
use crate::output;

/// Exit status when the printed document is an error document.
const QUERY_FAILED: u8 = 2;

pub fn run(cfg: &CoreConfig, file: &str, path: &str) -> Result<ExitCode> {
    let doc = input::read_json_file(file)?;

    let resp = QueryEvaluator::from_config(cfg).evaluate(&doc, path);
    let failed = !resp.is_found();

    output::print(&resp.into_document())?;
    Ok(if failed {
        ExitCode::from(QUERY_FAILED)
    } else {
        ExitCode::SUCCESS
    })
}
