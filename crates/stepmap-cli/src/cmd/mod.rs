use std::process::ExitCode;

use anyhow::Result;

use crate::args::{Cli, Command};
use crate::io::input;

mod map;
mod merge;
mod query;
mod types;

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let cfg = input::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Map {
            source,
            mapping,
            root,
            lenient,
            collect,
        } => {
            let reg = input::load_registry(cli.schema.as_deref(), &cli.catalog)?;
            map::run(&reg, &cfg, &source, &mapping, &root, map::Mode::from_flags(lenient, collect))
        }
        Command::Query { file, path } => query::run(&cfg, &file, &path),
        Command::Merge { original, updates } => merge::run(&cfg, &original, &updates),
        Command::Types { name } => {
            let reg = input::load_registry(cli.schema.as_deref(), &cli.catalog)?;
            types::run(&reg, name.as_deref())
        }
    }
}
