use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "stepmap", version, about = "Map CAM records onto ISO 14649 process trees")]
pub struct Cli {
    /// Emit compact JSON on stdout and JSON errors on stderr.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Core configuration file (JSON).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Schema declaration file (JSON) used instead of the built-in catalog.
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Built-in catalog id.
    #[arg(long, global = true, default_value = stepmap_catalog::builtin::DEFAULT_CATALOG)]
    pub catalog: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build a process tree from a source record and a mapping.
    Map {
        /// Source record (JSON).
        #[arg(long)]
        source: String,

        /// Mapping file: JSON object of source key -> target path.
        #[arg(long)]
        mapping: String,

        /// Root type of the tree.
        #[arg(long)]
        root: String,

        /// Collect missing required fields instead of failing on the first.
        #[arg(long, conflicts_with = "collect")]
        lenient: bool,

        /// Collect every missing required field, then fail once.
        #[arg(long)]
        collect: bool,
    },

    /// Evaluate a path query against a wire document.
    Query {
        /// Wire document (JSON).
        file: String,

        /// Path query, e.g. `process_fragment/its_operation/its_technology`.
        path: String,
    },

    /// Deep-merge an update document into an original document.
    Merge {
        original: String,
        updates: String,
    },

    /// List catalog types, or the effective fields of one type.
    Types {
        name: Option<String>,
    },
}
