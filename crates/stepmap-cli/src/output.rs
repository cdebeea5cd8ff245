use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Print a value on stdout: compact in JSON mode, pretty otherwise.
pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = if is_json() {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    let mut out = io::stdout().lock();
    writeln!(out, "{s}")?;
    Ok(())
}

/// Report a failed command on stderr.
pub fn error(err: &anyhow::Error) {
    if is_json() {
        let chain: Vec<String> = err.chain().map(|c| c.to_string()).collect();
        let doc = serde_json::json!({ "error": { "message": err.to_string(), "chain": chain } });
        let _ = writeln!(io::stderr(), "{doc}");
        return;
    }

    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {err:#}");
}
