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

/// Print a command result. JSON mode prints one compact document per line;
/// otherwise the value is pretty-printed.
pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = if is_json() {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{s}");
    Ok(())
}

/// A status line on stdout, green when `ok`. Suppressed in JSON mode.
pub fn status(ok: bool, label: &str, detail: &str) -> anyhow::Result<()> {
    if is_json() {
        return Ok(());
    }
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_fg(Some(if ok { Color::Green } else { Color::Red })))?;
    write!(out, "{}", if ok { "ok  " } else { "FAIL" })?;
    out.reset()?;
    writeln!(out, " {label}: {detail}")?;
    Ok(())
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}
