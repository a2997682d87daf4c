//! The descriptor a spawned runner reads to find out which test it runs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::test_run::TestRun;

pub const TEST_PROPERTIES_FILE: &str = "test.properties";
pub const CLASS_NAME: &str = "className";
pub const QUALIFIED_NAME: &str = "qualifiedName";

/// Writes `test.properties` for `run` into `dir`.
pub async fn write(dir: &Path, run: &TestRun) -> std::io::Result<PathBuf> {
    let path = dir.join(TEST_PROPERTIES_FILE);
    tokio::fs::write(&path, render(run)).await?;
    tracing::debug!(target: "vmtest.engine", path = %path.display(), "wrote test descriptor");
    Ok(path)
}

/// Renders the descriptor in Java properties format.
pub fn render(run: &TestRun) -> String {
    let mut out = String::new();
    out.push_str("#generated by vmtest\n");
    let _ = writeln!(out, "#{}", Local::now().format("%a %b %d %H:%M:%S %Z %Y"));
    for (key, value) in [(CLASS_NAME, run.test_class()), (QUALIFIED_NAME, run.qualified_name())] {
        let _ = writeln!(out, "{}={}", escape(key, true), escape(value, false));
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
            c => out.push(c),
        }
    }
    out
}
