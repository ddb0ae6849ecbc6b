use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a response: `text` as is, or `value` as pretty JSON.
pub fn render<T: Serialize>(value: &T, text: &str, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(text.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Write `rendered` to `path`, or to stdout when there is no path.
pub fn write(rendered: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
