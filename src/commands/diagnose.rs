// src/commands/diagnose.rs

//! Package diagnosis command

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use super::load_layout;

/// Check a repaired package and print the findings
///
/// A failed check only changes the exit status when `strict` is set.
pub fn cmd_diagnose(
    package: &Path,
    layout: Option<&Path>,
    json: bool,
    strict: bool,
) -> Result<()> {
    let layout = load_layout(layout)?;
    let diagnosis = coursefix::diagnose(package, &layout)
        .with_context(|| format!("Failed to scan {}", package.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    } else {
        println!("{}", diagnosis);
    }

    if !diagnosis.overall_ok {
        warn!("Critical checks failed for {}", package.display());
        if strict {
            anyhow::bail!("package at {} failed critical checks", package.display());
        }
    }

    Ok(())
}
