// src/commands/fix.rs

//! Repair command
//!
//! Runs the package transformer and prints a short summary of the result.

use anyhow::{Context, Result};
use coursefix::patch::LibraryInjection;
use coursefix::{PackageTransformer, PatchReport};
use std::path::Path;
use tracing::info;

use super::load_layout;

/// Build a repaired package in `output`
pub fn cmd_fix(
    new_package: &Path,
    donor_package: &Path,
    output: &Path,
    layout: Option<&Path>,
) -> Result<()> {
    let layout = load_layout(layout)?;
    let transformer = PackageTransformer::new(layout);

    info!(
        "Repairing {} with libraries from {}",
        new_package.display(),
        donor_package.display()
    );
    let report = transformer
        .run(new_package, donor_package, output)
        .with_context(|| format!("Failed to repair {}", new_package.display()))?;

    let layout = transformer.layout();
    println!("Repaired package written to {}", report.output_root.display());
    println!(
        "  Flattened: {} file(s) copied, {} kept from content",
        report.flatten.copied, report.flatten.skipped
    );
    println!("  tincan.js: {}", report.donor.tincan_js.display());
    println!("  lms.js:    {}", report.donor.lms_js.display());
    if report.donor.is_ambiguous() {
        println!("  Note: donor holds several copies of the libraries; the first by path was used");
    }
    print_patch(&layout.entry_file, report.entry_patch.as_ref());
    print_patch(&layout.tracking_entry_file, report.tracking_entry_patch.as_ref());
    if report.manifest_rewritten {
        println!(
            "  {}: launch -> {}",
            layout.manifest_file, layout.tracking_entry_file
        );
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    println!();
    println!("Done. Zip the *contents* of this folder and upload as the course:");
    println!("  {}", report.output_root.display());

    Ok(())
}

fn print_patch(name: &str, report: Option<&PatchReport>) {
    let Some(report) = report else {
        return;
    };

    let libraries = match report.libraries {
        LibraryInjection::AlreadyPresent => "already loaded",
        LibraryInjection::AfterConfigScript => "added after tc-config.js",
        LibraryInjection::HeadStart => "added at top of <head>",
        LibraryInjection::NoAnchor => "NOT added (no anchor found)",
    };
    let proxy = if report.proxy_injected {
        "initialised"
    } else {
        "already initialised"
    };

    println!(
        "  {}: libraries {}, LMSProxy {}, {} selection(s) redirected",
        name, libraries, proxy, report.selections_redirected
    );
}
