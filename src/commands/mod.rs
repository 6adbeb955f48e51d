// src/commands/mod.rs
//! Command handlers for the coursefix CLI

mod diagnose;
mod fix;

pub use diagnose::cmd_diagnose;
pub use fix::cmd_fix;

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use coursefix::Layout;
use std::path::Path;
use tracing::info;

use crate::cli::Cli;

/// Load the layout file if one was given, otherwise the defaults
fn load_layout(path: Option<&Path>) -> Result<Layout> {
    match path {
        Some(path) => {
            let layout = Layout::from_file(path)
                .with_context(|| format!("Failed to load layout file {}", path.display()))?;
            info!("Using layout from {}", path.display());
            Ok(layout)
        }
        None => Ok(Layout::default()),
    }
}

/// Write shell completions to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "coursefix", &mut std::io::stdout());
    Ok(())
}
