// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Fix {
            new_package,
            donor_package,
            output,
            layout,
        }) => commands::cmd_fix(&new_package, &donor_package, &output, layout.as_deref()),
        Some(Commands::Diagnose {
            package,
            layout,
            json,
            strict,
        }) => commands::cmd_diagnose(&package, layout.as_deref(), json, strict),
        Some(Commands::Completions { shell }) => commands::cmd_completions(shell),
        None => {
            // No command provided, show help
            println!("coursefix v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'coursefix --help' for usage information");
            Ok(())
        }
    }
}
