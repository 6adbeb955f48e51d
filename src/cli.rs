// src/cli.rs
//! CLI definitions for coursefix
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coursefix")]
#[command(author = "Coursefix Contributors")]
#[command(version)]
#[command(about = "Repair course exports by grafting a donor's tracking libraries", long_about = None)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a repaired package from a broken export and a donor export
    Fix {
        /// Newer export with the broken tracking (extracted, not zipped)
        new_package: PathBuf,

        /// Older export that tracks correctly; supplies tincan.js and lms.js
        donor_package: PathBuf,

        /// Output folder (deleted and recreated)
        output: PathBuf,

        /// TOML file overriding package layout names
        #[arg(short, long)]
        layout: Option<PathBuf>,
    },

    /// Check a repaired package for missing artifacts and broken wiring
    Diagnose {
        /// Package folder to check
        package: PathBuf,

        /// TOML file overriding package layout names
        #[arg(short, long)]
        layout: Option<PathBuf>,

        /// Print the findings as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when a critical check fails
        #[arg(long)]
        strict: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fix() {
        let cli = Cli::parse_from(["coursefix", "fix", "new", "donor", "out", "-l", "layout.toml"]);
        match cli.command {
            Some(Commands::Fix {
                new_package,
                donor_package,
                output,
                layout,
            }) => {
                assert_eq!(new_package, PathBuf::from("new"));
                assert_eq!(donor_package, PathBuf::from("donor"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(layout, Some(PathBuf::from("layout.toml")));
            }
            _ => panic!("expected fix command"),
        }
    }

    #[test]
    fn test_parse_diagnose_flags() {
        let cli = Cli::parse_from(["coursefix", "-v", "diagnose", "out", "--json", "--strict"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Diagnose { json, strict, .. }) => {
                assert!(json);
                assert!(strict);
            }
            _ => panic!("expected diagnose command"),
        }
    }
}
