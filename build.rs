// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: layout override file
fn layout_arg() -> Arg {
    Arg::new("layout")
        .short('l')
        .long("layout")
        .value_name("FILE")
        .help("TOML file overriding package layout names")
}

fn build_cli() -> Command {
    Command::new("coursefix")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Coursefix Contributors")
        .about("Repair course exports by grafting a donor's tracking libraries")
        .subcommand_required(false)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output (overridden by RUST_LOG)"),
        )
        .subcommand(
            Command::new("fix")
                .about("Build a repaired package from a broken export and a donor export")
                .arg(Arg::new("new_package").required(true).help("Newer export with the broken tracking"))
                .arg(Arg::new("donor_package").required(true).help("Older export that tracks correctly"))
                .arg(Arg::new("output").required(true).help("Output folder (deleted and recreated)"))
                .arg(layout_arg()),
        )
        .subcommand(
            Command::new("diagnose")
                .about("Check a repaired package for missing artifacts and broken wiring")
                .arg(Arg::new("package").required(true).help("Package folder to check"))
                .arg(layout_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the findings as JSON"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Exit with an error when a critical check fails"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Write the man page into OUT_DIR; cargo always sets it for build scripts
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = out_dir.join("coursefix.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
