// src/diagnose.rs

//! Read-only checks on a repaired package
//!
//! Confirms the five artifacts a repaired package needs, looks for the same
//! markers the entry patcher inserts, and scans text assets for leftover
//! references to the nested layout. Leftover references are warnings only
//! and never affect the overall verdict.

use crate::error::Result;
use crate::layout::{LIB_DIR, LMS_JS, Layout, TINCAN_JS};
use crate::patch::{PROXY_INIT, PROXY_SELECTION};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Stale references listed in the human-readable report
pub const MAX_LISTED_REFERENCES: usize = 20;

/// Extensions of the text assets scanned for stale references
const SCANNED_EXTENSIONS: [&str; 2] = ["html", "js"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Fail,
    Warn,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "[OK]"),
            Status::Fail => write!(f, "[FAIL]"),
            Status::Warn => write!(f, "[WARN]"),
        }
    }
}

/// One checked condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub status: Status,
    pub message: String,
}

impl Finding {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub root: PathBuf,
    pub entry_file: String,
    pub artifacts: Vec<Finding>,
    /// False when the entry file was missing and wiring was not inspected
    pub wiring_checked: bool,
    pub wiring: Vec<Finding>,
    /// Path-prefix strings the scan looked for
    pub legacy_markers: Vec<String>,
    /// Files still referencing the nested layout, relative to `root`, sorted
    pub stale_references: Vec<PathBuf>,
    /// All artifacts present and all wiring checks passed
    pub overall_ok: bool,
}

/// Run every check against `root`
pub fn diagnose(root: &Path, layout: &Layout) -> Result<Diagnosis> {
    let expected = [
        (layout.entry_file.clone(), root.join(&layout.entry_file)),
        (
            layout.tracking_entry_file.clone(),
            root.join(&layout.tracking_entry_file),
        ),
        (layout.manifest_file.clone(), root.join(&layout.manifest_file)),
        (
            format!("{}/{}", LIB_DIR, TINCAN_JS),
            root.join(LIB_DIR).join(TINCAN_JS),
        ),
        (format!("{}/{}", LIB_DIR, LMS_JS), root.join(LIB_DIR).join(LMS_JS)),
    ];

    let artifacts: Vec<Finding> = expected
        .iter()
        .map(|(label, path)| check_exists(label, path))
        .collect();
    let mut overall_ok = artifacts.iter().all(|f| f.status == Status::Ok);

    let entry_path = root.join(&layout.entry_file);
    let wiring_checked = entry_path.is_file();
    let mut wiring = Vec::new();
    if wiring_checked {
        let text = String::from_utf8_lossy(&fs::read(&entry_path)?).into_owned();
        wiring = check_wiring(&text, &layout.entry_file);
        overall_ok &= wiring.iter().all(|f| f.status == Status::Ok);
    }

    let legacy_markers = layout.legacy_markers().to_vec();
    let stale_references = if root.is_dir() {
        scan_stale_references(root, &legacy_markers)?
    } else {
        Vec::new()
    };

    Ok(Diagnosis {
        root: root.to_path_buf(),
        entry_file: layout.entry_file.clone(),
        artifacts,
        wiring_checked,
        wiring,
        legacy_markers,
        stale_references,
        overall_ok,
    })
}

fn check_exists(label: &str, path: &Path) -> Finding {
    if path.exists() {
        Finding::new(Status::Ok, format!("{}: {}", label, path.display()))
    } else {
        Finding::new(Status::Fail, format!("{} missing: {}", label, path.display()))
    }
}

fn check_wiring(text: &str, entry_file: &str) -> Vec<Finding> {
    let proxy = if text.contains(PROXY_INIT) {
        Finding::new(Status::Ok, format!("window.LMSProxy initialised in {}", entry_file))
    } else {
        Finding::new(
            Status::Fail,
            format!("window.LMSProxy initialisation missing in {}", entry_file),
        )
    };

    let selection = if text.contains(PROXY_SELECTION) {
        Finding::new(Status::Ok, "LMSProxySelections uses window.LMSProxy")
    } else {
        Finding::new(
            Status::Fail,
            "LMSProxySelections does not use window.LMSProxy (still window.parent?)",
        )
    };

    vec![proxy, selection]
}

fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SCANNED_EXTENSIONS
                .iter()
                .any(|scanned| ext.eq_ignore_ascii_case(scanned))
        })
}

/// Relative paths of scanned text files that contain any of `markers`
pub fn scan_stale_references(root: &Path, markers: &[String]) -> Result<Vec<PathBuf>> {
    let mut hits = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_scanned(entry.path()) {
            continue;
        }

        let bytes = fs::read(entry.path())?;
        let text = String::from_utf8_lossy(&bytes);
        if markers.iter().any(|m| text.contains(m.as_str())) {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            hits.push(rel.to_path_buf());
        }
    }

    Ok(hits)
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Diagnosing hybrid package at {} ===", self.root.display())?;
        writeln!(f)?;
        for finding in &self.artifacts {
            writeln!(f, "{}", finding)?;
        }

        writeln!(f)?;
        if self.wiring_checked {
            writeln!(f, "=== Wiring checks ({}) ===", self.entry_file)?;
            for finding in &self.wiring {
                writeln!(f, "{}", finding)?;
            }
        } else {
            writeln!(f, "{} missing, cannot continue wiring checks.", self.entry_file)?;
        }

        let markers = self.legacy_markers.join(" or ");
        writeln!(f)?;
        writeln!(f, "=== Scan for {} references ===", markers)?;
        if self.stale_references.is_empty() {
            writeln!(f, "{} No {} references found in text files", Status::Ok, markers)?;
        } else {
            writeln!(f, "{} References to {} remain in:", Status::Warn, markers)?;
            for path in self.stale_references.iter().take(MAX_LISTED_REFERENCES) {
                writeln!(f, "   - {}", path.display())?;
            }
            let hidden = self.stale_references.len().saturating_sub(MAX_LISTED_REFERENCES);
            if hidden > 0 {
                writeln!(f, "   ... and {} more", hidden)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "=== Overall ===")?;
        if self.overall_ok {
            write!(f, "Looks structurally sound for legacy xAPI tracking.")
        } else {
            write!(f, "Some critical wiring checks failed. Fix before uploading.")
        }
    }
}
