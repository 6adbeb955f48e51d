// src/filesystem/locate.rs

//! Donor library lookup
//!
//! Searches a donor export at any depth for the two tracking libraries.
//! When a name occurs more than once, the candidate with the
//! lexicographically smallest path relative to the donor root wins. Paths
//! are compared component by component, so `lib/tincan.js` sorts before
//! `lib2/tincan.js` and `a/b/tincan.js` sorts before `b/tincan.js`.

use crate::error::{Error, Result};
use crate::layout::{LMS_JS, TINCAN_JS};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Tracking libraries selected from a donor export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorLibs {
    pub tincan_js: PathBuf,
    pub lms_js: PathBuf,
    /// Number of `tincan.js` files found
    pub tincan_candidates: usize,
    /// Number of `lms.js` files found
    pub lms_candidates: usize,
}

impl DonorLibs {
    /// True when the donor held more than one copy of either library
    pub fn is_ambiguous(&self) -> bool {
        self.tincan_candidates > 1 || self.lms_candidates > 1
    }
}

/// Every file literally named `name` under `root`, in selection order
pub fn find_all(root: &Path, name: &str) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if entry.file_name() == name && entry.path().is_file() {
            matches.push(entry.into_path());
        }
    }

    // Relative paths compare the same as full paths under one root
    matches.sort();
    Ok(matches)
}

/// Locate `tincan.js` and `lms.js` under the donor root
///
/// Fails with [`Error::MissingDonorAssets`] naming every library that has no
/// match at all.
pub fn find_legacy_libs(donor_root: &Path) -> Result<DonorLibs> {
    let tincans = find_all(donor_root, TINCAN_JS)?;
    let lms_files = find_all(donor_root, LMS_JS)?;

    let mut missing = Vec::new();
    if tincans.is_empty() {
        missing.push(TINCAN_JS.to_string());
    }
    if lms_files.is_empty() {
        missing.push(LMS_JS.to_string());
    }
    if !missing.is_empty() {
        return Err(Error::MissingDonorAssets {
            root: donor_root.to_path_buf(),
            missing,
        });
    }

    warn_if_ambiguous(TINCAN_JS, &tincans);
    warn_if_ambiguous(LMS_JS, &lms_files);

    let libs = DonorLibs {
        tincan_js: tincans[0].clone(),
        lms_js: lms_files[0].clone(),
        tincan_candidates: tincans.len(),
        lms_candidates: lms_files.len(),
    };

    info!("Using {} from: {}", TINCAN_JS, libs.tincan_js.display());
    info!("Using {} from: {}", LMS_JS, libs.lms_js.display());

    Ok(libs)
}

fn warn_if_ambiguous(name: &str, candidates: &[PathBuf]) {
    if candidates.len() < 2 {
        return;
    }
    warn!(
        "Donor contains {} copies of {}; using {}",
        candidates.len(),
        name,
        candidates[0].display()
    );
    for other in &candidates[1..] {
        warn!("  ignored: {}", other.display());
    }
}
