// src/transform.rs

//! Package transformer
//!
//! Turns a newer, nested export into the flat layout the legacy tracking
//! libraries expect, grafts the donor's libraries into it and rewires the
//! entry files and manifest. A run moves through four phases in a fixed
//! order:
//!
//! 1. Flatten: content dir (authoritative), driver dir (fills gaps), then
//!    top-level files, all into the output root
//! 2. Import: donor `tincan.js` and `lms.js` into `lib/`
//! 3. Patch: the entry file, then the tracking entry file (created from the
//!    entry file when absent)
//! 4. Rewrite manifest: launch the tracking entry file
//!
//! Inputs are validated and the donor libraries are located before the
//! output root is touched, so bad inputs and a missing donor library leave
//! any previous output as it was. Entry pages are patched as raw bytes and
//! never fail on their encoding. Missing optional artifacts degrade their
//! step to a no-op and are reported as warnings.

use crate::error::{Error, InputRole, Result};
use crate::filesystem::{CopyStats, DonorLibs, copy_file_preserving, copy_tree, find_legacy_libs};
use crate::layout::{LIB_DIR, LMS_JS, Layout, TINCAN_JS};
use crate::patch::{PatchReport, patch_entry_file, update_launch_target};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Mutating phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Flatten,
    Import,
    Patch,
    RewriteManifest,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Flatten,
        Phase::Import,
        Phase::Patch,
        Phase::RewriteManifest,
    ];

    fn step(self) -> usize {
        match self {
            Phase::Flatten => 1,
            Phase::Import => 2,
            Phase::Patch => 3,
            Phase::RewriteManifest => 4,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Flatten => write!(f, "flatten package to legacy layout"),
            Phase::Import => write!(f, "import donor tracking libraries"),
            Phase::Patch => write!(f, "patch entry files"),
            Phase::RewriteManifest => write!(f, "rewrite manifest launch target"),
        }
    }
}

/// Result of a successful run
#[derive(Debug)]
pub struct TransformReport {
    pub output_root: PathBuf,
    /// Files placed by the flatten phase
    pub flatten: CopyStats,
    /// Root entry file was promoted from the content dir
    pub entry_promoted: bool,
    /// Libraries copied into `lib/`
    pub donor: DonorLibs,
    pub entry_patch: Option<PatchReport>,
    pub tracking_entry_patch: Option<PatchReport>,
    /// Tracking entry file was created from the entry file
    pub tracking_entry_created: bool,
    pub manifest_rewritten: bool,
    /// Non-fatal problems, each a `MissingOptionalArtifact`
    pub warnings: Vec<Error>,
}

/// Drives a full repair run
#[derive(Debug, Clone, Default)]
pub struct PackageTransformer {
    layout: Layout,
}

impl PackageTransformer {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Build a repaired package in `output_root`
    ///
    /// `output_root` is deleted and recreated. `new_root` and `donor_root`
    /// are only read.
    pub fn run(
        &self,
        new_root: &Path,
        donor_root: &Path,
        output_root: &Path,
    ) -> Result<TransformReport> {
        validate_input(new_root, InputRole::New)?;
        validate_input(donor_root, InputRole::Donor)?;
        check_overlap(output_root, new_root)?;
        check_overlap(output_root, donor_root)?;

        let donor = find_legacy_libs(donor_root)?;

        recreate_dir(output_root)?;

        let mut warnings = Vec::new();

        enter(Phase::Flatten);
        let (flatten, entry_promoted) = self.flatten(new_root, output_root, &mut warnings)?;

        enter(Phase::Import);
        import_libs(&donor, output_root)?;

        enter(Phase::Patch);
        let entry_path = output_root.join(&self.layout.entry_file);
        let tracking_path = output_root.join(&self.layout.tracking_entry_file);

        let entry_patch = patch_entry_file(&entry_path)?;
        if entry_patch.is_none() {
            note_missing(&mut warnings, &self.layout.entry_file, &entry_path);
        }

        let mut tracking_entry_created = false;
        if !tracking_path.exists() && entry_path.exists() {
            copy_file_preserving(&entry_path, &tracking_path)?;
            tracking_entry_created = true;
            info!(
                "Created {} from {}",
                self.layout.tracking_entry_file, self.layout.entry_file
            );
        }
        let tracking_entry_patch = patch_entry_file(&tracking_path)?;
        if tracking_entry_patch.is_none() {
            note_missing(&mut warnings, &self.layout.tracking_entry_file, &tracking_path);
        }

        enter(Phase::RewriteManifest);
        let manifest_path = output_root.join(&self.layout.manifest_file);
        let manifest_rewritten = if manifest_path.exists() {
            let rewritten = update_launch_target(&manifest_path, &self.layout.tracking_entry_file)?;
            if !rewritten {
                note_missing(
                    &mut warnings,
                    format!("<launch> element in {}", self.layout.manifest_file),
                    &manifest_path,
                );
            }
            rewritten
        } else {
            note_missing(&mut warnings, &self.layout.manifest_file, &manifest_path);
            false
        };

        Ok(TransformReport {
            output_root: output_root.to_path_buf(),
            flatten,
            entry_promoted,
            donor,
            entry_patch,
            tracking_entry_patch,
            tracking_entry_created,
            manifest_rewritten,
            warnings,
        })
    }

    fn flatten(
        &self,
        new_root: &Path,
        output_root: &Path,
        warnings: &mut Vec<Error>,
    ) -> Result<(CopyStats, bool)> {
        let layout = &self.layout;
        let content_dir = new_root.join(&layout.content_dir);
        let driver_dir = new_root.join(&layout.driver_dir);
        let mut stats = CopyStats::default();

        // Content first with overwrite, driver second without: content wins
        // every conflict and driver-only files still land.
        if content_dir.is_dir() {
            info!("Copying {}/ -> root", layout.content_dir);
            stats.merge(copy_tree(&content_dir, output_root, true)?);
        } else {
            note_missing(warnings, format!("{}/", layout.content_dir), &content_dir);
        }

        if driver_dir.is_dir() {
            info!("Copying {}/ -> root (no overwrite)", layout.driver_dir);
            stats.merge(copy_tree(&driver_dir, output_root, false)?);
        } else {
            debug!("No {}/ in new package", layout.driver_dir);
        }

        let mut top_level: Vec<PathBuf> = fs::read_dir(new_root)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        top_level.sort();

        for path in top_level {
            let Some(name) = path.file_name() else {
                continue;
            };
            if name == layout.content_dir.as_str() || name == layout.driver_dir.as_str() {
                continue;
            }
            if path.is_file() {
                copy_file_preserving(&path, &output_root.join(name))?;
                stats.copied += 1;
            }
        }

        let root_entry = output_root.join(&layout.entry_file);
        let nested_entry = content_dir.join(&layout.entry_file);
        let mut promoted = false;
        if !root_entry.exists() && nested_entry.is_file() {
            copy_file_preserving(&nested_entry, &root_entry)?;
            promoted = true;
            info!(
                "Created root {} from {}/{}",
                layout.entry_file, layout.content_dir, layout.entry_file
            );
        }

        info!(
            "Flattened {} file(s), kept {} existing",
            stats.copied, stats.skipped
        );
        Ok((stats, promoted))
    }
}

fn enter(phase: Phase) {
    info!("=== Step {}/{}: {} ===", phase.step(), Phase::ALL.len(), phase);
}

fn note_missing(warnings: &mut Vec<Error>, artifact: impl Into<String>, path: &Path) {
    let warning = Error::missing_artifact(artifact, path);
    warn!("{}; skipping", warning);
    warnings.push(warning);
}

fn validate_input(path: &Path, role: InputRole) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::InvalidInputDirectory {
            role,
            path: path.to_path_buf(),
        })
    }
}

/// Absolute form of `path`, resolving symlinks in whatever prefix exists
fn resolve(path: &Path) -> Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut rest = Vec::new();

    loop {
        if existing.exists() {
            let mut resolved = existing.canonicalize()?;
            resolved.extend(rest.iter().rev());
            return Ok(resolved);
        }
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                };
            }
            _ => return Ok(std::path::absolute(path)?),
        }
    }
}

fn check_overlap(output_root: &Path, input_root: &Path) -> Result<()> {
    let output = resolve(output_root)?;
    let input = resolve(input_root)?;

    if input.starts_with(&output) || output.starts_with(&input) {
        return Err(Error::OutputOverlapsInput {
            output: output_root.to_path_buf(),
            input: input_root.to_path_buf(),
        });
    }
    Ok(())
}

fn recreate_dir(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("Removing previous output {}", path.display());
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

fn import_libs(donor: &DonorLibs, output_root: &Path) -> Result<()> {
    let lib_dir = output_root.join(LIB_DIR);
    fs::create_dir_all(&lib_dir)?;

    copy_file_preserving(&donor.tincan_js, &lib_dir.join(TINCAN_JS))?;
    copy_file_preserving(&donor.lms_js, &lib_dir.join(LMS_JS))?;
    info!("Copied {} and {} into {}/", TINCAN_JS, LMS_JS, LIB_DIR);
    Ok(())
}
