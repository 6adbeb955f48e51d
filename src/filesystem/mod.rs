// src/filesystem/mod.rs

//! Filesystem operations for coursefix
//!
//! This module provides:
//! - Recursive tree copies with an explicit overwrite policy
//! - Lookup of the tracking libraries inside a donor export

mod copy;
mod locate;

pub use copy::{CopyStats, copy_file_preserving, copy_tree};
pub use locate::{DonorLibs, find_all, find_legacy_libs};
