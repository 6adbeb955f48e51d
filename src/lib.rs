// src/lib.rs

//! Coursefix
//!
//! Repairs e-learning course exports whose tracking wiring broke in a newer
//! authoring-tool release. The newer export's content is merged with the
//! tracking libraries of a known-good (donor) export, and the glue code in the
//! entry pages and launch manifest is rewritten to connect them.
//!
//! # Architecture
//!
//! - `filesystem`: tree copies with an overwrite policy, donor library lookup
//! - `patch`: idempotent text patches for entry pages and the manifest
//! - `transform`: the phased repair run (flatten, import, patch, rewrite)
//! - `diagnose`: read-only verification of a repaired package
//! - `layout`: configurable names of the package's structural pieces
//!
//! Files are treated as opaque text; nothing is parsed as markup.

pub mod diagnose;
mod error;
pub mod filesystem;
pub mod layout;
pub mod patch;
pub mod transform;

pub use diagnose::{Diagnosis, Finding, Status, diagnose};
pub use error::{Error, InputRole, Result};
pub use filesystem::{CopyStats, DonorLibs, copy_tree, find_legacy_libs};
pub use layout::Layout;
pub use patch::{PatchReport, patch_entry_file, update_launch_target};
pub use transform::{PackageTransformer, Phase, TransformReport};
