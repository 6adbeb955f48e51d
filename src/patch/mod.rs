// src/patch/mod.rs

//! Text patches applied to a flattened package
//!
//! Markup and manifests are handled as opaque text: substring checks decide
//! whether a step has already been applied, and regexes locate the few
//! insertion and rewrite points.

mod entry;
mod manifest;

pub use entry::{
    LMS_REF, LibraryInjection, PROXY_INIT, PROXY_SELECTION, PatchReport, TINCAN_REF,
    patch_entry_bytes, patch_entry_file, patch_entry_text,
};
pub use manifest::{rewrite_launch_text, update_launch_target};
