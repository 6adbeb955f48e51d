// src/layout.rs

//! Package layout configuration
//!
//! Names of the structural pieces of an export: the nested content and driver
//! directories of the newer layout, the entry files and the launch manifest.
//! Every field can be overridden from a TOML file:
//!
//! ```toml
//! content_dir = "scormcontent"
//! driver_dir = "scormdriver"
//! entry_file = "index.html"
//! tracking_entry_file = "index_lms.html"
//! manifest_file = "tincan.xml"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Directory in the output that receives the donor libraries
pub const LIB_DIR: &str = "lib";
/// Tracking library file name
pub const TINCAN_JS: &str = "tincan.js";
/// LMS proxy library file name
pub const LMS_JS: &str = "lms.js";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Nested page-content directory of the newer layout
    pub content_dir: String,
    /// Nested driver directory of the newer layout
    pub driver_dir: String,
    /// Entry file the host displays
    pub entry_file: String,
    /// Entry file the manifest launches for tracking
    pub tracking_entry_file: String,
    /// Launch manifest
    pub manifest_file: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            content_dir: "scormcontent".to_string(),
            driver_dir: "scormdriver".to_string(),
            entry_file: "index.html".to_string(),
            tracking_entry_file: "index_lms.html".to_string(),
            manifest_file: "tincan.xml".to_string(),
        }
    }
}

impl Layout {
    /// Load a layout from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a layout from a TOML string; missing fields take their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let layout: Layout = toml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Every name must be a single, non-empty path component
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("content_dir", &self.content_dir),
            ("driver_dir", &self.driver_dir),
            ("entry_file", &self.entry_file),
            ("tracking_entry_file", &self.tracking_entry_file),
            ("manifest_file", &self.manifest_file),
        ];

        for (field, value) in fields {
            if value.is_empty() {
                return Err(Error::InvalidLayout(format!("{} is empty", field)));
            }
            if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
                return Err(Error::InvalidLayout(format!(
                    "{} must be a plain name, got '{}'",
                    field, value
                )));
            }
        }

        if self.content_dir == self.driver_dir {
            return Err(Error::InvalidLayout(
                "content_dir and driver_dir must differ".to_string(),
            ));
        }

        Ok(())
    }

    /// Path-prefix strings that betray the nested layout inside text assets
    pub fn legacy_markers(&self) -> [String; 2] {
        [
            format!("{}/", self.content_dir),
            format!("{}/", self.driver_dir),
        ]
    }
}
