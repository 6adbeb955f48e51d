// src/error.rs

//! Error types for coursefix
//!
//! Errors fall into two severity tiers. Fatal errors abort a run and are
//! returned as `Err`. Warnings (`MissingOptionalArtifact`) degrade a single
//! step to a no-op and are collected in the run report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for coursefix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which input root an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    /// The newer, broken export
    New,
    /// The tracking-correct donor export
    Donor,
}

impl std::fmt::Display for InputRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputRole::New => write!(f, "new package"),
            InputRole::Donor => write!(f, "donor package"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// A supplied input root does not exist or is not a directory
    #[error("{role} root is not a directory: {}", path.display())]
    InvalidInputDirectory { role: InputRole, path: PathBuf },

    /// The output root would swallow an input root when recreated
    #[error("output root {} overlaps input root {}", output.display(), input.display())]
    OutputOverlapsInput { output: PathBuf, input: PathBuf },

    /// The donor tree lacks one or both tracking libraries
    #[error(
        "could not find {} under {}; point the donor at an extracted (not zipped) \
         pre-update export that is known to track correctly",
        missing.join(" and "),
        root.display()
    )]
    MissingDonorAssets { root: PathBuf, missing: Vec<String> },

    /// An artifact a step operates on is absent; the step is skipped
    #[error("{artifact} not found: {}", path.display())]
    MissingOptionalArtifact { artifact: String, path: PathBuf },

    /// Layout file could not be parsed
    #[error("invalid layout file: {0}")]
    Layout(#[from] toml::de::Error),

    /// Layout values are unusable
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Directory walk failed part-way
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts a run, as opposed to being a logged warning
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MissingOptionalArtifact { .. })
    }

    pub(crate) fn missing_artifact(artifact: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::MissingOptionalArtifact {
            artifact: artifact.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_tiers() {
        let warning = Error::missing_artifact("tincan.xml", "/out/tincan.xml");
        assert!(!warning.is_fatal());

        let fatal = Error::MissingDonorAssets {
            root: PathBuf::from("/donor"),
            missing: vec!["lms.js".to_string()],
        };
        assert!(fatal.is_fatal());
    }

    #[test]
    fn test_missing_donor_message_names_root_and_files() {
        let err = Error::MissingDonorAssets {
            root: PathBuf::from("/exports/old"),
            missing: vec!["tincan.js".to_string(), "lms.js".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("tincan.js and lms.js"));
        assert!(msg.contains("/exports/old"));
        assert!(msg.contains("known to track correctly"));
    }

    #[test]
    fn test_invalid_input_message() {
        let err = Error::InvalidInputDirectory {
            role: InputRole::Donor,
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.to_string(), "donor package root is not a directory: /nope");
    }
}
