// src/patch/manifest.rs

//! Launch target rewriting for the xAPI manifest
//!
//! Only the first `<launch>` element is rewritten. Its attributes are kept
//! as written and its body becomes the target file name. Manifests with
//! several launch elements are assumed to name a single activity.

use crate::error::Result;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static LAUNCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<launch(\s[^>]*)?>.*?</launch\s*>").unwrap());

/// Replace the body of the first launch element with `target`
///
/// Returns `None` when the text holds no launch element.
pub fn rewrite_launch_text(text: &str, target: &str) -> Option<String> {
    if !LAUNCH_RE.is_match(text) {
        return None;
    }

    let rewritten = LAUNCH_RE.replacen(text, 1, |caps: &Captures| {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        format!("<launch{}>{}</launch>", attrs, target)
    });
    Some(rewritten.into_owned())
}

/// Point the manifest at `target`
///
/// Returns `Ok(false)` when the manifest is absent or has no launch element.
/// The file is written only if the rewrite changed it.
pub fn update_launch_target(manifest_path: &Path, target: &str) -> Result<bool> {
    if !manifest_path.exists() {
        return Ok(false);
    }

    let original = fs::read_to_string(manifest_path)?;
    let Some(updated) = rewrite_launch_text(&original, target) else {
        return Ok(false);
    };

    if updated != original {
        fs::write(manifest_path, updated)?;
    }
    info!("Updated <launch> in {} -> {}", manifest_path.display(), target);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<tincan xmlns="http://projecttincan.com/tincan.xsd">
  <activities>
    <activity id="urn:course" type="http://adlnet.gov/expapi/activities/course">
      <name>Course</name>
      <launch lang="und">scormcontent/index.html</launch>
    </activity>
  </activities>
</tincan>
"#;

    #[test]
    fn test_rewrites_body_and_keeps_attributes() {
        let out = rewrite_launch_text(MANIFEST, "index_lms.html").unwrap();
        assert!(out.contains(r#"<launch lang="und">index_lms.html</launch>"#));
        assert!(!out.contains("scormcontent/index.html"));
        assert!(out.contains("<name>Course</name>"));
    }

    #[test]
    fn test_multiline_body_and_uppercase_tag() {
        let text = "<LAUNCH>\n  old/index.html\n</LAUNCH>";
        let out = rewrite_launch_text(text, "index_lms.html").unwrap();
        assert_eq!(out, "<launch>index_lms.html</launch>");
    }

    #[test]
    fn test_only_first_launch_rewritten() {
        let text = "<launch>a.html</launch><launch>b.html</launch>";
        let out = rewrite_launch_text(text, "index_lms.html").unwrap();
        assert_eq!(out, "<launch>index_lms.html</launch><launch>b.html</launch>");
    }

    #[test]
    fn test_ignores_launcher_elements() {
        let text = "<launcher>x</launcher>";
        assert!(rewrite_launch_text(text, "index_lms.html").is_none());
    }

    #[test]
    fn test_target_is_literal() {
        let out = rewrite_launch_text("<launch>a</launch>", "$1.html").unwrap();
        assert_eq!(out, "<launch>$1.html</launch>");
    }

    #[test]
    fn test_update_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tincan.xml");
        fs::write(&path, MANIFEST).unwrap();

        assert!(update_launch_target(&path, "index_lms.html").unwrap());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(">index_lms.html</launch>"));

        // Second run leaves the file as is
        assert!(update_launch_target(&path, "index_lms.html").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_missing_manifest_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tincan.xml");
        assert!(!update_launch_target(&path, "index_lms.html").unwrap());
        assert!(!path.exists());
    }
}
