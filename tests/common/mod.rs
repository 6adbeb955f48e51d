// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Entry page of a newer export: empty head, picker bound to the parent frame
pub const NEW_INDEX: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head></head>
<body>
<div id=\"app\"></div>
<script>
  var proxy = pick(LMSProxySelections, window.parent);
  var again = pick(LMSProxySelections,window.parent);
</script>
</body>
</html>
";

pub const NEW_MANIFEST: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<tincan xmlns=\"http://projecttincan.com/tincan.xsd\">
  <activities>
    <activity id=\"urn:articulate:course\" type=\"http://adlnet.gov/expapi/activities/course\">
      <name>Safety Basics</name>
      <launch lang=\"und\">scormdriver/indexAPI.html</launch>
    </activity>
  </activities>
</tincan>
";

pub const DONOR_TINCAN: &[u8] = b"/* tincan.js donor build */\nvar TinCan = {};\n";
pub const DONOR_LMS: &[u8] = b"/* lms.js donor build */\nfunction lms() { return {}; }\n";

/// Write `content` to `path`, creating parent directories
pub fn write(path: &Path, content: impl AsRef<[u8]>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A newer export, a donor export and a place for the output.
///
/// Keep the fixture alive for as long as the paths are used.
pub struct PackageFixture {
    pub temp_dir: TempDir,
    pub new_root: PathBuf,
    pub donor_root: PathBuf,
    pub output_root: PathBuf,
}

impl PackageFixture {
    /// Nested export with content, driver and top-level files, plus a donor
    /// holding its libraries under `lib/`
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let new_root = temp_dir.path().join("new-export");
        let donor_root = temp_dir.path().join("donor-export");
        let output_root = temp_dir.path().join("fixed");

        write(&new_root.join("scormcontent/index.html"), NEW_INDEX);
        write(&new_root.join("scormcontent/lib/main.bundle.js"), "bundle();");
        write(&new_root.join("scormcontent/assets/shared.css"), "/* content */");
        write(&new_root.join("scormdriver/assets/shared.css"), "/* driver */");
        write(&new_root.join("scormdriver/indexAPI.html"), "<html>driver</html>");
        write(&new_root.join("scormdriver/scormdriver.js"), "driver();");
        write(&new_root.join("tincan.xml"), NEW_MANIFEST);
        write(&new_root.join("metadata.xml"), "<lom/>");

        write(&donor_root.join("lib/tincan.js"), DONOR_TINCAN);
        write(&donor_root.join("lib/lms.js"), DONOR_LMS);
        write(&donor_root.join("index.html"), "<html>old</html>");

        Self {
            temp_dir,
            new_root,
            donor_root,
            output_root,
        }
    }

    /// A second output location inside the same temp dir
    pub fn alt_output(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// Every file under `root` keyed by relative path
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}
