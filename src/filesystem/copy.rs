// src/filesystem/copy.rs

//! Recursive tree copy with a per-run overwrite policy
//!
//! Files keep their content, permissions and modification time. Whether an
//! existing destination file is replaced depends on the `overwrite` flag,
//! which lets callers layer several source trees into one destination and
//! decide which tree wins on conflict through call order.

use crate::error::Result;
use filetime::FileTime;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Outcome of a tree copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written to the destination
    pub copied: usize,
    /// Files left alone because the destination already had them
    pub skipped: usize,
}

impl CopyStats {
    pub fn merge(&mut self, other: CopyStats) {
        self.copied += other.copied;
        self.skipped += other.skipped;
    }
}

/// Copy a single file, preserving permissions and timestamps
///
/// The destination's parent directory must exist. An existing destination
/// file is replaced.
pub fn copy_file_preserving(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;

    let metadata = fs::metadata(src)?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dst, atime, mtime)?;

    Ok(())
}

/// Mirror every file under `src` into the same relative path under `dst`
///
/// Intermediate directories are created as needed. When a destination file
/// already exists it is replaced if `overwrite` is true and skipped
/// otherwise. Symlinked files are copied by content; symlinked directories
/// are not descended. Any error while walking the source aborts the copy.
pub fn copy_tree(src: &Path, dst: &Path, overwrite: bool) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        // Entries are always under `src`; strip_prefix cannot fail here
        let Ok(rel_path) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel_path);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if file_type.is_symlink() && !entry.path().is_file() {
            debug!("Skipping non-file symlink: {}", entry.path().display());
            continue;
        }

        if target.exists() && !overwrite {
            debug!("Keeping existing {}", target.display());
            stats.skipped += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        copy_file_preserving(entry.path(), &target)?;
        stats.copied += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_copy_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("index.html"), "<html></html>");
        write(&src.join("assets/css/app.css"), "body {}");
        fs::create_dir_all(src.join("empty")).unwrap();

        let stats = copy_tree(&src, &dst, false).unwrap();

        assert_eq!(stats, CopyStats { copied: 2, skipped: 0 });
        assert_eq!(fs::read_to_string(dst.join("index.html")).unwrap(), "<html></html>");
        assert_eq!(fs::read_to_string(dst.join("assets/css/app.css")).unwrap(), "body {}");
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn test_no_overwrite_keeps_first_write() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        let dst = temp_dir.path().join("dst");
        write(&first.join("shared.js"), "first");
        write(&second.join("shared.js"), "second");
        write(&second.join("only-second.js"), "extra");

        copy_tree(&first, &dst, true).unwrap();
        let stats = copy_tree(&second, &dst, false).unwrap();

        assert_eq!(stats, CopyStats { copied: 1, skipped: 1 });
        assert_eq!(fs::read_to_string(dst.join("shared.js")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dst.join("only-second.js")).unwrap(), "extra");
    }

    #[test]
    fn test_overwrite_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("a.txt"), "new");
        write(&dst.join("a.txt"), "old");

        let stats = copy_tree(&src, &dst, true).unwrap();

        assert_eq!(stats.copied, 1);
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_preserves_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("old.txt"), "content");
        let stamp = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(src.join("old.txt"), stamp).unwrap();

        copy_tree(&src, &dst, false).unwrap();

        let metadata = fs::metadata(dst.join("old.txt")).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&metadata), stamp);
    }

    #[test]
    fn test_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = copy_tree(
            &temp_dir.path().join("absent"),
            &temp_dir.path().join("dst"),
            true,
        );
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdir_aborts_walk() {
        use crate::error::Error;
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        let locked = src.join("locked");
        write(&src.join("a.txt"), "first");
        write(&locked.join("hidden.txt"), "hidden");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = copy_tree(&src, &dst, true);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(Error::Walk(_))), "{:?}", result);
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "first");
        assert!(!dst.join("locked/hidden.txt").exists());
    }
}
