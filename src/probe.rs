//! Stat-based filesystem probes.
//!
//! All probes are pure queries: a missing path is a normal `false`, never an
//! error. The one exception is [`is_symlink`], which keeps lookup failures
//! (not-found, permission denied) distinct from a definite "not a symlink" so
//! callers can tell the two apart.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use crate::errors::{io_err, Result};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Whether `path` exists (follows symlinks, like `stat`).
pub fn exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Whether `path` exists and is a directory.
pub fn is_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Whether `path` exists and is not a directory. Follows symlinks, so a
/// link to a regular file counts.
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}

/// Whether `path` is a symbolic link.
///
/// Uses `lstat` so the link itself is inspected, never its target. Any lookup
/// failure is surfaced as an error rather than collapsed into `false`; use
/// [`is_symlink_or_not`] when a plain boolean is enough.
pub fn is_symlink(path: &Path) -> Result<bool> {
    let meta = fs::symlink_metadata(path).map_err(io_err("lstat", path))?;
    Ok(meta.file_type().is_symlink())
}

/// Boolean convenience over [`is_symlink`]: lookup failures count as `false`.
pub fn is_symlink_or_not(path: &Path) -> bool {
    is_symlink(path).unwrap_or(false)
}

/// Create a single directory with the given permission bits if it is absent.
/// A concurrent creation racing us is tolerated as success.
pub fn mkdir_if_not_exists(path: &Path, mode: u32) -> Result<()> {
    if exists(path) {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    match builder.create(path) {
        Ok(()) => Ok(()),
        // someone else created it between the probe and the mkdir
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(io_err("create directory", path)(e)),
    }
}

/// Open-for-write-create `path` with permission bits `mode`, then close it.
/// A close failure after a successful open is still reported.
pub fn touch(path: &Path, mode: u32) -> Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true);
    #[cfg(unix)]
    opts.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    let file = opts.open(path).map_err(io_err("touch", path))?;
    file.sync_all().map_err(io_err("flush touched file", path))?;
    drop(file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_path_is_plain_false() {
        let dir = tempdir().unwrap();
        let ghost = dir.path().join("nope");
        assert!(!exists(&ghost));
        assert!(!is_dir(&ghost));
        assert!(!is_file(&ghost));
    }

    #[test]
    fn file_and_dir_probes_disagree() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("plain");
        fs::write(&f, b"x").unwrap();

        assert!(exists(&f) && is_file(&f) && !is_dir(&f));
        assert!(exists(dir.path()) && is_dir(dir.path()) && !is_file(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_probe_distinguishes_missing_from_plain() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        fs::write(&target, b"x").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(is_symlink(&link).unwrap());
        assert!(!is_symlink(&target).unwrap());

        let err = is_symlink(&dir.path().join("ghost")).unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
        assert!(!is_symlink_or_not(&dir.path().join("ghost")));
    }

    #[test]
    fn mkdir_if_not_exists_is_idempotent() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        mkdir_if_not_exists(&sub, 0o755).unwrap();
        assert!(is_dir(&sub));
        mkdir_if_not_exists(&sub, 0o755).unwrap();
    }

    #[test]
    fn touch_creates_empty_file() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("stamp");
        touch(&f, 0o644).unwrap();
        assert!(is_file(&f));
        assert_eq!(fs::metadata(&f).unwrap().len(), 0);
    }
}
