//! Native copy engine.
//!
//! - [`copy_file`]: streaming byte copy with buffered I/O, fsync of the
//!   destination and permission-bit propagation from the source.
//! - [`copy_dir`]: directory copy that preserves each directory's mode,
//!   recurses only when asked and always skips symlinks.
//!
//! Behavioral notes:
//! - Without [`CopyMode::FORCE`] a pre-existing destination is an error, for
//!   files and directories alike.
//! - Symlinks are never copied and never followed here, regardless of flags.
//!   Flag-driven symlink handling belongs to the shell-delegated path.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use tracing::trace;

use crate::errors::{io_err, FileKitError, Result};
use crate::probe;

/// Bit-set of copy behaviors. Flags are independent and combine with `|`;
/// conflicting combinations are not validated locally but handed through to
/// the underlying copy implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyMode(u32);

impl CopyMode {
    /// Overwrite a pre-existing destination.
    pub const FORCE: CopyMode = CopyMode(1 << 0);
    /// Descend into subdirectories.
    pub const RECURSIVE: CopyMode = CopyMode(1 << 1);
    /// `cp --archive`.
    pub const ARCHIVE: CopyMode = CopyMode(1 << 2);
    /// `cp -H`: follow symlinks given on the command line.
    pub const FOLLOW_SYMLINK: CopyMode = CopyMode(1 << 3);
    /// `cp -l`: hard-link instead of copying.
    pub const HARD_LINK: CopyMode = CopyMode(1 << 4);
    /// `cp --symbolic-link`: symlink instead of copying.
    pub const SYMBOLIC_LINK: CopyMode = CopyMode(1 << 5);
    /// `cp --update`: copy only when the source is newer.
    pub const UPDATE: CopyMode = CopyMode(1 << 6);
    /// `cp --verbose`.
    pub const VERBOSE: CopyMode = CopyMode(1 << 7);
    /// `cp --one-file-system`.
    pub const ONE_FILE_SYSTEM: CopyMode = CopyMode(1 << 8);
    /// `cp --strip-trailing-slashes`.
    pub const STRIP_TRAILING_SLASHES: CopyMode = CopyMode(1 << 9);
    /// `cp --parents`.
    pub const PARENTS: CopyMode = CopyMode(1 << 10);
    /// `cp --no-dereference`.
    pub const NO_DEREFERENCE: CopyMode = CopyMode(1 << 11);
    /// `cp --no-clobber`: never overwrite an existing destination.
    pub const NO_CLOBBER: CopyMode = CopyMode(1 << 12);
    /// `cp -L`: always dereference symlinks.
    pub const DEREFERENCE: CopyMode = CopyMode(1 << 13);

    /// The empty flag set.
    pub const fn empty() -> Self {
        CopyMode(0)
    }

    /// Whether every bit of `flag` is set in `self`.
    pub const fn contains(self, flag: CopyMode) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for CopyMode {
    type Output = CopyMode;
    fn bitor(self, rhs: CopyMode) -> CopyMode {
        CopyMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for CopyMode {
    fn bitor_assign(&mut self, rhs: CopyMode) {
        self.0 |= rhs.0;
    }
}

const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

/// Copy the contents of `src` into `dst`, creating `dst` if absent.
///
/// Fails with [`FileKitError::AlreadyExists`] when `dst` exists and
/// [`CopyMode::FORCE`] is unset; otherwise truncates and rewrites it. The
/// copied data is synced to stable storage and `src`'s permission bits are
/// applied to `dst` before returning.
pub fn copy_file(src: &Path, dst: &Path, mode: CopyMode) -> Result<()> {
    let src_f = File::open(src).map_err(io_err("open source file", src))?;

    if probe::exists(dst) && !mode.contains(CopyMode::FORCE) {
        return Err(FileKitError::AlreadyExists(dst.to_path_buf()));
    }

    let dst_f = File::create(dst).map_err(io_err("create destination file", dst))?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer).map_err(io_err("copy bytes", dst))?;
    writer.flush().map_err(io_err("flush destination file", dst))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(io_err("sync destination file", dst))?;
    drop(writer);

    let src_meta = fs::metadata(src).map_err(io_err("stat source file", src))?;
    fs::set_permissions(dst, src_meta.permissions())
        .map_err(io_err("apply source permissions", dst))?;

    trace!(src = %src.display(), dst = %dst.display(), bytes, "file copied");
    Ok(())
}

/// Copy the directory `src` into `dst`, preserving permissions.
///
/// - `src` must be a directory ([`FileKitError::NotADirectory`] otherwise).
/// - A pre-existing `dst` fails with [`FileKitError::AlreadyExists`] unless
///   [`CopyMode::FORCE`] is set, in which case `dst`'s mode is adjusted to
///   match `src`'s instead.
/// - Subdirectories are entered only with [`CopyMode::RECURSIVE`]; symlinked
///   entries are skipped unconditionally.
pub fn copy_dir(src: &Path, dst: &Path, mode: CopyMode) -> Result<()> {
    let src_meta = fs::metadata(src).map_err(io_err("stat source directory", src))?;
    if !src_meta.is_dir() {
        return Err(FileKitError::NotADirectory(src.to_path_buf()));
    }

    match fs::metadata(dst) {
        Ok(_) => {
            if !mode.contains(CopyMode::FORCE) {
                return Err(FileKitError::AlreadyExists(dst.to_path_buf()));
            }
            fs::set_permissions(dst, src_meta.permissions())
                .map_err(io_err("apply source permissions", dst))?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dst).map_err(io_err("create destination directory", dst))?;
            fs::set_permissions(dst, src_meta.permissions())
                .map_err(io_err("apply source permissions", dst))?;
        }
        Err(e) => return Err(io_err("stat destination directory", dst)(e)),
    }

    let entries = fs::read_dir(src).map_err(io_err("read source directory", src))?;
    for entry in entries {
        let entry = entry.map_err(io_err("read source directory", src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        let ftype = entry
            .file_type()
            .map_err(io_err("stat directory entry", &src_path))?;

        if ftype.is_symlink() {
            // Never copied, never followed on the native path.
            trace!(path = %src_path.display(), "skipping symlink");
            continue;
        }

        if ftype.is_dir() {
            if mode.contains(CopyMode::RECURSIVE) {
                copy_dir(&src_path, &dst_path, mode)?;
            }
        } else {
            copy_file(&src_path, &dst_path, mode)?;
        }
    }

    Ok(())
}
