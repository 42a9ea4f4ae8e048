//! Advisory-locked atomic rewrite.
//!
//! [`write_locked`] serializes cooperating writers of one file across
//! processes with an exclusive whole-file advisory lock, then truncates and
//! rewrites the file in place.
//!
//! Design:
//! - Unix flock semantics via `fs2`: only other lock-aware processes are
//!   excluded; plain writers that ignore the lock are not blocked.
//! - A zero timeout blocks until the lock is granted. A positive timeout
//!   makes one non-blocking attempt, sleeps once for the full timeout, then
//!   retries non-blocking exactly once before giving up with
//!   [`FileKitError::LockTimeout`]. A single retry, not a polling loop.
//! - The lock is released when the guard is dropped, so every exit path
//!   unlocks and closes the handle. Release errors are logged and swallowed;
//!   closing the descriptor drops the lock regardless.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use tracing::{trace, warn};

use crate::errors::{io_err, FileKitError, Result};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// RAII guard holding the open handle and its exclusive lock.
struct WriteLock {
    file: File,
    path: PathBuf,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        // The close right after this drops the lock anyway, so a failed
        // explicit unlock is worth a warning, nothing more.
        match fs2::FileExt::unlock(&self.file) {
            Ok(()) => trace!(path = %self.path.display(), "lock released"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "lock release failed"),
        }
    }
}

/// Rewrite `path` with `data` under an exclusive advisory lock.
///
/// The file is created with permission bits `mode` when absent. A zero
/// `timeout` waits indefinitely for the lock; a positive `timeout` bounds the
/// wait as described in the module docs. Existing content is fully replaced:
/// a second call with a different payload leaves exactly that payload, never
/// a concatenation.
pub fn write_locked(path: &Path, timeout: Duration, mode: u32, data: &[u8]) -> Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
        opts.custom_flags(libc::O_CLOEXEC);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let file = opts.open(path).map_err(io_err("open for locked write", path))?;
    let guard = acquire(file, path, timeout)?;

    // From here on the guard unlocks and closes on every return.
    let mut f = &guard.file;
    f.seek(SeekFrom::Start(0))
        .map_err(io_err("seek to start", path))?;
    guard
        .file
        .set_len(0)
        .map_err(io_err("truncate file", path))?;
    f.write_all(data).map_err(io_err("write payload", path))?;
    Ok(())
}

fn acquire(file: File, path: &Path, timeout: Duration) -> Result<WriteLock> {
    if timeout.is_zero() {
        trace!(path = %path.display(), "LOCK_EX blocking");
        file.lock_exclusive().map_err(io_err("lock file", path))?;
    } else {
        trace!(path = %path.display(), timeout_ms = timeout.as_millis() as u64, "LOCK_EX with timeout");
        if let Err(e) = file.try_lock_exclusive() {
            if !is_contention(&e) {
                return Err(io_err("lock file", path)(e));
            }
            // One sleep for the full timeout, then exactly one more attempt.
            trace!(path = %path.display(), "lock contended, sleeping once");
            thread::sleep(timeout);
            if let Err(e) = file.try_lock_exclusive() {
                if is_contention(&e) {
                    return Err(FileKitError::LockTimeout {
                        path: path.to_path_buf(),
                        waited: timeout,
                    });
                }
                return Err(io_err("lock file", path)(e));
            }
        }
    }
    trace!(path = %path.display(), "lock acquired");
    Ok(WriteLock {
        file,
        path: path.to_path_buf(),
    })
}

fn is_contention(e: &std::io::Error) -> bool {
    e.kind() == fs2::lock_contended_error().kind()
}
