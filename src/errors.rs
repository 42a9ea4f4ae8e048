//! Typed error definitions for filekit.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FileKitError>;

#[derive(Debug, Error)]
pub enum FileKitError {
    #[error("owner and group must be given together, got user={user:?} group={group:?}")]
    InvalidArgument { user: String, group: String },

    #[error("could not resolve {what} `{name}` to a numeric id")]
    Identity { what: &'static str, name: String },

    #[error("destination already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("source is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("lock on {path} still held elsewhere after waiting {waited:?}")]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("{op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed: {status}")]
    CommandFailed { command: String, status: ExitStatus },
}

impl FileKitError {
    /// The underlying io::Error kind, when one exists.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            FileKitError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Adapter for `.map_err(...)` chains: converts io::Error into an
/// [`FileKitError::Io`] carrying the failed operation and path.
pub fn io_err<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> FileKitError + 'a {
    move |source| FileKitError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}
