//! Filesystem convenience helpers.
//!
//! A flat set of independent leaf utilities:
//! - ownership changes with user/group name resolution ([`chown`],
//!   [`resolve_owner`]),
//! - native file and directory copy ([`copy_file`], [`copy_dir`]) plus a
//!   shell-delegated variant that drives the system `cp` ([`shell_copy`]),
//! - stat-based probes ([`exists`], [`is_dir`], [`is_file`], [`is_symlink`]),
//! - advisory-locked atomic rewrites ([`write_locked`]),
//! - line-by-line reading with early stop ([`for_each_line`]).
//!
//! The locked writer is the only place with cross-process coordination: it
//! takes an exclusive advisory lock, so cooperating writers never interleave
//! while plain writers remain unblocked. Everything else is a direct, linear
//! use of OS facilities and reports failures synchronously through
//! [`FileKitError`].

pub mod errors;

mod copy;
mod locked;
#[cfg(unix)]
mod owner;
mod probe;
mod reader;
#[cfg(unix)]
mod shell;

pub use copy::{copy_dir, copy_file, CopyMode};
pub use errors::{FileKitError, Result};
pub use locked::write_locked;
#[cfg(unix)]
pub use owner::{chown, resolve_owner};
pub use probe::{exists, is_dir, is_file, is_symlink, is_symlink_or_not, mkdir_if_not_exists, touch};
pub use reader::for_each_line;
#[cfg(unix)]
pub use shell::{environment, process_environment, shell_copy, shell_print_env, Environment};
