//! Shell-delegated copy.
//!
//! Translates a [`CopyMode`] bit-set into the matching `cp` command line and
//! runs the system copy utility with a caller-supplied environment. Captured
//! stdout/stderr are handed to an optional trace sink; the subprocess exit
//! status is the only verdict — no local validation of flag combinations.
//!
//! The environment map must carry `LOGNAME` and `HOME` for `cp` to behave
//! like it would in the invoking user's shell.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::copy::CopyMode;
use crate::errors::{io_err, FileKitError, Result};

#[cfg(unix)]
use nix::unistd::{geteuid, User};

const CMD_COPY: &str = "/usr/bin/cp";
const CMD_PRINTENV: &str = "/usr/bin/printenv";

/// Environment handed to the spawned copy utility. Ordering is irrelevant;
/// `LOGNAME` and `HOME` are required for the shell path to behave correctly.
pub type Environment = HashMap<String, String>;

/// Minimal environment for a given login name and home directory.
pub fn environment(login: &str, home: &str) -> Environment {
    Environment::from([
        ("LOGNAME".to_string(), login.to_string()),
        ("HOME".to_string(), home.to_string()),
    ])
}

/// Minimal environment derived from the current effective user.
#[cfg(unix)]
pub fn process_environment() -> Result<Environment> {
    let uid = geteuid();
    let user = User::from_uid(uid)
        .ok()
        .flatten()
        .ok_or(FileKitError::Identity {
            what: "user",
            name: uid.to_string(),
        })?;
    Ok(environment(
        &user.name,
        &user.dir.to_string_lossy(),
    ))
}

/// Fixed flag table, emitted in this order. Bit-exact compatibility with the
/// POSIX `cp` option names is the contract here.
fn cp_args(mode: CopyMode) -> Vec<&'static str> {
    let table: [(CopyMode, &'static str); 14] = [
        (CopyMode::FORCE, "--force"),
        (CopyMode::ARCHIVE, "--archive"),
        (CopyMode::RECURSIVE, "-r"),
        (CopyMode::NO_CLOBBER, "--no-clobber"),
        (CopyMode::HARD_LINK, "-l"),
        (CopyMode::DEREFERENCE, "-L"),
        (CopyMode::SYMBOLIC_LINK, "--symbolic-link"),
        (CopyMode::UPDATE, "--update"),
        (CopyMode::VERBOSE, "--verbose"),
        (CopyMode::FOLLOW_SYMLINK, "-H"),
        (CopyMode::ONE_FILE_SYSTEM, "--one-file-system"),
        (CopyMode::STRIP_TRAILING_SLASHES, "--strip-trailing-slashes"),
        (CopyMode::PARENTS, "--parents"),
        (CopyMode::NO_DEREFERENCE, "--no-dereference"),
    ];

    table
        .iter()
        .filter(|(flag, _)| mode.contains(*flag))
        .map(|&(_, arg)| arg)
        .collect()
}

/// Copy `src` to `dst` by delegating to the system `cp` utility.
///
/// Each set bit of `mode` becomes one `cp` option; `src` and `dst` follow as
/// positional arguments. The process runs with exactly `env` as its
/// environment and blocks until it exits; there is no timeout or
/// cancellation. Captured stdout and stderr are written to `tracer` when one
/// is supplied. A non-zero exit reports [`FileKitError::CommandFailed`].
pub fn shell_copy(
    tracer: Option<&mut dyn Write>,
    src: &Path,
    dst: &Path,
    mode: CopyMode,
    env: &Environment,
) -> Result<()> {
    let mut cmd = Command::new(CMD_COPY);
    cmd.args(cp_args(mode)).arg(src).arg(dst);
    run(tracer, cmd, env)
}

/// Run the system `printenv` with `env`, streaming its output to the sink.
/// Diagnostic helper for checking what the copy subprocess would see.
pub fn shell_print_env(tracer: Option<&mut dyn Write>, env: &Environment) -> Result<()> {
    run(tracer, Command::new(CMD_PRINTENV), env)
}

fn run(tracer: Option<&mut dyn Write>, mut cmd: Command, env: &Environment) -> Result<()> {
    cmd.env_clear().envs(env);
    let program = cmd.get_program().to_string_lossy().into_owned();
    let program_path = Path::new(&program).to_path_buf();
    debug!(command = %program, args = ?cmd.get_args(), "spawning");

    let output = cmd.output().map_err(io_err("spawn", &program_path))?;

    if let Some(sink) = tracer {
        sink.write_all(&output.stdout)
            .and_then(|()| sink.write_all(&output.stderr))
            .map_err(io_err("write trace output", &program_path))?;
    }

    if !output.status.success() {
        return Err(FileKitError::CommandFailed {
            command: program,
            status: output.status,
        });
    }
    Ok(())
}
