//! Line-oriented file reading with an early-stop callback.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::errors::{io_err, Result};

/// Invoke `callback` for each newline-delimited line of `path`.
///
/// The slice handed to the callback excludes the trailing `\n` and a
/// preceding `\r`; a final line without a newline is still delivered.
/// Returning `false` from the callback stops the scan early without error.
/// Open and read failures fail the whole call — there is no per-line error
/// granularity.
pub fn for_each_line<F>(path: &Path, mut callback: F) -> Result<()>
where
    F: FnMut(&[u8]) -> bool,
{
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "file open error");
            return Err(io_err("open file", path)(e));
        }
    };

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = match reader.read_until(b'\n', &mut line) {
            Ok(n) => n,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "scan error");
                return Err(io_err("read line", path)(e));
            }
        };
        if read == 0 {
            return Ok(());
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        if !callback(&line) {
            return Ok(());
        }
    }
}
