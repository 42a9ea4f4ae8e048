//! Ownership changes with name resolution.
//!
//! Numeric strings are taken as raw IDs directly; anything else goes through
//! the system user/group directory. The chown syscall wants both fields, so
//! callers must supply user and group together or not at all — a lone `-1`
//! sentinel is only correct when the caller explicitly wants that side
//! unchanged.

use std::io;
use std::path::Path;

use nix::unistd::{self, Gid, Group, Uid, User};
use tracing::debug;

use crate::errors::{FileKitError, Result};

/// Resolve user/group names (or numeric strings) to IDs.
///
/// An empty or whitespace-only string means "unspecified" and yields `None`.
/// Supplying exactly one of the two fails with
/// [`FileKitError::InvalidArgument`]; both empty is a valid no-op request.
pub fn resolve_owner(user: &str, group: &str) -> Result<(Option<Uid>, Option<Gid>)> {
    let user = user.trim();
    let group = group.trim();

    let uid = if user.is_empty() {
        None
    } else {
        Some(resolve_uid(user)?)
    };
    let gid = if group.is_empty() {
        None
    } else {
        Some(resolve_gid(group)?)
    };

    if uid.is_some() != gid.is_some() {
        return Err(FileKitError::InvalidArgument {
            user: user.to_string(),
            group: group.to_string(),
        });
    }

    Ok((uid, gid))
}

fn resolve_uid(name: &str) -> Result<Uid> {
    if let Ok(raw) = name.parse::<libc::uid_t>() {
        return Ok(Uid::from_raw(raw));
    }
    match User::from_name(name) {
        Ok(Some(entry)) => Ok(entry.uid),
        Ok(None) | Err(_) => Err(FileKitError::Identity {
            what: "user",
            name: name.to_string(),
        }),
    }
}

fn resolve_gid(name: &str) -> Result<Gid> {
    if let Ok(raw) = name.parse::<libc::gid_t>() {
        return Ok(Gid::from_raw(raw));
    }
    match Group::from_name(name) {
        Ok(Some(entry)) => Ok(entry.gid),
        Ok(None) | Err(_) => Err(FileKitError::Identity {
            what: "group",
            name: name.to_string(),
        }),
    }
}

/// Change `path`'s owner to `user:group`, resolving names first.
/// Both fields empty is a successful no-op (no ownership change requested).
pub fn chown(path: &Path, user: &str, group: &str) -> Result<()> {
    let (uid, gid) = resolve_owner(user, group)?;
    if uid.is_none() && gid.is_none() {
        return Ok(());
    }

    debug!(path = %path.display(), uid = ?uid, gid = ?gid, "changing owner");
    unistd::chown(path, uid, gid).map_err(|errno| FileKitError::Io {
        op: "chown",
        path: path.to_path_buf(),
        source: io::Error::from_raw_os_error(errno as i32),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn numeric_strings_skip_lookup() {
        let (uid, gid) = resolve_owner("1000", "1000").unwrap();
        assert_eq!(uid.map(Uid::as_raw), Some(1000));
        assert_eq!(gid.map(Gid::as_raw), Some(1000));
    }

    #[test]
    fn both_empty_means_no_change() {
        let (uid, gid) = resolve_owner("", "").unwrap();
        assert!(uid.is_none() && gid.is_none());
        // whitespace counts as empty
        let (uid, gid) = resolve_owner("  ", "\t").unwrap();
        assert!(uid.is_none() && gid.is_none());
    }

    #[test]
    fn lone_user_or_group_is_rejected() {
        assert!(matches!(
            resolve_owner("1000", ""),
            Err(FileKitError::InvalidArgument { .. })
        ));
        assert!(matches!(
            resolve_owner("", "1000"),
            Err(FileKitError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn unknown_names_fail_identity() {
        let err = resolve_owner("no-such-user-filekit", "no-such-group-filekit").unwrap_err();
        assert!(matches!(err, FileKitError::Identity { what: "user", .. }));
    }

    #[test]
    fn root_resolves_by_name() {
        let (uid, gid) = resolve_owner("root", "root").unwrap();
        assert_eq!(uid.map(Uid::as_raw), Some(0));
        assert_eq!(gid.map(Gid::as_raw), Some(0));
    }

    #[test]
    fn chown_with_empty_request_is_noop() {
        let f = NamedTempFile::new().unwrap();
        chown(f.path(), "", "").unwrap();
    }
}
