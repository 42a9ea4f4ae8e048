use std::fs;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use filekit::{copy_dir, CopyMode, FileKitError};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// src/
///   top.txt
///   sub/
///     nested.txt
///   link -> top.txt        (unix only)
fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("src/top.txt").write_str("top level").unwrap();
    tmp.child("src/sub/nested.txt").write_str("nested").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink(
        tmp.child("src/top.txt").path(),
        tmp.child("src/link").path(),
    )
    .unwrap();
    tmp
}

#[test]
fn non_recursive_copies_only_top_level_files() {
    let tmp = fixture();
    let src = tmp.child("src");
    let dst = tmp.child("dst");

    copy_dir(src.path(), dst.path(), CopyMode::empty()).unwrap();

    dst.child("top.txt").assert("top level");
    // subdirectory entirely absent without RECURSIVE
    assert!(!dst.child("sub").path().exists());
}

#[test]
fn recursive_mirrors_subtrees_without_symlinks() {
    let tmp = fixture();
    let src = tmp.child("src");
    let dst = tmp.child("dst");

    copy_dir(src.path(), dst.path(), CopyMode::RECURSIVE).unwrap();

    dst.child("top.txt").assert("top level");
    dst.child("sub/nested.txt").assert("nested");
    #[cfg(unix)]
    assert!(!dst.child("link").path().exists());
}

#[test]
fn source_must_be_a_directory() {
    let tmp = TempDir::new().unwrap();
    tmp.child("plain").write_str("not a dir").unwrap();

    let err = copy_dir(
        tmp.child("plain").path(),
        tmp.child("dst").path(),
        CopyMode::empty(),
    )
    .unwrap_err();
    assert!(matches!(err, FileKitError::NotADirectory(_)));
}

#[test]
fn existing_destination_requires_force() {
    let tmp = fixture();
    let src = tmp.child("src");
    let dst = tmp.child("dst");
    fs::create_dir(dst.path()).unwrap();

    let err = copy_dir(src.path(), dst.path(), CopyMode::empty()).unwrap_err();
    assert!(matches!(err, FileKitError::AlreadyExists(_)));

    copy_dir(src.path(), dst.path(), CopyMode::FORCE | CopyMode::RECURSIVE).unwrap();
    dst.child("sub/nested.txt").assert("nested");
}

#[cfg(unix)]
#[test]
fn force_adjusts_existing_destination_mode_to_source() {
    let tmp = fixture();
    let src = tmp.child("src");
    let dst = tmp.child("dst");
    fs::create_dir(dst.path()).unwrap();

    fs::set_permissions(src.path(), fs::Permissions::from_mode(0o750)).unwrap();
    fs::set_permissions(dst.path(), fs::Permissions::from_mode(0o700)).unwrap();

    copy_dir(src.path(), dst.path(), CopyMode::FORCE).unwrap();
    let mode = fs::metadata(dst.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o750);
    // restore so TempDir cleanup can traverse
    fs::set_permissions(src.path(), fs::Permissions::from_mode(0o755)).unwrap();
}
