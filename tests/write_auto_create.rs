use std::{fs, os::unix::fs::PermissionsExt};

use cl_fs::{ErrorKind, FileMode, Filesystem, StreamContext, WriteFlags};

fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[test]
fn creates_missing_parents() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a/b/c.txt");

    let written = Filesystem::new()
        .write_with_auto_create(&target, "data", WriteFlags::empty(), None)
        .unwrap();

    assert_eq!(written, 4);
    assert_eq!(fs::read(&target).unwrap(), b"data");
    assert!(dir.path().join("a/b").is_dir());
}

#[test]
fn created_parents_use_the_default_directory_mode() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("fresh/c.txt");

    Filesystem::new()
        .write_with_auto_create(&target, "x", WriteFlags::empty(), None)
        .unwrap();

    let mode = fs::metadata(dir.path().join("fresh")).unwrap().permissions().mode() & 0o777;
    // The umask can only take bits away.
    assert_eq!(mode & !0o770, 0);
    assert_eq!(mode & 0o700, 0o700);
}

#[test]
fn existing_file_is_truncated_or_appended() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("log.txt");
    let fs_layer = Filesystem::new();

    fs_layer.write_with_auto_create(&target, "first\n", WriteFlags::empty(), None).unwrap();
    fs_layer.write_with_auto_create(&target, "second\n", WriteFlags::APPEND, None).unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "first\nsecond\n");

    fs_layer.write_with_auto_create(&target, "third\n", WriteFlags::LOCK, None).unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "third\n");
}

#[test]
fn stream_context_sets_the_creation_mode() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("private.txt");
    let context = StreamContext::new(FileMode::private());

    Filesystem::new()
        .write_with_auto_create(&target, "secret", WriteFlags::empty(), Some(&context))
        .unwrap();

    let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode & !0o600, 0);
}

#[test]
fn target_that_is_a_directory_is_not_repaired() {
    let dir = tempfile::tempdir().unwrap();

    let error = Filesystem::new()
        .write_with_auto_create(dir.path(), "data", WriteFlags::empty(), None)
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::IsADirectory);
}

#[test]
fn failing_directory_creation_propagates() {
    if is_root() {
        eprintln!("skipping failing_directory_creation_propagates: permission bits are not enforced for root");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

    let error = Filesystem::new()
        .write_with_auto_create(locked.join("a/c.txt"), "data", WriteFlags::empty(), None)
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::PermissionDenied);
    assert!(error.message().starts_with("mkdir("));
    assert!(!locked.join("a").exists());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();
}
