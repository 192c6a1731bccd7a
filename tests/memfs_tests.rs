//! Integration tests for the in-memory reference file system, exercising
//! create/read/write/rename/delete end to end against the `FileSystem` trait
//! directly -- minus an actual mounted volume, since there is no kernel
//! driver available in a test environment.

mod support {
    pub mod memfs;
}

use fsphost::{
    CleanupFlags, Completion, CreateOptions, CreateOutcome, DesiredAccess, FileAttributes, FileSizeOperation, FileSystem,
    ShareMode, Status,
};
use support::memfs::MemFs;

fn create_file(fs: &MemFs, path: &str) -> u64 {
    match fs
        .create(
            path,
            DesiredAccess::READ_DATA | DesiredAccess::WRITE_DATA,
            FileAttributes::NORMAL,
            ShareMode::empty(),
            CreateOptions::empty(),
            None,
        )
        .expect("create succeeds")
    {
        CreateOutcome::Opened { context, .. } => context,
        CreateOutcome::Reparse { .. } => panic!("unexpected reparse"),
    }
}

fn create_dir(fs: &MemFs, path: &str) -> u64 {
    match fs
        .create(
            path,
            DesiredAccess::LIST_DIRECTORY,
            FileAttributes::DIRECTORY,
            ShareMode::empty(),
            CreateOptions::DIRECTORY_FILE,
            None,
        )
        .expect("create succeeds")
    {
        CreateOutcome::Opened { context, .. } => context,
        CreateOutcome::Reparse { .. } => panic!("unexpected reparse"),
    }
}

/// Scenario 1: open root directory.
#[test]
fn open_root_directory() {
    let fs = MemFs::default();
    let outcome = fs
        .create(
            "\\",
            DesiredAccess::LIST_DIRECTORY,
            FileAttributes::empty(),
            ShareMode::empty(),
            CreateOptions::empty(),
            None,
        )
        .expect("root always exists");
    match outcome {
        CreateOutcome::Opened { info, .. } => {
            assert!(info.file_attributes.contains(FileAttributes::DIRECTORY));
        }
        CreateOutcome::Reparse { .. } => panic!("root cannot be a reparse point"),
    }
}

/// Scenario 2: enumerate an empty directory.
#[test]
fn enumerate_empty_directory() {
    let fs = MemFs::default();
    let context = create_dir(&fs, "\\empty");
    match fs.read_directory(context, None) {
        Completion::Done(Ok(entries)) => assert!(entries.is_empty()),
        other => panic!("expected an empty listing, got {other:?}"),
    }
}

/// Scenario 3: write then read back exactly what was written.
#[test]
fn write_then_read_round_trips() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\a.txt");

    match fs.write(context, 0, b"hello", false, false) {
        Completion::Done(Ok((written, info))) => {
            assert_eq!(written, 5);
            assert_eq!(info.file_size, 5);
        }
        other => panic!("expected a synchronous write, got {other:?}"),
    }

    match fs.read(context, 0, 5) {
        Completion::Done(Ok(data)) => assert_eq!(data, b"hello"),
        other => panic!("expected a synchronous read, got {other:?}"),
    }
}

/// Zero-sized read/write requests report zero bytes transferred and success.
#[test]
fn zero_length_write_and_read_succeed_with_no_bytes() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\empty.txt");

    match fs.write(context, 0, b"", false, false) {
        Completion::Done(Ok((written, _))) => assert_eq!(written, 0),
        other => panic!("unexpected {other:?}"),
    }
    match fs.read(context, 0, 0) {
        Completion::Done(Ok(data)) => assert!(data.is_empty()),
        other => panic!("unexpected {other:?}"),
    }
}

/// Rename onto itself is a no-op success.
#[test]
fn rename_onto_itself_succeeds_without_touching_state() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\same.txt");
    fs.write(context, 0, b"data", false, false);
    assert!(fs.rename(context, "\\same.txt", false, false).is_ok());
    match fs.read(context, 0, 4) {
        Completion::Done(Ok(data)) => assert_eq!(data, b"data"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rename_moves_file_and_its_directory_children() {
    let fs = MemFs::default();
    let dir_context = create_dir(&fs, "\\olddir");
    let child_context = create_file(&fs, "\\olddir\\child.txt");
    fs.write(child_context, 0, b"child", false, false);

    assert!(fs.rename(dir_context, "\\newdir", false, false).is_ok());

    let reopened_child = create_file(&fs, "\\newdir\\child.txt");
    match fs.read(reopened_child, 0, 5) {
        Completion::Done(Ok(data)) => assert_eq!(data, b"child"),
        other => panic!("expected the child to have moved with its parent, got {other:?}"),
    }
}

#[test]
fn rename_without_replace_rejects_existing_target() {
    let fs = MemFs::default();
    create_file(&fs, "\\target.txt");
    let source = create_file(&fs, "\\source.txt");
    assert_eq!(fs.rename(source, "\\target.txt", false, false), Err(Status::OBJECT_NAME_COLLISION));
}

/// Cleanup-with-delete removes the node; a later create re-creates it fresh.
#[test]
fn cleanup_delete_removes_the_node() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\doomed.txt");
    fs.cleanup(
        context,
        "",
        CleanupFlags {
            delete: true,
            set_allocation_size: false,
            set_archive: false,
            set_last_access_time: false,
            set_last_write_time: false,
            set_change_time: false,
        },
    );
    fs.close(context);

    let reopened = create_file(&fs, "\\doomed.txt");
    match fs.read(reopened, 0, 16) {
        Completion::Done(Ok(data)) => assert!(data.is_empty(), "re-created file should start empty"),
        other => panic!("unexpected {other:?}"),
    }
}

/// A non-empty directory cannot be deleted (ordinary `can_delete` check).
#[test]
fn directory_with_children_cannot_be_deleted() {
    let fs = MemFs::default();
    let dir_context = create_dir(&fs, "\\nonempty");
    create_file(&fs, "\\nonempty\\child.txt");
    assert_eq!(fs.can_delete(dir_context), Err(Status::DIRECTORY_NOT_EMPTY));
}

#[test]
fn directory_enumeration_lists_created_children_in_sorted_order() {
    let fs = MemFs::default();
    let dir_context = create_dir(&fs, "\\listing");
    create_file(&fs, "\\listing\\charlie.txt");
    create_file(&fs, "\\listing\\alpha.txt");
    create_file(&fs, "\\listing\\bravo.txt");

    match fs.read_directory(dir_context, None) {
        Completion::Done(Ok(mut entries)) => {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let names: Vec<_> = entries.iter().map(|(name, _)| name.as_str()).collect();
            assert_eq!(names, vec!["alpha.txt", "bravo.txt", "charlie.txt"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn set_file_size_truncates_and_reports_new_size() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\resize.txt");
    fs.write(context, 0, b"0123456789", false, false);
    let info = fs.set_file_size(context, 4, FileSizeOperation::EndOfFile).expect("resize succeeds");
    assert_eq!(info.file_size, 4);
    match fs.read(context, 0, 10) {
        Completion::Done(Ok(data)) => assert_eq!(data, b"0123"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn security_round_trips_through_get_and_set() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\secured.txt");
    let original = fs.get_security(context).expect("has a default SD");
    assert!(original.owner.is_some());

    let template = fsphost::build_security_descriptor(fsphost::PosixIdentity { uid: 42, gid: 7, mode: 0o640 });
    fs.set_security(context, fsphost::SecurityInformation::DACL, &template).expect("set succeeds");
    let updated = fs.get_security(context).expect("still has an SD");
    assert_eq!(updated.dacl.len(), template.dacl.len());
}

#[test]
fn extended_attributes_round_trip() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\ea.txt");
    let entries = vec![fsphost::ExtendedAttribute { flags: 0, name: "user.tag".to_string(), value: b"v1".to_vec() }];
    fs.set_ea(context, &entries).expect("set_ea succeeds");
    let read_back = fs.get_ea(context).expect("get_ea succeeds");
    assert_eq!(read_back, entries);
}

#[test]
fn reparse_point_set_get_delete_round_trip() {
    let fs = MemFs::default();
    let context = create_file(&fs, "\\link");
    fs.set_reparse_point(context, b"\\target").expect("set succeeds");
    assert_eq!(fs.get_reparse_point(context).unwrap(), b"\\target");
    fs.delete_reparse_point(context).expect("delete succeeds");
    assert_eq!(fs.get_reparse_point(context), Err(Status::NO_SUCH_FILE));
}
