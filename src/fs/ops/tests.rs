#![cfg(test)]

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt, symlink};

use tempfile::{tempdir, tempdir_in};

use super::*;
use crate::fs::{attributes, exists, kind};

fn build_tree(root: &Path) -> Vec<PathBuf> {
    let paths = vec![
        root.join("top.txt"),
        root.join("nested"),
        root.join("nested/inner.txt"),
        root.join("nested/deeper"),
        root.join("nested/deeper/deepest.txt"),
        root.join("empty"),
    ];
    fs::create_dir(root).unwrap();
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    fs::create_dir(root.join("empty")).unwrap();
    fs::write(root.join("top.txt"), b"top").unwrap();
    fs::write(root.join("nested/inner.txt"), b"inner").unwrap();
    fs::write(root.join("nested/deeper/deepest.txt"), b"deepest").unwrap();
    paths
}

#[test]
fn test_create_directory() {
    let dir = tempdir().unwrap();
    let new = dir.path().join("new");

    create_directory(&new).unwrap();
    assert_eq!(kind(&new), Some(ObjectKind::Directory));

    assert!(
        matches!(create_directory(&new), Err(FsError::AlreadyExists { .. })),
        "Creating over an existing object should fail with AlreadyExists."
    );
    assert!(
        matches!(
            create_directory(dir.path().join("missing/child")),
            Err(FsError::CreateFailed { errno, .. }) if errno.raw() == libc::ENOENT
        ),
        "Missing parents shouldn't be created."
    );

    let file = dir.path().join("file");
    fs::write(&file, b"").unwrap();
    assert!(
        matches!(
            create_directory(file.join("child")),
            Err(FsError::CreateFailed { errno, .. }) if errno.raw() == libc::ENOTDIR
        ),
    );
}

#[test]
fn test_symbolic_link_into_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    let links = dir.path().join("links");
    fs::write(&file, b"content").unwrap();
    fs::create_dir(&links).unwrap();

    let link = create_symbolic_link(&file, &links).unwrap();
    assert_eq!(link, links.join("file"), "The link should be named after the source.");
    assert_eq!(kind(&link), Some(ObjectKind::SymbolicLink));
    assert_eq!(fs::read(&link).unwrap(), b"content");
}

#[test]
fn test_symbolic_link_at_literal_path() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    fs::write(&file, b"content").unwrap();

    let link = create_symbolic_link(&file, dir.path().join("alias")).unwrap();
    assert_eq!(link, dir.path().join("alias"));
    assert_eq!(query::read_link(&link).unwrap(), file);

    assert!(
        matches!(
            create_symbolic_link(&file, &link),
            Err(FsError::LinkFailed { errno, .. }) if errno.raw() == libc::EEXIST
        ),
        "Linking over an existing object should fail."
    );
    assert!(
        matches!(
            create_symbolic_link(&file, dir.path().join("missing/alias")),
            Err(FsError::LinkFailed { .. })
        ),
        "Linking into a missing parent should fail."
    );
    assert!(matches!(
        create_symbolic_link(dir.path().join("missing"), dir.path().join("other")),
        Err(FsError::SourceMissing { .. })
    ));
}

#[test]
fn test_hard_link() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    fs::write(&file, b"content").unwrap();

    let link = create_hard_link(&file, dir.path().join("hard")).unwrap();
    assert_eq!(kind(&link), Some(ObjectKind::Regular));
    assert_eq!(
        fs::metadata(&link).unwrap().ino(),
        fs::metadata(&file).unwrap().ino(),
        "Hard links should share an inode with the source."
    );
    assert!(create_hard_link(dir.path().join("missing"), dir.path().join("x")).unwrap_err().is_source_missing());
}

#[test]
fn test_delete_tree() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    let paths = build_tree(&root);
    // Links inside the tree should be removed without touching their targets.
    let outside = dir.path().join("outside.txt");
    fs::write(&outside, b"keep").unwrap();
    symlink(&outside, root.join("nested/link")).unwrap();

    delete_object(&root).unwrap();
    assert!(!exists(&root));
    for path in paths {
        assert!(!exists(&path), "{} should have been deleted.", path.display());
    }
    assert_eq!(fs::read(&outside).unwrap(), b"keep");

    assert!(matches!(delete_object(&root), Err(FsError::SourceMissing { .. })));
}

#[test]
fn test_delete_file_and_link() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    let link = dir.path().join("link");
    fs::write(&file, b"").unwrap();
    symlink(dir.path(), &link).unwrap();

    delete_object(&link).unwrap();
    assert!(!exists(&link));
    assert!(exists(dir.path()), "Deleting a link shouldn't delete its target.");

    delete_object(&file).unwrap();
    assert!(!exists(&file));
}

#[test]
fn test_copy_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    fs::write(&file, b"content").unwrap();
    fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).unwrap();

    let copy = copy_object(&file, dir.path().join("copy")).unwrap();
    assert_eq!(fs::read(&copy).unwrap(), b"content");
    assert_eq!(attributes(&copy).unwrap().permissions, 0o640, "Permissions should be preserved.");
    assert!(exists(&file), "Copying shouldn't remove the source.");

    assert!(
        matches!(
            copy_object(&file, &copy),
            Err(FsError::CopyFailed { errno, .. }) if errno.raw() == libc::EEXIST
        ),
        "Copying over an existing object should fail."
    );
    assert!(copy_object(dir.path().join("missing"), dir.path().join("x")).unwrap_err().is_source_missing());
}

#[test]
fn test_copy_tree_into_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    build_tree(&root);
    symlink("top.txt", root.join("alias")).unwrap();
    let dest = dir.path().join("dest");
    fs::create_dir(&dest).unwrap();

    let copy = copy_object(&root, &dest).unwrap();
    assert_eq!(copy, dest.join("root"));
    assert_eq!(fs::read(copy.join("top.txt")).unwrap(), b"top");
    assert_eq!(fs::read(copy.join("nested/inner.txt")).unwrap(), b"inner");
    assert_eq!(fs::read(copy.join("nested/deeper/deepest.txt")).unwrap(), b"deepest");
    assert_eq!(kind(copy.join("empty")), Some(ObjectKind::Directory));
    assert_eq!(
        query::read_link(copy.join("alias")).unwrap(),
        PathBuf::from("top.txt"),
        "Links should be recreated with the same target."
    );
}

#[test]
fn test_copy_into_itself_fails() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    build_tree(&root);

    assert!(
        matches!(
            copy_object(&root, root.join("nested")),
            Err(FsError::CopyFailed { errno, .. }) if errno.raw() == libc::EINVAL
        ),
    );
    assert!(!exists(root.join("nested/root")), "Nothing should have been created.");
}

#[test]
fn test_copy_into_itself_through_indirection_fails() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    build_tree(&root);
    fs::create_dir(dir.path().join("other")).unwrap();
    symlink(root.join("nested"), dir.path().join("link")).unwrap();

    for dest in [dir.path().join("other/../root/nested"), dir.path().join("link")] {
        assert!(
            matches!(
                copy_object(&root, &dest),
                Err(FsError::CopyFailed { errno, .. }) if errno.raw() == libc::EINVAL
            ),
            "Copying into {} should be rejected.",
            dest.display()
        );
        assert!(!exists(root.join("nested/root")), "Nothing should have been created.");
    }

    let sibling = copy_object(&root, dir.path().join("other")).unwrap();
    assert_eq!(fs::read(sibling.join("top.txt")).unwrap(), b"top");
}

#[test]
fn test_move() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    build_tree(&root);
    let dest = dir.path().join("dest");
    fs::create_dir(&dest).unwrap();

    let moved = move_object(&root, &dest).unwrap();
    assert_eq!(moved, dest.join("root"));
    assert!(!exists(&root), "The source should be gone after a move.");
    assert_eq!(fs::read(moved.join("nested/inner.txt")).unwrap(), b"inner");

    let renamed = move_object(moved.join("top.txt"), dir.path().join("renamed.txt")).unwrap();
    assert_eq!(fs::read(&renamed).unwrap(), b"top");
    assert!(!exists(moved.join("top.txt")));

    assert!(move_object(&root, &dest).unwrap_err().is_source_missing());
    assert!(
        matches!(
            move_object(&renamed, dir.path().join("missing/x")),
            Err(FsError::MoveFailed { .. })
        ),
    );
}

#[test]
fn test_resolve_destination() {
    let dir = tempdir().unwrap();
    let source = Path::new("/some/where/file");

    assert_eq!(resolve_destination(source, dir.path()).unwrap(), dir.path().join("file"));
    assert_eq!(
        resolve_destination(source, &dir.path().join("named")).unwrap(),
        dir.path().join("named")
    );
    assert_eq!(
        resolve_destination(source, &dir.path().join("missing/named")).unwrap_err(),
        Errno(libc::ENOENT)
    );
}

#[test]
fn test_move_across_filesystems() {
    // Skipped where there's no separate tmpfs to move onto.
    let Ok(other) = tempdir_in("/dev/shm") else {
        return;
    };
    let dir = tempdir().unwrap();
    if fs::metadata(dir.path()).unwrap().dev() == fs::metadata(other.path()).unwrap().dev() {
        return;
    }

    let root = dir.path().join("root");
    build_tree(&root);
    symlink("top.txt", root.join("alias")).unwrap();

    let moved = move_object(&root, other.path()).unwrap();
    assert_eq!(moved, other.path().join("root"));
    assert!(!exists(&root), "The source should be deleted after copying.");
    assert_eq!(fs::read(moved.join("nested/inner.txt")).unwrap(), b"inner");
    assert_eq!(fs::read(moved.join("nested/deeper/deepest.txt")).unwrap(), b"deepest");
    assert_eq!(kind(moved.join("empty")), Some(ObjectKind::Directory));
    assert_eq!(query::read_link(moved.join("alias")).unwrap(), PathBuf::from("top.txt"));
}
