use std::path::PathBuf;

use fs_veneer::fs::{self, FileRegistry, FsError, ObjectKind};
use tempfile::{TempDir, tempdir};

fn fresh_file(name: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

#[test]
fn test_write_then_read_whole() {
    let samples: [&[u8]; 4] = [b"", b"x", b"hello, world", &[0xff; 20_000]];

    for content in samples {
        let (_dir, path) = fresh_file("fresh");
        let mut registry = FileRegistry::new();
        let descriptor = registry.open_for_updating(&path).unwrap();

        assert_eq!(registry.write_at(descriptor, 0, content).unwrap(), content.len() as u64);
        assert_eq!(
            registry.read_whole(descriptor).unwrap(),
            content,
            "Reading back a fresh file should return exactly what was written."
        );
    }
}

#[test]
fn test_overwrite_leaves_surroundings() {
    let original: Vec<u8> = (0..64).collect();

    for (offset, patch) in [(0_u64, &b"ab"[..]), (10, &b"cdef"[..]), (62, &b"gh"[..]), (64, &b"past"[..])] {
        let (_dir, path) = fresh_file("patched");
        let mut registry = FileRegistry::new();
        registry.write_file_at(&path, 0, &original).unwrap();

        registry.write_file_at(&path, offset, patch).unwrap();
        let end = offset + patch.len() as u64;
        assert_eq!(registry.read_file_range(&path, offset, end).unwrap(), patch);

        let whole = registry.read_file(&path).unwrap();
        let (offset, end) = (offset as usize, end as usize);
        assert_eq!(whole[..offset], original[..offset], "Bytes before the patch should be unchanged.");
        if end < original.len() {
            assert_eq!(whole[end..], original[end..], "Bytes after the patch should be unchanged.");
        }
    }
}

#[test]
fn test_successive_appends() {
    let (_dir, path) = fresh_file("appended");
    let mut registry = FileRegistry::new();
    registry.write_file_at(&path, 0, b"start:").unwrap();

    let descriptor = registry.open_for_writing(&path).unwrap();
    registry.write_to_end(descriptor, b"one,").unwrap();
    registry.write_to_end(descriptor, b"two").unwrap();
    registry.close(descriptor).unwrap();

    assert_eq!(registry.read_file(&path).unwrap(), b"start:one,two");
}

#[test]
fn test_truncate_lengths() {
    for len in [0_u64, 5, 26, 40] {
        let (_dir, path) = fresh_file("truncated");
        let mut registry = FileRegistry::new();
        registry.write_file_at(&path, 0, b"abcdefghijklmnopqrstuvwxyz").unwrap();

        registry.truncate_file(&path, len).unwrap();
        assert_eq!(registry.read_file(&path).unwrap().len() as u64, len);
    }
}

#[test]
fn test_closed_descriptor() {
    let (_dir, path) = fresh_file("closed");
    let mut registry = FileRegistry::new();
    let descriptor = registry.open_for_updating(&path).unwrap();
    registry.close(descriptor).unwrap();

    assert!(!registry.is_open(descriptor));
    for res in [
        registry.read_whole(descriptor).map(|_| ()),
        registry.write_at(descriptor, 0, b"x").map(|_| ()),
        registry.truncate(descriptor, 0),
        registry.close(descriptor),
    ] {
        assert!(matches!(res, Err(FsError::NotOpen { .. })));
    }
}

#[test]
fn test_alphabet_scenarios() {
    let (_dir, path) = fresh_file("alphabet");
    let mut registry = FileRegistry::new();
    registry.write_file_at(&path, 0, b"abcdefghijklmnopqrstuvwxyz").unwrap();

    assert_eq!(registry.read_file_range(&path, 3, 6).unwrap(), b"def");
    assert_eq!(registry.write_file_at(&path, 13, b"mlkjihgfedcba").unwrap(), 13);
    assert_eq!(registry.read_file(&path).unwrap(), b"abcdefghijklmmlkjihgfedcba");

    registry.truncate_file(&path, 10).unwrap();
    assert_eq!(registry.read_file(&path).unwrap(), b"abcdefghij");
}

#[test]
fn test_tree_lifecycle() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_directory(&root).unwrap();
    fs::create_directory(root.join("sub")).unwrap();

    let mut registry = FileRegistry::new();
    registry.write_file_at(root.join("sub/file"), 0, b"data").unwrap();
    assert_eq!(fs::contents_of_directory(&root).unwrap(), ["sub"]);

    let link = fs::create_symbolic_link(root.join("sub/file"), &root).unwrap();
    assert_eq!(link, root.join("file"));
    assert_eq!(fs::kind(&link), Some(ObjectKind::SymbolicLink));

    let copy = fs::copy_object(&root, dir.path().join("copy")).unwrap();
    assert_eq!(registry.read_file(copy.join("sub/file")).unwrap(), b"data");

    fs::delete_object(&root).unwrap();
    for path in [root.join("sub/file"), root.join("sub"), root.join("file"), root] {
        assert!(!fs::exists(&path));
    }
    assert!(fs::exists(copy.join("file")), "Deleting the original shouldn't affect the copy.");
}
