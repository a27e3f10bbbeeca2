use std::sync::Arc;
use std::thread;

use kfs_bridge::{AccessMask, Bridge, Credentials, ErrnoExt, EACCES, EEXIST, ENOENT};
use kfs_core::{EntryKind, FsError};

const OWNER: Credentials = Credentials::new(1000, 1000);

#[test]
fn test_mkdir_touch_write_read() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/a", 0o755).unwrap();
    bridge.create("/a/b", 0o644).unwrap();
    bridge.write("/a/b", b"hi", 0).unwrap();

    let attr = bridge.getattr("/a/b").unwrap();
    assert_eq!(attr.kind, EntryKind::File);
    assert_eq!(attr.size, 2);
    assert_eq!(bridge.read("/a/b", 4096, 0).unwrap(), b"hi");
    assert_eq!(bridge.readdir("/a").unwrap(), [".", "..", "b"]);
}

#[test]
fn test_mkdir_twice_is_already_exists() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/a", 0o755).unwrap();

    let err = bridge.mkdir("/a", 0o755).unwrap_err();
    assert_eq!(
        err,
        FsError::AlreadyExists {
            path: "/a".to_string()
        }
    );
    assert_eq!(err.errno(), EEXIST);
}

#[test]
fn test_unlink_makes_path_absent() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/a", 0o755).unwrap();
    bridge.create("/a/b", 0o644).unwrap();
    bridge.unlink("/a/b").unwrap();

    assert_eq!(bridge.getattr("/a/b").unwrap_err().errno(), ENOENT);
    assert_eq!(bridge.readdir("/a").unwrap(), [".", ".."]);
}

#[test]
fn test_access_uses_single_triplet() {
    let bridge = Bridge::new(OWNER);
    bridge.create("/mine", 0o604).unwrap();
    bridge.chown("/mine", 1000, 1000).unwrap();
    bridge.access("/mine", AccessMask::R_OK).unwrap();

    // group bits are empty, other bits grant read: a group member is denied
    bridge.chown("/mine", 1, 1000).unwrap();
    assert_eq!(
        bridge.access("/mine", AccessMask::R_OK).unwrap_err().errno(),
        EACCES
    );

    bridge.chown("/mine", 1, 1).unwrap();
    bridge.access("/mine", AccessMask::R_OK).unwrap();
    bridge.access("/mine", AccessMask::F_OK).unwrap();
    assert_eq!(
        bridge.access("/missing", AccessMask::F_OK).unwrap_err().errno(),
        ENOENT
    );
}

#[test]
fn test_write_into_read_only_parent_is_denied() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/locked", 0o555).unwrap();

    let err = bridge.write("/locked/f", b"x", 0).unwrap_err();
    assert_eq!(err.errno(), EACCES);
    assert!(bridge.getattr("/locked/f").is_err());
}

#[test]
fn test_sparse_write_through_bridge() {
    let bridge = Bridge::new(OWNER);
    bridge.write("/f", b"ab", 0).unwrap();
    bridge.write("/f", b"z", 4).unwrap();
    assert_eq!(bridge.read("/f", 16, 0).unwrap(), b"ab\0\0z");
}

#[test]
fn test_tree_lists_everything() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/a", 0o755).unwrap();
    bridge.create("/a/b", 0o644).unwrap();
    bridge.create("/c", 0o644).unwrap();

    assert_eq!(bridge.tree().unwrap(), ["/", "/a", "/a/b", "/c"]);
}

#[test]
fn test_concurrent_writers_share_one_tree() {
    let bridge = Arc::new(Bridge::new(OWNER));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                let dir = format!("/t{}", i);
                bridge.mkdir(&dir, 0o755).unwrap();
                for j in 0..25 {
                    bridge
                        .write(&format!("{}/f{}", dir, j), b"x", 0)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let bridge = Arc::try_unwrap(bridge).unwrap();
    let fs = bridge.into_inner();
    assert_eq!(fs.len(), 1 + 8 + 8 * 25);
}

#[test]
fn test_create_with_alternate_spelling_keeps_existing_entry() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/a", 0o755).unwrap();
    bridge.create("/a/keep", 0o644).unwrap();

    for spelling in ["/a/", "//a"] {
        let err = bridge.mkdir(spelling, 0o755).unwrap_err();
        assert_eq!(err.errno(), EEXIST, "mkdir {:?}", spelling);
        assert_eq!(bridge.create(spelling, 0o644).unwrap_err().errno(), EEXIST);
    }
    assert_eq!(bridge.create("/a/keep/", 0o644).unwrap_err().errno(), EEXIST);

    assert_eq!(bridge.getattr("/a").unwrap().kind, EntryKind::Directory);
    assert_eq!(bridge.getattr("/a/keep").unwrap().kind, EntryKind::File);
}

#[test]
fn test_write_with_trailing_slash_targets_existing_entry() {
    let bridge = Bridge::new(OWNER);
    bridge.mkdir("/a", 0o755).unwrap();
    bridge.create("/a/keep", 0o644).unwrap();

    let err = bridge.write("/a/", b"x", 0).unwrap_err();
    assert!(matches!(err, FsError::NotAFile { .. }));
    assert_eq!(bridge.getattr("/a").unwrap().kind, EntryKind::Directory);
    assert!(bridge.getattr("/a/keep").is_ok());

    assert_eq!(bridge.write("/a/keep/", b"data", 0).unwrap(), 4);
    assert_eq!(bridge.read("/a/keep", 16, 0).unwrap(), b"data");
    assert_eq!(bridge.readdir("/a").unwrap(), [".", "..", "keep"]);
}
