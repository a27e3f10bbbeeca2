//! kfs: an in-memory hierarchical filesystem.
//!
//! The tree lives in [`fs`]; its directories index their children with the
//! balanced map from [`avl`]. [`bridge`] exposes the tree through
//! kernel-style callbacks with permission checks and POSIX error numbers,
//! and [`shell`] is the interactive front end.
//!
//! # Example
//!
//! ```rust
//! use kfs::bridge::{Bridge, Credentials};
//!
//! let bridge = Bridge::new(Credentials::new(1000, 1000));
//! bridge.mkdir("/notes", 0o755).unwrap();
//! bridge.write("/notes/today", b"hello", 0).unwrap();
//! assert_eq!(bridge.read("/notes/today", 64, 0).unwrap(), b"hello");
//! ```

pub use kfs_avl as avl;
pub use kfs_bridge as bridge;
pub use kfs_core as fs;
pub use kfs_shell as shell;

pub use kfs_core::{Entry, EntryId, EntryKind, Filesystem, FsError};
