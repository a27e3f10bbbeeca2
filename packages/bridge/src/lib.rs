//! POSIX-style adapter over a shared [`Filesystem`](kfs_core::Filesystem).
//!
//! A kernel bridge hands every callback a path. [`Bridge`] resolves it from
//! the root under one lock, checks permissions against the requester's
//! [`Credentials`], and reports failures as [`FsError`](kfs_core::FsError)
//! values that map onto error numbers through [`ErrnoExt`].

mod access;
mod bridge;
mod errno;

pub use access::{check_access, AccessMask, Credentials};
pub use bridge::{Attr, Bridge, WRITE_CREATE_MODE};
pub use errno::{ErrnoExt, EACCES, EEXIST, EINVAL, EISDIR, ENOENT, ENOTDIR, ENOTEMPTY};
