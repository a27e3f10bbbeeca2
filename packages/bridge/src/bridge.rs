//! Path-based operations over one shared tree.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use kfs_avl::Sequence;
use kfs_core::{split_parent, Entry, EntryId, EntryKind, FileMode, Filesystem, FsError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::access::{check_access, AccessMask, Credentials};

/// Mode given to files created implicitly by [`Bridge::write`].
pub const WRITE_CREATE_MODE: u32 = 0o644;

/// Attributes reported for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub kind: EntryKind,
    /// Type bits plus permission bits.
    pub mode: u32,
    pub nlink: u32,
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub atime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
}

impl Attr {
    fn of(entry: &Entry) -> Self {
        let meta = entry.metadata();
        Self {
            kind: entry.kind(),
            mode: meta.mode.with_type(entry.kind()),
            nlink: meta.nlink,
            size: entry.size(),
            uid: meta.uid,
            gid: meta.gid,
            atime: meta.atime,
            mtime: meta.mtime,
        }
    }
}

/// Adapter between path-based callbacks and a [`Filesystem`].
///
/// Every call takes the single lock around the tree, resolves its path from
/// the root and runs to completion before releasing it. Failures come back as
/// [`FsError`]; [`ErrnoExt`](crate::ErrnoExt) turns them into error numbers.
#[derive(Debug)]
pub struct Bridge {
    fs: Mutex<Filesystem>,
    credentials: Credentials,
}

impl Bridge {
    /// A bridge over a fresh tree whose root belongs to `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        let fs = Filesystem::with_root_owner(credentials.uid, credentials.gid);
        Self::with_filesystem(fs, credentials)
    }

    pub fn with_filesystem(fs: Filesystem, credentials: Credentials) -> Self {
        Self {
            fs: Mutex::new(fs),
            credentials,
        }
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
    }

    pub fn into_inner(self) -> Filesystem {
        self.fs.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Filesystem> {
        self.fs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn getattr(&self, path: &str) -> Result<Attr> {
        let fs = self.lock();
        let id = resolve(&fs, path)?;
        Ok(Attr::of(entry(&fs, id)?))
    }

    /// Directory listing with `.` and `..`; a file lists as its own name.
    pub fn readdir(&self, path: &str) -> Result<Sequence<String>> {
        let fs = self.lock();
        let id = resolve(&fs, path)?;
        self.require(&fs, id, path, AccessMask::R_OK)
            .inspect_err(|e| reject("readdir", path, e))?;

        let entry = entry(&fs, id)?;
        if entry.is_file() {
            let mut names = Sequence::with_capacity(1);
            names.push(entry.name().to_string());
            return Ok(names);
        }
        fs.list_children(id)
    }

    pub fn open(&self, path: &str, mask: AccessMask) -> Result<()> {
        self.access(path, mask)
    }

    /// Up to `size` bytes of the file starting at `offset`.
    pub fn read(&self, path: &str, size: usize, offset: u64) -> Result<Vec<u8>> {
        let fs = self.lock();
        let id = resolve(&fs, path)?;
        self.require(&fs, id, path, AccessMask::R_OK)
            .inspect_err(|e| reject("read", path, e))?;

        let offset = to_usize(offset)?;
        Ok(fs.file(id)?.read_at(offset, size).to_vec())
    }

    /// Write `data` at `offset`, creating the file when it does not exist.
    pub fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<usize> {
        let mut fs = self.lock();
        // a trailing or doubled slash misses `lookup` but still names an
        // existing child once split
        let id = match fs.lookup(path) {
            Some(id) => id,
            None => {
                let (parent, name) = split(path)?;
                let parent_id = resolve(&fs, parent)?;
                match fs.find_child(parent_id, name)? {
                    Some(id) => id,
                    None => {
                        self.require(&fs, parent_id, parent, AccessMask::W_OK)
                            .inspect_err(|e| reject("write", path, e))?;

                        let file = Entry::file(name)
                            .with_mode(WRITE_CREATE_MODE)
                            .with_owner(self.credentials.uid, self.credentials.gid);
                        let id = fs.attach_child(parent_id, file)?;
                        debug!(path, "created file on write");
                        return fs.write_file(id, data, to_usize(offset)?);
                    }
                }
            }
        };

        self.require(&fs, id, path, AccessMask::W_OK)
            .inspect_err(|e| reject("write", path, e))?;

        fs.write_file(id, data, to_usize(offset)?)
    }

    pub fn mkdir(&self, path: &str, mode: u32) -> Result<()> {
        self.make(path, EntryKind::Directory, mode)
            .inspect_err(|e| reject("mkdir", path, e))
    }

    pub fn create(&self, path: &str, mode: u32) -> Result<()> {
        self.make(path, EntryKind::File, mode)
            .inspect_err(|e| reject("create", path, e))
    }

    fn make(&self, path: &str, kind: EntryKind, mode: u32) -> Result<()> {
        let mut fs = self.lock();
        if fs.lookup(path).is_some() {
            return Err(already_exists(path));
        }

        // checked on the parsed name so `/a/` and `//a` find an existing `/a`
        let (parent, name) = split(path)?;
        let parent_id = resolve(&fs, parent)?;
        if fs.find_child(parent_id, name)?.is_some() {
            return Err(already_exists(path));
        }
        let child = Entry::new(name, kind)
            .with_mode(mode)
            .with_owner(self.credentials.uid, self.credentials.gid);
        fs.attach_child(parent_id, child)?;

        debug!(path, %kind, mode = %format!("{:o}", mode), "created entry");
        Ok(())
    }

    /// Remove a file.
    pub fn unlink(&self, path: &str) -> Result<()> {
        let mut fs = self.lock();
        let id = resolve(&fs, path)?;
        if entry(&fs, id)?.is_dir() {
            let err = FsError::NotAFile {
                path: path.to_string(),
            };
            reject("unlink", path, &err);
            return Err(err);
        }
        detach(&mut fs, id)
    }

    /// Remove an empty directory other than the root.
    pub fn rmdir(&self, path: &str) -> Result<()> {
        let mut fs = self.lock();
        let id = resolve(&fs, path)?;
        if id == fs.root() {
            let err = FsError::invalid("cannot remove the root directory");
            reject("rmdir", path, &err);
            return Err(err);
        }

        let dir = fs.dir(id).inspect_err(|e| reject("rmdir", path, e))?;
        if !dir.is_empty() {
            let err = FsError::NotEmpty {
                path: path.to_string(),
            };
            reject("rmdir", path, &err);
            return Err(err);
        }
        detach(&mut fs, id)
    }

    pub fn utimens(&self, path: &str, atime: DateTime<Utc>, mtime: DateTime<Utc>) -> Result<()> {
        let mut fs = self.lock();
        let id = resolve(&fs, path)?;
        let meta = entry_mut(&mut fs, id)?.metadata_mut();
        meta.atime = atime;
        meta.mtime = mtime;
        Ok(())
    }

    /// Replace the permission bits; anything above `0o7777` is ignored.
    pub fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        let mut fs = self.lock();
        let id = resolve(&fs, path)?;
        entry_mut(&mut fs, id)?.metadata_mut().mode = FileMode::new(mode);
        Ok(())
    }

    pub fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<()> {
        let mut fs = self.lock();
        let id = resolve(&fs, path)?;
        let meta = entry_mut(&mut fs, id)?.metadata_mut();
        meta.uid = uid;
        meta.gid = gid;
        Ok(())
    }

    pub fn truncate(&self, path: &str, size: u64) -> Result<()> {
        let mut fs = self.lock();
        let id = resolve(&fs, path)?;
        fs.truncate_file(id, to_usize(size)?)
            .inspect_err(|e| reject("truncate", path, e))
    }

    /// Check that `path` exists and grants `mask` to the requester.
    pub fn access(&self, path: &str, mask: AccessMask) -> Result<()> {
        let fs = self.lock();
        let id = resolve(&fs, path)?;
        self.require(&fs, id, path, mask)
            .inspect_err(|e| reject("access", path, e))
    }

    /// Every path in the tree, depth first.
    pub fn tree(&self) -> Result<Sequence<String>> {
        let fs = self.lock();
        fs.list_tree(fs.root())
    }

    fn require(&self, fs: &Filesystem, id: EntryId, path: &str, mask: AccessMask) -> Result<()> {
        let meta = entry(fs, id)?.metadata();
        if check_access(self.credentials, meta.uid, meta.gid, meta.mode, mask) {
            Ok(())
        } else {
            Err(FsError::PermissionDenied {
                path: path.to_string(),
            })
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(Credentials::current())
    }
}

fn resolve(fs: &Filesystem, path: &str) -> Result<EntryId> {
    fs.lookup(path).ok_or_else(|| FsError::not_found(path))
}

fn entry(fs: &Filesystem, id: EntryId) -> Result<&Entry> {
    fs.entry(id)
        .ok_or_else(|| FsError::invalid(format!("unknown entry {}", id)))
}

fn entry_mut(fs: &mut Filesystem, id: EntryId) -> Result<&mut Entry> {
    fs.entry_mut(id)
        .ok_or_else(|| FsError::invalid(format!("unknown entry {}", id)))
}

fn already_exists(path: &str) -> FsError {
    FsError::AlreadyExists {
        path: path.to_string(),
    }
}

fn split(path: &str) -> Result<(&str, &str)> {
    split_parent(path).ok_or_else(|| FsError::invalid(format!("no parent for {:?}", path)))
}

fn detach(fs: &mut Filesystem, id: EntryId) -> Result<()> {
    let parent = fs
        .parent(id)
        .ok_or_else(|| FsError::invalid(format!("entry {} has no parent", id)))?;
    let name = entry(fs, id)?.name().to_string();
    fs.detach(parent, &name)?;
    Ok(())
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| FsError::invalid(format!("offset {} out of range", value)))
}

fn reject(op: &str, path: &str, err: &FsError) {
    warn!(op, path, error = %err, "rejected");
}
