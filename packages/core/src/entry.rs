//! Filesystem entries and their kind-specific payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use kfs_avl::{OrderedMap, Sequence};
use serde::{Deserialize, Serialize};

use crate::content::File;
use crate::mode::FileMode;

/// Name of the root directory.
pub const ROOT_NAME: &str = "/";

/// Size reported for every directory.
pub const DIRECTORY_SIZE: u64 = 4096;

/// Handle to an entry stored in a [`Filesystem`](crate::Filesystem).
///
/// Handles are never reused within one filesystem, so a handle to a freed
/// entry simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::File => write!(f, "file"),
        }
    }
}

/// Ownership, permissions and timestamps shared by both kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub atime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
}

impl Metadata {
    fn new(mode: FileMode) -> Self {
        let now = Utc::now();
        Self {
            mode,
            uid: 0,
            gid: 0,
            nlink: 1,
            atime: now,
            mtime: now,
        }
    }

    /// Set the modify time to now.
    pub fn touch(&mut self) {
        self.mtime = Utc::now();
    }
}

/// Payload of a directory: children keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    children: OrderedMap<String, EntryId>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_child(&self, name: &str) -> Option<EntryId> {
        self.children.find(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.exists(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, EntryId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Child names in name order.
    pub fn names(&self) -> Sequence<&str> {
        self.children.keys().into_iter().map(String::as_str).collect()
    }

    /// Layout of the underlying index, one `name:handle` node per line.
    pub fn render(&self) -> String {
        self.children.render(|name, id| format!("{}:{}", name, id))
    }

    pub(crate) fn insert(&mut self, name: String, id: EntryId) -> Option<EntryId> {
        self.children.insert(name, id)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<EntryId> {
        self.children.delete(name)
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone)]
pub enum Node {
    Directory(Directory),
    File(File),
}

/// A named node in the tree.
///
/// An entry built with [`Entry::directory`] or [`Entry::file`] belongs to the
/// caller until it is handed to
/// [`Filesystem::attach_child`](crate::Filesystem::attach_child).
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    pub(crate) parent: Option<EntryId>,
    meta: Metadata,
    node: Node,
}

impl Entry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        match kind {
            EntryKind::Directory => Self::directory(name),
            EntryKind::File => Self::file(name),
        }
    }

    /// Empty directory with mode 0o755.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            meta: Metadata::new(FileMode::DEFAULT_DIR),
            node: Node::Directory(Directory::new()),
        }
    }

    /// Empty file with mode 0o444.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            meta: Metadata::new(FileMode::DEFAULT_FILE),
            node: Node::File(File::new()),
        }
    }

    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.meta.uid = uid;
        self.meta.gid = gid;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<FileMode>) -> Self {
        self.meta.mode = mode.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        match self.node {
            Node::Directory(_) => EntryKind::Directory,
            Node::File(_) => EntryKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.node, Node::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.node, Node::File(_))
    }

    /// The directory this entry is attached to; `None` for the root and for
    /// entries not yet attached.
    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    /// Byte size: the buffer length for files, [`DIRECTORY_SIZE`] for
    /// directories.
    pub fn size(&self) -> u64 {
        match &self.node {
            Node::Directory(_) => DIRECTORY_SIZE,
            Node::File(file) => file.len() as u64,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn as_dir(&self) -> Option<&Directory> {
        match &self.node {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut Directory> {
        match &mut self.node {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match &self.node {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut File> {
        match &mut self.node {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }
}
