//! Filesystem and current directory for the shell.
//!
//! The tree itself keeps no notion of a working directory; the shell tracks
//! one here and resolves relative paths against it.

use std::path::Path;

use chrono::{DateTime, Utc};
use kfs_avl::Sequence;
use kfs_bridge::Credentials;
use kfs_core::{Entry, EntryId, EntryKind, Filesystem, FsError, Result, ROOT_NAME};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ShellError;

/// Attributes shown by `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub path: String,
    pub kind: EntryKind,
    /// Octal permission bits, e.g. `0755`.
    pub mode: String,
    /// ls-style rendering, e.g. `drwxr-xr-x`.
    pub permissions: String,
    pub size: u64,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub atime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
}

/// Manages the shell's filesystem and current directory.
#[derive(Debug)]
pub struct ShellContext {
    fs: Filesystem,
    cwd: EntryId,
    owner: Credentials,
}

impl ShellContext {
    /// A fresh tree owned by uid/gid 0, positioned at the root.
    pub fn new() -> Self {
        Self::with_owner(Credentials::new(0, 0))
    }

    /// A fresh tree whose root and new entries belong to `owner`.
    pub fn with_owner(owner: Credentials) -> Self {
        let fs = Filesystem::with_root_owner(owner.uid, owner.gid);
        let cwd = fs.root();
        Self { fs, cwd, owner }
    }

    pub fn fs(&self) -> &Filesystem {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut Filesystem {
        &mut self.fs
    }

    pub fn owner(&self) -> Credentials {
        self.owner
    }

    pub fn cwd(&self) -> EntryId {
        self.cwd
    }

    /// Absolute path of the current directory.
    pub fn current_path(&self) -> String {
        self.fs
            .reconstruct_path(self.cwd)
            .unwrap_or_else(|_| ROOT_NAME.to_string())
    }

    /// Resolve `path` from the root when absolute, else from the current
    /// directory.
    pub fn resolve_path(&self, path: &str) -> Option<EntryId> {
        if path.starts_with('/') {
            self.fs.lookup(path)
        } else {
            self.fs.resolve(self.cwd, path)
        }
    }

    /// Move the current directory. `None` goes to the root and `..` to the
    /// parent, staying put at the root.
    pub fn change_dir(&mut self, target: Option<&str>) -> Result<()> {
        let next = match target {
            None | Some("") => self.fs.root(),
            Some(".") => self.cwd,
            Some("..") => self.fs.parent(self.cwd).unwrap_or(self.cwd),
            Some(path) => self.require(path)?,
        };
        self.fs.dir(next)?;
        self.cwd = next;
        Ok(())
    }

    /// Create a directory or file named `name` in the current directory.
    pub fn make(&mut self, name: &str, kind: EntryKind) -> Result<EntryId> {
        self.ensure_absent(name)?;
        let entry = Entry::new(name, kind).with_owner(self.owner.uid, self.owner.gid);
        self.fs.attach_child(self.cwd, entry)
    }

    /// Remove the child `name` of the current directory and everything below
    /// it.
    pub fn remove(&mut self, name: &str) -> Result<usize> {
        match self.fs.detach(self.cwd, name)? {
            0 => Err(FsError::not_found(self.child_path(name))),
            freed => Ok(freed),
        }
    }

    /// Child names of `path` (default: the current directory) with `.` and
    /// `..`; a file lists as its own name.
    pub fn list(&self, path: Option<&str>) -> Result<Sequence<String>> {
        let id = match path {
            Some(path) => self.require(path)?,
            None => self.cwd,
        };
        match self.fs.entry(id) {
            Some(entry) if entry.is_file() => Ok(vec![entry.name().to_string()].into()),
            _ => self.fs.list_children(id),
        }
    }

    /// Recursive listing of the current directory.
    pub fn tree(&self) -> Result<Sequence<String>> {
        self.fs.list_tree(self.cwd)
    }

    /// File contents as text, replacing invalid UTF-8.
    pub fn read_text(&self, path: &str) -> Result<String> {
        let id = self.require(path)?;
        Ok(self.fs.read_file(id)?.to_string_lossy())
    }

    /// Write `text` to the file at `path`, creating it when absent. With
    /// `append` the text goes after the current end, otherwise it replaces
    /// the contents.
    pub fn write_text(&mut self, path: &str, text: &str, append: bool) -> Result<usize> {
        let id = match self.resolve_path(path) {
            Some(id) => id,
            None => {
                let (parent, name) = self.split_target(path)?;
                let entry = Entry::file(name).with_owner(self.owner.uid, self.owner.gid);
                let id = self.fs.attach_child(parent, entry)?;
                debug!(path, "created file on write");
                id
            }
        };

        let offset = if append { self.fs.file(id)?.len() } else { 0 };
        self.fs.write_file(id, text.as_bytes(), offset)
    }

    pub fn stat(&self, path: &str) -> Result<Stat> {
        let id = self.require(path)?;
        let entry = self
            .fs
            .entry(id)
            .ok_or_else(|| FsError::not_found(path))?;
        let meta = entry.metadata();
        Ok(Stat {
            path: self.fs.reconstruct_path(id)?,
            kind: entry.kind(),
            mode: format!("{:04o}", meta.mode.bits()),
            permissions: meta.mode.symbolic(entry.kind()),
            size: entry.size(),
            nlink: meta.nlink,
            uid: meta.uid,
            gid: meta.gid,
            atime: meta.atime,
            mtime: meta.mtime,
        })
    }

    /// Layout of the current directory's child index.
    pub fn index(&self) -> Result<String> {
        Ok(self.fs.dir(self.cwd)?.render())
    }

    /// Copy a host file into the current directory as `name`.
    pub fn import_host_file(&mut self, source: &Path, name: &str) -> Result<EntryId, ShellError> {
        self.ensure_absent(name)?;
        let data = std::fs::read(source).map_err(|source_err| ShellError::HostRead {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let id = self.make(name, EntryKind::File)?;
        self.fs.write_file(id, &data, 0)?;

        info!(
            source = %source.display(),
            name,
            bytes = data.len(),
            "imported host file"
        );
        Ok(id)
    }

    /// Import a host file under its own file name.
    pub fn import_host_file_named(&mut self, source: &Path) -> Result<EntryId, ShellError> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FsError::invalid(format!("no file name in {}", source.display())))?
            .to_string();
        self.import_host_file(source, &name)
    }

    fn require(&self, path: &str) -> Result<EntryId> {
        self.resolve_path(path)
            .ok_or_else(|| FsError::not_found(path))
    }

    fn ensure_absent(&self, name: &str) -> Result<()> {
        if self.fs.find_child(self.cwd, name)?.is_some() {
            return Err(FsError::AlreadyExists {
                path: self.child_path(name),
            });
        }
        Ok(())
    }

    fn child_path(&self, name: &str) -> String {
        let cwd = self.current_path();
        if cwd.ends_with('/') {
            format!("{}{}", cwd, name)
        } else {
            format!("{}/{}", cwd, name)
        }
    }

    /// Parent directory and final name for a path that does not exist yet.
    fn split_target<'a>(&self, path: &'a str) -> Result<(EntryId, &'a str)> {
        match path.rsplit_once('/') {
            None => Ok((self.cwd, path)),
            Some(("", name)) => Ok((self.fs.root(), name)),
            Some((parent, name)) => Ok((self.require(parent)?, name)),
        }
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn context() -> ShellContext {
        let mut ctx = ShellContext::new();
        ctx.make("a", EntryKind::Directory).unwrap();
        ctx.change_dir(Some("a")).unwrap();
        ctx.make("b", EntryKind::File).unwrap();
        ctx
    }

    #[test]
    fn starts_at_root() {
        let ctx = ShellContext::new();
        assert_eq!(ctx.current_path(), "/");
        assert_eq!(ctx.cwd(), ctx.fs().root());
    }

    #[test]
    fn make_refuses_existing_name() {
        let mut ctx = context();
        let err = ctx.make("b", EntryKind::Directory).unwrap_err();
        assert_eq!(
            err,
            FsError::AlreadyExists {
                path: "/a/b".to_string()
            }
        );
    }

    #[test]
    fn change_dir_variants() {
        let mut ctx = context();
        assert_eq!(ctx.current_path(), "/a");

        ctx.change_dir(Some("..")).unwrap();
        assert_eq!(ctx.current_path(), "/");
        ctx.change_dir(Some("..")).unwrap();
        assert_eq!(ctx.current_path(), "/");

        ctx.change_dir(Some("/a")).unwrap();
        assert_eq!(ctx.current_path(), "/a");
        ctx.change_dir(None).unwrap();
        assert_eq!(ctx.current_path(), "/");
    }

    #[test]
    fn change_dir_into_file_fails() {
        let mut ctx = context();
        assert!(matches!(
            ctx.change_dir(Some("b")),
            Err(FsError::NotADirectory { .. })
        ));
        assert!(matches!(
            ctx.change_dir(Some("missing")),
            Err(FsError::NotFound { .. })
        ));
        assert_eq!(ctx.current_path(), "/a");
    }

    #[test]
    fn list_defaults_to_cwd() {
        let ctx = context();
        assert_eq!(ctx.list(None).unwrap(), [".", "..", "b"]);
        assert_eq!(ctx.list(Some("/")).unwrap(), [".", "..", "a"]);
        assert_eq!(ctx.list(Some("b")).unwrap(), ["b"]);
    }

    #[test]
    fn write_append_read() {
        let mut ctx = context();
        assert_eq!(ctx.write_text("b", "hello", false).unwrap(), 5);
        ctx.write_text("b", " world", true).unwrap();
        assert_eq!(ctx.read_text("b").unwrap(), "hello world");

        ctx.write_text("b", "bye", false).unwrap();
        assert_eq!(ctx.read_text("/a/b").unwrap(), "bye");
    }

    #[test]
    fn write_creates_missing_file() {
        let mut ctx = context();
        ctx.write_text("new", "x", false).unwrap();
        ctx.write_text("/top", "y", false).unwrap();
        assert_eq!(ctx.read_text("/a/new").unwrap(), "x");
        assert_eq!(ctx.read_text("/top").unwrap(), "y");
        assert!(ctx.write_text("/nope/f", "z", false).is_err());
    }

    #[test]
    fn remove_child() {
        let mut ctx = context();
        assert_eq!(ctx.remove("b").unwrap(), 1);
        assert!(ctx.resolve_path("b").is_none());
        assert!(matches!(ctx.remove("b"), Err(FsError::NotFound { .. })));
    }

    #[test]
    fn stat_reports_attributes() {
        let ctx = context();
        let stat = ctx.stat("/a").unwrap();
        assert_eq!(stat.path, "/a");
        assert_eq!(stat.kind, EntryKind::Directory);
        assert_eq!(stat.mode, "0755");
        assert_eq!(stat.permissions, "drwxr-xr-x");
        assert_eq!(stat.size, 4096);

        let stat = ctx.stat("b").unwrap();
        assert_eq!(stat.permissions, "-r--r--r--");
        assert_eq!(stat.size, 0);
    }

    #[test]
    fn tree_from_cwd() {
        let mut ctx = context();
        ctx.make("c", EntryKind::Directory).unwrap();
        assert_eq!(ctx.tree().unwrap(), ["a", "a/b", "a/c"]);
    }

    #[test]
    fn index_renders_children() {
        let ctx = context();
        assert!(ctx.index().unwrap().contains("<b:#"));
    }

    #[test]
    fn import_copies_host_bytes() {
        let mut host_file = tempfile::NamedTempFile::new().unwrap();
        host_file.write_all(b"from host").unwrap();

        let mut ctx = context();
        ctx.import_host_file(host_file.path(), "copy").unwrap();
        assert_eq!(ctx.read_text("copy").unwrap(), "from host");

        let err = ctx.import_host_file(host_file.path(), "copy").unwrap_err();
        assert!(matches!(err, ShellError::Fs(FsError::AlreadyExists { .. })));
    }

    #[test]
    fn import_missing_host_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context();
        let err = ctx
            .import_host_file(&dir.path().join("absent"), "x")
            .unwrap_err();
        assert!(matches!(err, ShellError::HostRead { .. }));
        assert!(ctx.resolve_path("x").is_none());
    }

    #[test]
    fn import_uses_host_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "n").unwrap();

        let mut ctx = ShellContext::new();
        ctx.import_host_file_named(&path).unwrap();
        assert_eq!(ctx.read_text("/notes.txt").unwrap(), "n");
    }
}
