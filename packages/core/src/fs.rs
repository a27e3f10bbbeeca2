//! The entry arena and the tree operations over it.

use std::collections::HashMap;

use kfs_avl::Sequence;
use tracing::debug;

use crate::content::{Contents, File};
use crate::entry::{Directory, Entry, EntryId, ROOT_NAME};
use crate::error::{FsError, Result};

/// One in-memory filesystem tree.
///
/// Entries are stored in an arena keyed by [`EntryId`]. A directory's index
/// maps child names to handles and each entry records its parent handle, so
/// every entry has exactly one owner: the arena.
#[derive(Debug, Clone)]
pub struct Filesystem {
    entries: HashMap<EntryId, Entry>,
    root: EntryId,
    next_id: u64,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem {
    /// A tree holding only the root directory `/`, owned by uid/gid 0.
    pub fn new() -> Self {
        Self::with_root_owner(0, 0)
    }

    pub fn with_root_owner(uid: u32, gid: u32) -> Self {
        let root = EntryId(0);
        let mut entries = HashMap::new();
        entries.insert(root, Entry::directory(ROOT_NAME).with_owner(uid, gid));
        Self {
            entries,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> EntryId {
        self.root
    }

    /// Number of live entries, root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.entries.get(&id).and_then(Entry::parent)
    }

    /// Directory payload of `id`.
    pub fn dir(&self, id: EntryId) -> Result<&Directory> {
        let entry = self.get(id)?;
        entry
            .as_dir()
            .ok_or_else(|| FsError::NotADirectory { path: self.path_of(id) })
    }

    /// File payload of `id`.
    pub fn file(&self, id: EntryId) -> Result<&File> {
        let entry = self.get(id)?;
        entry
            .as_file()
            .ok_or_else(|| FsError::NotAFile { path: self.path_of(id) })
    }

    /// Move `child` into the tree under the directory `parent`.
    ///
    /// A child with the same name is replaced and its subtree freed; callers
    /// that must not overwrite check with [`find_child`](Self::find_child)
    /// first.
    pub fn attach_child(&mut self, parent: EntryId, mut child: Entry) -> Result<EntryId> {
        if child.name().is_empty() || child.name().contains('/') {
            return Err(FsError::invalid(format!(
                "entry name {:?} must be non-empty and contain no '/'",
                child.name()
            )));
        }
        self.dir(parent)?;

        let id = EntryId(self.next_id);
        self.next_id += 1;
        child.parent = Some(parent);
        let name = child.name().to_string();

        let replaced = self.dir_mut(parent)?.insert(name.clone(), id);
        self.entries.insert(id, child);
        if let Some(old) = replaced {
            let freed = self.free(old);
            debug!(name = %name, freed, "replaced existing child");
        }
        self.touch(parent);

        debug!(parent = %parent, child = %id, name = %name, "attached entry");
        Ok(id)
    }

    /// Remove `name` from the directory `parent` and free its subtree.
    ///
    /// Returns how many entries were released; 0 when no such child exists.
    pub fn detach(&mut self, parent: EntryId, name: &str) -> Result<usize> {
        let removed = self.dir_mut(parent)?.remove(name);
        let freed = match removed {
            Some(child) => {
                self.touch(parent);
                self.free(child)
            }
            None => 0,
        };

        debug!(parent = %parent, name, freed, "detached entry");
        Ok(freed)
    }

    pub fn find_child(&self, dir: EntryId, name: &str) -> Result<Option<EntryId>> {
        Ok(self.dir(dir)?.find_child(name))
    }

    /// `.` and `..` followed by the child names in order.
    pub fn list_children(&self, dir: EntryId) -> Result<Sequence<String>> {
        let dir = self.dir(dir)?;
        let mut names = Sequence::with_capacity(dir.len() + 2);
        names.push(".".to_string());
        names.push("..".to_string());
        names.extend(dir.iter().map(|(name, _)| name.to_string()));
        Ok(names)
    }

    /// Depth-first listing: the entry's own name, then the path of every
    /// descendant relative to it.
    pub fn list_tree(&self, id: EntryId) -> Result<Sequence<String>> {
        let entry = self.get(id)?;
        let mut paths = Sequence::new();
        paths.push(entry.name().to_string());
        self.collect_tree(entry, entry.name(), &mut paths);
        Ok(paths)
    }

    fn collect_tree(&self, entry: &Entry, prefix: &str, paths: &mut Sequence<String>) {
        let Some(dir) = entry.as_dir() else {
            return;
        };
        for (name, child_id) in dir.iter() {
            let path = join_path(prefix, name);
            paths.push(path.clone());
            if let Some(child) = self.entries.get(&child_id) {
                self.collect_tree(child, &path, paths);
            }
        }
    }

    /// Absolute path of `id`, built by walking parent links.
    pub fn reconstruct_path(&self, id: EntryId) -> Result<String> {
        self.get(id)?;
        Ok(self.path_of(id))
    }

    /// Write `buf` into the file `id` at `offset`, updating its modify time.
    pub fn write_file(&mut self, id: EntryId, buf: &[u8], offset: usize) -> Result<usize> {
        let written = self.file_mut(id)?.write(buf, offset)?;
        self.touch(id);
        Ok(written)
    }

    pub fn read_file(&self, id: EntryId) -> Result<Contents<'_>> {
        Ok(self.file(id)?.read())
    }

    pub fn truncate_file(&mut self, id: EntryId, size: usize) -> Result<()> {
        self.file_mut(id)?.truncate(size);
        self.touch(id);
        Ok(())
    }

    fn get(&self, id: EntryId) -> Result<&Entry> {
        self.entries
            .get(&id)
            .ok_or_else(|| FsError::invalid(format!("unknown entry {}", id)))
    }

    fn get_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| FsError::invalid(format!("unknown entry {}", id)))
    }

    fn dir_mut(&mut self, id: EntryId) -> Result<&mut Directory> {
        if !self.get(id)?.is_dir() {
            return Err(FsError::NotADirectory { path: self.path_of(id) });
        }
        self.get_mut(id)?
            .as_dir_mut()
            .ok_or_else(|| FsError::invalid(format!("entry {} changed kind", id)))
    }

    fn file_mut(&mut self, id: EntryId) -> Result<&mut File> {
        if !self.get(id)?.is_file() {
            return Err(FsError::NotAFile { path: self.path_of(id) });
        }
        self.get_mut(id)?
            .as_file_mut()
            .ok_or_else(|| FsError::invalid(format!("entry {} changed kind", id)))
    }

    fn touch(&mut self, id: EntryId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.metadata_mut().touch();
        }
    }

    /// Remove `id` and everything below it from the arena.
    fn free(&mut self, id: EntryId) -> usize {
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            if let Some(entry) = self.entries.remove(&next) {
                freed += 1;
                if let Some(dir) = entry.as_dir() {
                    stack.extend(dir.iter().map(|(_, child)| child));
                }
            }
        }
        freed
    }

    /// Names from the top-most ancestor down to `id`, joined with `/`.
    fn path_of(&self, id: EntryId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(next) = current {
            match self.entries.get(&next) {
                Some(entry) => {
                    names.push(entry.name());
                    current = entry.parent();
                }
                None => break,
            }
        }
        names.reverse();

        match names.split_first() {
            Some((&ROOT_NAME, [])) => ROOT_NAME.to_string(),
            Some((&ROOT_NAME, rest)) => format!("/{}", rest.join("/")),
            _ => names.join("/"),
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.ends_with('/') {
        format!("{}{}", prefix, name)
    } else {
        format!("{}/{}", prefix, name)
    }
}
