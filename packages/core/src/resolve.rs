//! Path resolution.

use tracing::trace;

use crate::entry::{EntryId, Node, ROOT_NAME};
use crate::fs::Filesystem;

impl Filesystem {
    /// Resolve `path` starting at `start`.
    ///
    /// `"/"` resolves only when `start` itself is the root directory. Otherwise
    /// one leading `/` is stripped and the remaining segments are walked one
    /// child at a time. A file ends the walk: as the last segment it matches
    /// only its own name, anywhere else it makes the path unresolvable. Empty
    /// segments (from `//` or a trailing `/`) never match.
    ///
    /// Resolution never fails with an error and never touches timestamps.
    pub fn resolve(&self, start: EntryId, path: &str) -> Option<EntryId> {
        let found = self.walk(start, path);
        trace!(start = %start, path, found = ?found, "resolved path");
        found
    }

    /// Resolve `path` from the root.
    pub fn lookup(&self, path: &str) -> Option<EntryId> {
        self.resolve(self.root(), path)
    }

    fn walk(&self, start: EntryId, path: &str) -> Option<EntryId> {
        let start_entry = self.entry(start)?;
        if path == ROOT_NAME {
            return (start_entry.name() == ROOT_NAME).then_some(start);
        }

        let relative = if path.len() > 1 {
            path.strip_prefix('/').unwrap_or(path)
        } else {
            path
        };

        let mut current = start;
        let mut segments = relative.split('/').peekable();
        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();
            let entry = self.entry(current)?;
            match entry.node() {
                Node::File(_) if last => {
                    return (entry.name() == segment).then_some(current);
                }
                Node::File(_) => return None,
                Node::Directory(dir) => {
                    current = dir.find_child(segment)?;
                }
            }
        }

        Some(current)
    }
}

/// Split an absolute path into its parent path and last component.
///
/// `"/a/b"` gives `("/a", "b")` and `"/a"` gives `("/", "a")`. Returns `None`
/// for the root itself or for a path without a `/`.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let trimmed = if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };
    let index = trimmed.rfind('/')?;
    let name = &trimmed[index + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if index == 0 { ROOT_NAME } else { &trimmed[..index] };
    Some((parent, name))
}
