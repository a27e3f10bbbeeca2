//! POSIX-style permission bits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;

/// Permission bits of an entry (the low 12 bits of a POSIX mode).
///
/// The file type is not stored here; it follows from the entry's kind and is
/// merged in by [`FileMode::with_type`] when attributes are reported.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMode(u32);

impl FileMode {
    /// Mask for the file type bits.
    pub const S_IFMT: u32 = 0o170000;
    /// Regular file.
    pub const S_IFREG: u32 = 0o100000;
    /// Directory.
    pub const S_IFDIR: u32 = 0o040000;

    /// Mask for the permission bits.
    pub const PERMISSION_MASK: u32 = 0o7777;

    /// rwxr-xr-x
    pub const DEFAULT_DIR: Self = Self(0o755);
    /// r--r--r--
    pub const DEFAULT_FILE: Self = Self(0o444);

    /// Build from raw mode bits; anything above the permission bits
    /// (including a file type) is dropped.
    pub const fn new(bits: u32) -> Self {
        Self(bits & Self::PERMISSION_MASK)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The rwx triplet for the owner.
    pub const fn owner(self) -> u32 {
        (self.0 >> 6) & 0o7
    }

    /// The rwx triplet for the group.
    pub const fn group(self) -> u32 {
        (self.0 >> 3) & 0o7
    }

    /// The rwx triplet for everyone else.
    pub const fn other(self) -> u32 {
        self.0 & 0o7
    }

    /// Full mode word with the type bits for `kind`.
    pub const fn with_type(self, kind: EntryKind) -> u32 {
        let file_type = match kind {
            EntryKind::Directory => Self::S_IFDIR,
            EntryKind::File => Self::S_IFREG,
        };
        file_type | self.0
    }

    /// ls-style rendering, e.g. `drwxr-xr-x`.
    pub fn symbolic(self, kind: EntryKind) -> String {
        let prefix = match kind {
            EntryKind::Directory => 'd',
            EntryKind::File => '-',
        };
        format!("{}{}", prefix, self)
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::DEFAULT_FILE
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        Self::new(bits)
    }
}

impl fmt::Debug for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileMode({:#o})", self.0)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for triplet in [self.owner(), self.group(), self.other()] {
            let r = if triplet & 0o4 != 0 { 'r' } else { '-' };
            let w = if triplet & 0o2 != 0 { 'w' } else { '-' };
            let x = if triplet & 0o1 != 0 { 'x' } else { '-' };
            write!(f, "{}{}{}", r, w, x)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplets() {
        let mode = FileMode::new(0o751);
        assert_eq!(mode.owner(), 0o7);
        assert_eq!(mode.group(), 0o5);
        assert_eq!(mode.other(), 0o1);
    }

    #[test]
    fn type_bits_are_stripped_and_restored() {
        let mode = FileMode::new(FileMode::S_IFDIR | 0o755);
        assert_eq!(mode.bits(), 0o755);
        assert_eq!(mode.with_type(EntryKind::Directory), 0o40755);
        assert_eq!(mode.with_type(EntryKind::File), 0o100755);
    }

    #[test]
    fn symbolic_rendering() {
        assert_eq!(
            FileMode::DEFAULT_DIR.symbolic(EntryKind::Directory),
            "drwxr-xr-x"
        );
        assert_eq!(FileMode::DEFAULT_FILE.symbolic(EntryKind::File), "-r--r--r--");
        assert_eq!(FileMode::new(0o640).to_string(), "rw-r-----");
    }
}
