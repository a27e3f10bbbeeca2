//! In-memory hierarchical filesystem.
//!
//! A [`Filesystem`] owns every [`Entry`] in its tree. Directories index their
//! children with an AVL [`OrderedMap`](kfs_avl::OrderedMap); files hold a
//! single byte buffer. Paths are resolved with [`Filesystem::resolve`].
//!
//! ```
//! use kfs_core::{Entry, Filesystem};
//!
//! let mut fs = Filesystem::new();
//! let docs = fs.attach_child(fs.root(), Entry::directory("docs")).unwrap();
//! let note = fs.attach_child(docs, Entry::file("note")).unwrap();
//! fs.write_file(note, b"hi", 0).unwrap();
//!
//! assert_eq!(fs.lookup("/docs/note"), Some(note));
//! assert_eq!(fs.read_file(note).unwrap().data, b"hi");
//! ```

mod content;
mod entry;
mod error;
mod fs;
mod mode;
mod resolve;

pub use content::{Contents, File};
pub use entry::{
    Directory, Entry, EntryId, EntryKind, Metadata, Node, DIRECTORY_SIZE, ROOT_NAME,
};
pub use error::{FsError, Result};
pub use fs::Filesystem;
pub use mode::FileMode;
pub use resolve::split_parent;
