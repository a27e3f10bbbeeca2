//! Ordered collections for KFS.
//!
//! - `OrderedMap`: AVL-balanced key/value map with subtree sizes, used to
//!   index each directory's children by name
//! - `Sequence`: growable list that traversals and listings collect into
//!
//! Both are plain single-threaded data structures. Callers sharing one across
//! threads wrap it (or whatever owns it) in a lock.

mod comparator;
mod map;
mod sequence;

pub use comparator::{CompareFn, Comparator, NaturalOrder};
pub use map::{Iter, OrderedMap};
pub use sequence::{Sequence, DEFAULT_CAPACITY};
