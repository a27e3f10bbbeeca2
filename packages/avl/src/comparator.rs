//! Key ordering for [`OrderedMap`](crate::OrderedMap).

use std::cmp::Ordering;

/// Total order over keys.
///
/// Implementations must be a strict weak order. An inconsistent comparator
/// leaves the map's structure unspecified (lookups may miss) but never
/// unsafe.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Adapts a closure into a [`Comparator`].
///
/// ```rust
/// use kfs_avl::{CompareFn, OrderedMap};
///
/// let mut map = OrderedMap::with_comparator(CompareFn(|a: &i32, b: &i32| b.cmp(a)));
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.nth(0), Some((&2, &"two")));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompareFn<F>(pub F);

impl<K: ?Sized, F> Comparator<K> for CompareFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        (self.0)(lhs, rhs)
    }
}
