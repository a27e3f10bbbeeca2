//! AVL-balanced ordered map.
//!
//! Every node carries its height and the size of its subtree. Heights keep
//! the tree balanced; sizes give O(log n) order statistics (`nth`, `rank`).

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::comparator::{Comparator, NaturalOrder};
use crate::sequence::Sequence;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    height: usize,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            height: 1,
            size: 1,
            left: None,
            right: None,
        })
    }

    /// Recompute height and size from the children.
    fn update(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
        self.size = size(&self.left) + size(&self.right) + 1;
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            node.update();
            pivot.right = Some(node);
            pivot.update();
            pivot
        }
        None => node,
    }
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            node.update();
            pivot.left = Some(node);
            pivot.update();
            pivot
        }
        None => node,
    }
}

/// Restore the AVL invariant at `node`, whose children are already balanced
/// and differ in height by at most two.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update();
    let lh = height(&node.left);
    let rh = height(&node.right);

    if lh > rh + 1 {
        if let Some(left) = node.left.take() {
            // left-right case: straighten the zig-zag first
            let left = if height(&left.right) > height(&left.left) {
                rotate_left(left)
            } else {
                left
            };
            node.left = Some(left);
        }
        return rotate_right(node);
    }

    if rh > lh + 1 {
        if let Some(right) = node.right.take() {
            let right = if height(&right.left) > height(&right.right) {
                rotate_right(right)
            } else {
                right
            };
            node.right = Some(right);
        }
        return rotate_left(node);
    }

    node
}

fn insert_at<K, V, C>(link: Link<K, V>, key: K, value: V, cmp: &C) -> (Box<Node<K, V>>, Option<V>)
where
    C: Comparator<K>,
{
    let mut node = match link {
        Some(node) => node,
        None => return (Node::leaf(key, value), None),
    };

    match cmp.compare(&key, &node.key) {
        Ordering::Equal => {
            let old = mem::replace(&mut node.value, value);
            (node, Some(old))
        }
        Ordering::Less => {
            let (child, old) = insert_at(node.left.take(), key, value, cmp);
            node.left = Some(child);
            (rebalance(node), old)
        }
        Ordering::Greater => {
            let (child, old) = insert_at(node.right.take(), key, value, cmp);
            node.right = Some(child);
            (rebalance(node), old)
        }
    }
}

/// Detach the right-most node of the subtree rooted at `node`.
///
/// Returns the remaining subtree (rebalanced) and the detached node.
fn take_max<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.right.take() {
        None => {
            let rest = node.left.take();
            (rest, node)
        }
        Some(right) => {
            let (rest, max) = take_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
    }
}

fn delete_at<K, V, Q, C>(link: Link<K, V>, key: &Q, cmp: &C) -> (Link<K, V>, Option<V>)
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Comparator<Q>,
{
    let mut node = match link {
        Some(node) => node,
        None => return (None, None),
    };

    match cmp.compare(key, node.key.borrow()) {
        Ordering::Less => {
            let (child, removed) = delete_at(node.left.take(), key, cmp);
            node.left = child;
            (Some(rebalance(node)), removed)
        }
        Ordering::Greater => {
            let (child, removed) = delete_at(node.right.take(), key, cmp);
            node.right = child;
            (Some(rebalance(node)), removed)
        }
        Ordering::Equal => {
            let Node {
                value, left, right, ..
            } = *node;

            let replacement = match left {
                None => right,
                Some(left) => {
                    let (rest, mut max) = take_max(left);
                    max.left = rest;
                    max.right = right;
                    Some(rebalance(max))
                }
            };
            (replacement, Some(value))
        }
    }
}

fn render_node<K, V, F>(link: &Link<K, V>, depth: usize, printer: &F, out: &mut String)
where
    F: Fn(&K, &V) -> String,
{
    if let Some(node) = link {
        render_node(&node.left, depth + 1, printer, out);
        out.push_str(&"    ".repeat(depth));
        out.push_str(" <");
        out.push_str(&printer(&node.key, &node.value));
        out.push_str(">\n");
        render_node(&node.right, depth + 1, printer, out);
    }
}

/// An ordered key/value map backed by an AVL tree.
///
/// Keys are ordered by a [`Comparator`]; the default is the key type's `Ord`.
/// Inserting an existing key replaces its value in place and leaves the tree
/// shape untouched.
///
/// # Example
///
/// ```rust
/// use kfs_avl::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("b".to_string(), 2);
/// map.insert("a".to_string(), 1);
///
/// assert_eq!(map.find("a"), Some(&1));
/// assert_eq!(map.keys(), [&"a".to_string(), &"b".to_string()]);
/// assert_eq!(map.nth(1), Some((&"b".to_string(), &2)));
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V, C = NaturalOrder> {
    root: Link<K, V>,
    comparator: C,
}

impl<K, V> OrderedMap<K, V, NaturalOrder> {
    /// Create an empty map ordered by `K: Ord`.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Create an empty map ordered by `comparator`.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            comparator,
        }
    }

    /// Number of entries, read from the root's subtree size.
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    /// The `index`-th smallest entry.
    pub fn nth(&self, index: usize) -> Option<(&K, &V)> {
        let mut index = index;
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            let left_size = size(&node.left);
            match index.cmp(&left_size) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Equal => return Some((&node.key, &node.value)),
                Ordering::Greater => {
                    index -= left_size + 1;
                    current = node.right.as_deref();
                }
            }
        }

        None
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len())
    }

    /// All keys, in order.
    pub fn keys(&self) -> Sequence<&K> {
        let mut keys = Sequence::with_capacity(self.len());
        keys.extend(self.iter().map(|(k, _)| k));
        keys
    }

    /// All values, in key order.
    pub fn values(&self) -> Sequence<&V> {
        let mut values = Sequence::with_capacity(self.len());
        values.extend(self.iter().map(|(_, v)| v));
        values
    }

    /// Dump the tree layout, one node per line, indented four spaces per
    /// level, in key order.
    pub fn render<F>(&self, printer: F) -> String
    where
        F: Fn(&K, &V) -> String,
    {
        let mut out = String::new();
        render_node(&self.root, 0, &printer, &mut out);
        out
    }
}

impl<K, V, C: Comparator<K>> OrderedMap<K, V, C> {
    /// Insert `value` under `key`.
    ///
    /// Returns the previous value if the key was already present; in that
    /// case the tree structure is unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, old) = insert_at(self.root.take(), key, value, &self.comparator);
        self.root = Some(root);
        old
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            match self.comparator.compare(key, node.key.borrow()) {
                Ordering::Equal => return Some(&node.value),
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
            }
        }

        None
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let comparator = &self.comparator;
        let mut current = self.root.as_deref_mut();

        while let Some(node) = current {
            match comparator.compare(key, node.key.borrow()) {
                Ordering::Equal => return Some(&mut node.value),
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
            }
        }

        None
    }

    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.find(key).is_some()
    }

    /// Remove `key` and return its value. Removing an absent key is a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let (root, removed) = delete_at(self.root.take(), key, &self.comparator);
        self.root = root;
        removed
    }

    /// Number of keys strictly less than `key`.
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut rank = 0;
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            match self.comparator.compare(key, node.key.borrow()) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Equal => return rank + size(&node.left),
                Ordering::Greater => {
                    rank += size(&node.left) + 1;
                    current = node.right.as_deref();
                }
            }
        }

        rank
    }
}

impl<K, V> Default for OrderedMap<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`OrderedMap`].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}


#[cfg(test)]
mod proptests {
    use super::tests::check_invariants;
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, u32),
        Delete(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            1 => any::<u8>().prop_map(Op::Delete),
        ]
    }

    proptest! {
        /// Balance and size invariants hold after every operation, and the
        /// map agrees with `BTreeMap` on contents.
        #[test]
        fn prop_matches_btreemap(ops in prop::collection::vec(op(), 0..300)) {
            let mut map = OrderedMap::new();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        prop_assert_eq!(map.insert(k, v), model.insert(k, v));
                    }
                    Op::Delete(k) => {
                        prop_assert_eq!(map.delete(&k), model.remove(&k));
                    }
                }
                check_invariants(&map);
                prop_assert_eq!(map.len(), model.len());
            }

            for k in 0..=u8::MAX {
                prop_assert_eq!(map.find(&k), model.get(&k));
            }
        }

        /// `nth` and `rank` agree with the sorted key order.
        #[test]
        fn prop_order_statistics(keys in prop::collection::btree_set(any::<u16>(), 0..200)) {
            let map: OrderedMap<u16, ()> = keys.iter().map(|&k| (k, ())).collect();
            for (i, k) in keys.iter().enumerate() {
                prop_assert_eq!(map.nth(i).map(|(k, _)| *k), Some(*k));
                prop_assert_eq!(map.rank(k), i);
            }
            prop_assert!(map.nth(keys.len()).is_none());
        }
    }
}
