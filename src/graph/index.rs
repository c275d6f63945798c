//! Type-safe dense integer indices into the symbol graph's arenas, plus a
//! bitset-backed `IndexSet` used for visited-node tracking during
//! traversal (transitive `superclass` BFS in particular).

use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;
use std::marker::PhantomData;

use bit_set::{self, BitSet};
use holyhashmap::EntryIndex;
use serde::{Deserialize, Serialize};

pub trait Index: Copy + Clone + Eq + PartialEq + Hash + From<usize> + Into<usize> {}

impl Index for usize {}

/// A type-safe node index. Nodes live in a `HolyHashMap` keyed by symbol
/// id, so this wraps the map's own dense entry index rather than
/// allocating a second one.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeIndex(EntryIndex);

impl From<EntryIndex> for NodeIndex {
    fn from(index: EntryIndex) -> Self {
        NodeIndex(index)
    }
}

impl From<usize> for NodeIndex {
    fn from(index: usize) -> Self {
        NodeIndex(index.into())
    }
}

impl Into<EntryIndex> for NodeIndex {
    fn into(self) -> EntryIndex {
        self.0
    }
}

impl Into<usize> for NodeIndex {
    fn into(self) -> usize {
        self.0.into()
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Index for NodeIndex {}

/// A type-safe edge index. Edges are stored in a plain arena (`Vec<Edge>`)
/// since a symbol graph is a multigraph and there's no unique `(a, b)`
/// key to hash on the way node indices have one.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(usize);

impl From<usize> for EdgeIndex {
    fn from(index: usize) -> Self {
        EdgeIndex(index)
    }
}

impl Into<usize> for EdgeIndex {
    fn into(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Index for EdgeIndex {}

/// A set of indices stored as a bitset, used in place of a `HashSet` for
/// the visited-set in worklist traversals over the graph.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct IndexSet<T> {
    set: BitSet,
    phantom: PhantomData<T>,
}

impl<T> Default for IndexSet<T> {
    #[inline]
    fn default() -> Self {
        IndexSet {
            set: BitSet::new(),
            phantom: PhantomData,
        }
    }
}

impl<T> IndexSet<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(nbits: usize) -> Self {
        IndexSet {
            set: BitSet::with_capacity(nbits),
            phantom: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.set.clear()
    }
}

impl<T> IndexSet<T>
where
    T: Index,
{
    #[inline]
    pub fn iter(&self) -> IndexSetIter<'_, T> {
        IndexSetIter {
            iter: self.set.iter(),
            phantom: PhantomData,
        }
    }

    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.set.contains((*value).into())
    }

    /// Inserts a value, returning `true` if it wasn't already present.
    #[inline]
    pub fn insert(&mut self, value: T) -> bool {
        self.set.insert(value.into())
    }

    #[inline]
    pub fn remove(&mut self, value: &T) -> bool {
        self.set.remove((*value).into())
    }
}

impl<T> FromIterator<T> for IndexSet<T>
where
    T: Index,
{
    #[inline]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut ret = Self::default();
        ret.extend(iter);
        ret
    }
}

impl<T> Extend<T> for IndexSet<T>
where
    T: Index,
{
    #[inline]
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.set.extend(iter.into_iter().map(T::into))
    }
}

impl<'a, T> IntoIterator for &'a IndexSet<T>
where
    T: Index,
{
    type Item = T;
    type IntoIter = IndexSetIter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IndexSetIter<'a, T> {
    iter: bit_set::Iter<'a, u32>,
    phantom: PhantomData<T>,
}

impl<'a, T> Iterator for IndexSetIter<'a, T>
where
    T: Index,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(T::from)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_set_basic() {
        let mut set: IndexSet<NodeIndex> = IndexSet::new();
        let a: NodeIndex = 0usize.into();
        let b: NodeIndex = 1usize.into();

        assert!(set.insert(a));
        assert!(!set.insert(a));
        assert!(!set.contains(&b));
        assert_eq!(set.len(), 1);

        set.insert(b);
        let mut seen: Vec<usize> = set.iter().map(Into::into).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1]);
    }
}
