use std::collections::HashSet;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::term::GoTermId;
use crate::DEFAULT_NUM_PARENTS;

/// A set of [`GoTermId`]s
///
/// Each term can occur only once in the group and the ids are always kept
/// in ascending order, so iterating a group is deterministic.
///
/// This group is used e.g. for the `is_a` parents of a term, the terms a
/// symbol is annotated with, or the node set of a query subgraph.
///
/// # Examples
///
/// ```
/// use genescape::{GoTermId, TermGroup};
///
/// let mut group = TermGroup::new();
/// group.insert(GoTermId::from(8150u32));
/// group.insert(GoTermId::from(3674u32));
/// assert!(!group.insert(GoTermId::from(8150u32)));
///
/// let ids: Vec<String> = group.iter().map(|id| id.to_string()).collect();
/// assert_eq!(ids, vec!["GO:0003674", "GO:0008150"]);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct TermGroup {
    ids: SmallVec<[GoTermId; DEFAULT_NUM_PARENTS]>,
}

impl TermGroup {
    /// Constructs a new, empty [`TermGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`TermGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SmallVec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`GoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`GoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`GoTermId`] to the group
    ///
    /// Returns whether the `GoTermId` was newly inserted.
    pub fn insert(&mut self, id: GoTermId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Appends an id without checking order or uniqueness
    ///
    /// Callers must push in strictly ascending order.
    fn insert_unchecked(&mut self, id: GoTermId) {
        self.ids.push(id);
    }

    /// Builds a group from ids in arbitrary order, with duplicates
    ///
    /// Sorting and deduplication happen once, after all ids are collected.
    pub fn from_unsorted(mut ids: Vec<GoTermId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self {
            ids: SmallVec::from_vec(ids),
        }
    }

    /// Returns `true` if the group contains the [`GoTermId`]
    pub fn contains(&self, id: &GoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Removes the [`GoTermId`] from the group
    ///
    /// Returns whether the id was present.
    pub fn remove(&mut self, id: &GoTermId) -> bool {
        match self.ids.binary_search(id) {
            Ok(idx) => {
                self.ids.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns an Iterator of the [`GoTermId`]s inside the group
    pub fn iter(&self) -> GoTermIds<'_> {
        GoTermIds::new(self.ids.iter())
    }

    /// Returns the ids as a slice, in ascending order
    pub fn as_slice(&self) -> &[GoTermId] {
        &self.ids
    }
}

impl FromIterator<GoTermId> for TermGroup {
    fn from_iter<T: IntoIterator<Item = GoTermId>>(iter: T) -> Self {
        TermGroup::from_unsorted(iter.into_iter().collect())
    }
}

impl From<Vec<GoTermId>> for TermGroup {
    fn from(ids: Vec<GoTermId>) -> Self {
        TermGroup::from_unsorted(ids)
    }
}

impl From<HashSet<GoTermId>> for TermGroup {
    fn from(s: HashSet<GoTermId>) -> Self {
        s.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a TermGroup {
    type Item = GoTermId;
    type IntoIter = GoTermIds<'a>;

    fn into_iter(self) -> GoTermIds<'a> {
        GoTermIds::new(self.ids.iter())
    }
}

/// An iterator over [`GoTermId`]s
pub struct GoTermIds<'a> {
    inner: std::slice::Iter<'a, GoTermId>,
}

impl<'a> GoTermIds<'a> {
    fn new(inner: std::slice::Iter<'a, GoTermId>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for GoTermIds<'a> {
    type Item = GoTermId;
    fn next(&mut self) -> Option<GoTermId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl BitOr for &TermGroup {
    type Output = TermGroup;

    fn bitor(self, rhs: &TermGroup) -> TermGroup {
        let mut group = TermGroup::with_capacity(self.len() + rhs.len());
        let mut lhs = self.ids.iter().peekable();
        let mut rhs = rhs.ids.iter().peekable();
        loop {
            match (lhs.peek(), rhs.peek()) {
                (Some(l), Some(r)) => {
                    if l < r {
                        group.insert_unchecked(**l);
                        lhs.next();
                    } else if r < l {
                        group.insert_unchecked(**r);
                        rhs.next();
                    } else {
                        group.insert_unchecked(**l);
                        lhs.next();
                        rhs.next();
                    }
                }
                (Some(l), None) => {
                    group.insert_unchecked(**l);
                    lhs.next();
                }
                (None, Some(r)) => {
                    group.insert_unchecked(**r);
                    rhs.next();
                }
                (None, None) => break,
            }
        }
        group
    }
}

impl BitAnd for &TermGroup {
    type Output = TermGroup;

    fn bitand(self, rhs: &TermGroup) -> TermGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut group = TermGroup::with_capacity(small.len());
        for id in &small.ids {
            if large.contains(id) {
                group.insert_unchecked(*id);
            }
        }
        group
    }
}

impl Serialize for TermGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter())
    }
}

impl<'de> Deserialize<'de> for TermGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<GoTermId>::deserialize(deserializer)?;
        Ok(TermGroup::from_unsorted(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[u32]) -> TermGroup {
        ids.iter().map(|id| GoTermId::from(*id)).collect()
    }

    #[test]
    fn test_group_iter() {
        let group = group(&[3, 1, 2, 1]);
        let ids: Vec<u32> = group.iter().map(|id| id.as_u32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut group = TermGroup::new();
        assert!(group.insert(5u32.into()));
        assert!(group.insert(2u32.into()));
        assert!(!group.insert(5u32.into()));
        assert_eq!(group.len(), 2);
        assert!(group.remove(&5u32.into()));
        assert!(!group.remove(&5u32.into()));
        assert_eq!(group.as_slice(), &[GoTermId::from(2u32)]);
    }

    #[test]
    fn test_bitor() {
        let result = &group(&[1, 2, 3]) | &group(&[2, 4, 5]);
        assert_eq!(result, group(&[1, 2, 3, 4, 5]));

        let result = &TermGroup::new() | &group(&[7]);
        assert_eq!(result, group(&[7]));
    }

    #[test]
    fn test_bitand() {
        let result = &group(&[1, 2, 3]) & &group(&[2, 4, 5, 1]);
        assert_eq!(result, group(&[1, 2]));

        let result = &group(&[1, 2, 3]) & &TermGroup::new();
        assert!(result.is_empty());
    }

    #[test]
    fn test_serde_roundtrip_sorts() {
        let parsed: TermGroup =
            serde_json::from_str(r#"["GO:0000003", "GO:0000001", "GO:0000003"]"#).unwrap();
        assert_eq!(parsed, group(&[1, 3]));
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"["GO:0000001","GO:0000003"]"#
        );
    }
}
