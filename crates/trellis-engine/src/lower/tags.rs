//! Tag name allocation.

use indexmap::IndexMap;
use trellis_common::types::TagId;

/// Injective name to [`TagId`] mapping for one top-level lowering pass.
///
/// Ids are dense and assigned in first-use order. Anonymous tags from
/// [`TagAllocator::fresh`] share the id space but have no name.
#[derive(Debug, Default)]
pub struct TagAllocator {
    ids: IndexMap<String, TagId>,
    next: u32,
}

impl TagAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `name`, allocating one on first use.
    pub fn alloc(&mut self, name: &str) -> TagId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.next_id();
        self.ids.insert(name.to_string(), id);
        tracing::trace!(tag = name, id = %id, "allocated tag");
        id
    }

    /// Allocates an anonymous tag that no name maps to.
    pub fn fresh(&mut self) -> TagId {
        let id = self.next_id();
        tracing::trace!(id = %id, "allocated anonymous tag");
        id
    }

    /// Returns the id of `name` without allocating.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TagId> {
        self.ids.get(name).copied()
    }

    /// Returns the number of allocated tags, anonymous ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.next as usize
    }

    /// Returns true if nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    /// Iterates over named `(name, id)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TagId)> {
        self.ids.iter().map(|(name, id)| (name.as_str(), *id))
    }

    fn next_id(&mut self) -> TagId {
        let id = TagId::new(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_alloc_is_stable() {
        let mut tags = TagAllocator::new();
        let a = tags.alloc("a");
        let b = tags.alloc("b");
        assert_eq!(tags.alloc("a"), a);
        assert_ne!(a, b);
        assert_eq!(a, TagId::new(0));
        assert_eq!(b, TagId::new(1));
    }

    #[test]
    fn test_fresh_never_reuses() {
        let mut tags = TagAllocator::new();
        let a = tags.alloc("a");
        let f1 = tags.fresh();
        let f2 = tags.fresh();
        assert_ne!(f1, f2);
        assert_ne!(f1, a);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.get("a"), Some(a));
        assert_eq!(tags.alloc("b"), TagId::new(3));
        assert_eq!(tags.iter().count(), 2);
    }

    proptest! {
        #[test]
        fn prop_alloc_is_injective(names in proptest::collection::vec("[a-z]{1,3}", 0..40)) {
            let mut tags = TagAllocator::new();
            let ids: Vec<_> = names.iter().map(|n| tags.alloc(n)).collect();
            for (i, a) in names.iter().enumerate() {
                for (j, b) in names.iter().enumerate() {
                    prop_assert_eq!(a == b, ids[i] == ids[j]);
                }
            }
            let distinct: std::collections::HashSet<_> = names.iter().collect();
            prop_assert_eq!(tags.len(), distinct.len());
        }
    }
}
