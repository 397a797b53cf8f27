//! # Visibility Resolution
//!
//! Decides whether an anonymous visitor may see a content item.
//!
//! ## Rules
//!
//! 1. **Default hidden**: an item with no stored flag is hidden.
//! 2. **Posts are flat**: a post's visibility is its own flag, nothing else.
//! 3. **Pages inherit restriction**: a page with flag `true` is visible only if
//!    every ancestor up to the root is also flagged `true`.
//! 4. **Dangling parents end the chain**: a parent id that names no item is
//!    treated as the root.
//!
//! ## Bounded Walk
//!
//! The ancestor chain is walked iteratively with a visited set and a depth
//! bound (`max_parent_depth`). Corrupt data that forms a parent cycle, or a
//! chain deeper than the bound, resolves to hidden.
//!
//! Results are never cached: each call reads the current flags, so a change
//! to any ancestor is observed immediately.

use std::collections::HashSet;

use tracing::warn;

use crate::error::Result;
use crate::model::ContentItem;
use crate::store::SiteStore;

pub const DEFAULT_MAX_PARENT_DEPTH: usize = 1000;

/// Read the flag for `id`, collapsing "never set" to `false`.
pub fn read_flag<S: SiteStore + ?Sized>(store: &S, id: u64) -> Result<bool> {
    Ok(store.get_flag(id)?.unwrap_or(false))
}

pub struct VisibilityResolver<'a, S: SiteStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: SiteStore + ?Sized> VisibilityResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_PARENT_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_visible_to_visitor(&self, item: &ContentItem) -> Result<bool> {
        if !read_flag(self.store, item.id)? {
            return Ok(false);
        }
        if !item.is_page() {
            return Ok(true);
        }
        self.ancestors_visible(item)
    }

    /// Like [`Self::is_visible_to_visitor`] for a bare id. An id the host does
    /// not know is judged on its flag alone.
    pub fn is_id_visible_to_visitor(&self, id: u64) -> Result<bool> {
        match self.store.find_item(id)? {
            Some(item) => self.is_visible_to_visitor(&item),
            None => read_flag(self.store, id),
        }
    }

    fn ancestors_visible(&self, item: &ContentItem) -> Result<bool> {
        let mut visited = HashSet::from([item.id]);
        let mut current = item.parent;
        let mut depth = 0;

        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                warn!(item = item.id, parent = parent_id, "parent cycle detected; treating as hidden");
                return Ok(false);
            }
            if depth >= self.max_depth {
                warn!(item = item.id, depth, "parent chain exceeds depth bound; treating as hidden");
                return Ok(false);
            }
            depth += 1;

            let Some(parent) = self.store.find_item(parent_id)? else {
                return Ok(true);
            };
            if !read_flag(self.store, parent_id)? {
                return Ok(false);
            }
            current = parent.parent;
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn visible(store: &InMemoryStore, id: u64) -> bool {
        VisibilityResolver::new(store)
            .is_id_visible_to_visitor(id)
            .unwrap()
    }

    #[test]
    fn unset_flag_is_hidden() {
        let store = InMemoryStore::with_items(vec![
            ContentItem::page(1, "a"),
            ContentItem::post(2, "b"),
        ]);
        assert!(!visible(&store, 1));
        assert!(!visible(&store, 2));
    }

    #[test]
    fn setting_flag_makes_root_page_visible() {
        let mut store = InMemoryStore::with_items(vec![ContentItem::page(5, "five")]);
        assert!(!visible(&store, 5));
        store.set_flag(5, true).unwrap();
        assert!(visible(&store, 5));
    }

    #[test]
    fn hidden_parent_hides_child() {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(5, "five"),
            ContentItem::page(6, "six").with_parent(5),
        ]);
        store.set_flag(6, true).unwrap();
        store.set_flag(5, false).unwrap();
        assert!(!visible(&store, 6));

        // Re-evaluated on every call.
        store.set_flag(5, true).unwrap();
        assert!(visible(&store, 6));
    }

    #[test]
    fn hidden_grandparent_hides_descendants() {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(1, "b"),
            ContentItem::page(2, "a").with_parent(1),
            ContentItem::page(3, "p").with_parent(2),
        ]);
        store.set_flag(3, true).unwrap();
        store.set_flag(2, false).unwrap();
        store.set_flag(1, true).unwrap();
        assert!(!visible(&store, 3));

        store.set_flag(2, true).unwrap();
        assert!(visible(&store, 3));

        store.delete_flag(1).unwrap();
        assert!(!visible(&store, 3));
    }

    #[test]
    fn hidden_page_stays_hidden_regardless_of_ancestors() {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(1, "root"),
            ContentItem::page(2, "child").with_parent(1),
        ]);
        store.set_flag(1, true).unwrap();
        store.set_flag(2, false).unwrap();
        assert!(!visible(&store, 2));
    }

    #[test]
    fn posts_ignore_parent_references() {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(1, "hidden-root"),
            ContentItem::post(2, "post").with_parent(1),
        ]);
        store.set_flag(2, true).unwrap();
        store.set_flag(1, false).unwrap();
        assert!(visible(&store, 2));
    }

    #[test]
    fn dangling_parent_ends_the_chain() {
        let mut store =
            InMemoryStore::with_items(vec![ContentItem::page(2, "orphan").with_parent(99)]);
        store.set_flag(2, true).unwrap();
        assert!(visible(&store, 2));
    }

    #[test]
    fn parent_cycle_resolves_to_hidden() {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(1, "a").with_parent(2),
            ContentItem::page(2, "b").with_parent(1),
        ]);
        store.set_flag(1, true).unwrap();
        store.set_flag(2, true).unwrap();
        assert!(!visible(&store, 1));
        assert!(!visible(&store, 2));
    }

    #[test]
    fn self_parent_resolves_to_hidden() {
        let mut store = InMemoryStore::with_items(vec![ContentItem::page(1, "a").with_parent(1)]);
        store.set_flag(1, true).unwrap();
        assert!(!visible(&store, 1));
    }

    #[test]
    fn depth_bound_limits_the_walk() {
        let mut items = vec![ContentItem::page(0, "root")];
        for id in 1..=5 {
            items.push(ContentItem::page(id, format!("p{}", id)).with_parent(id - 1));
        }
        let mut store = InMemoryStore::with_items(items);
        for id in 0..=5 {
            store.set_flag(id, true).unwrap();
        }

        let leaf = store.get_item(5).unwrap();
        let deep_enough = VisibilityResolver::new(&store).with_max_depth(5);
        assert!(deep_enough.is_visible_to_visitor(&leaf).unwrap());

        let too_shallow = VisibilityResolver::new(&store).with_max_depth(4);
        assert!(!too_shallow.is_visible_to_visitor(&leaf).unwrap());
    }

    #[test]
    fn unknown_id_falls_back_to_flag() {
        let mut store = InMemoryStore::new();
        assert!(!visible(&store, 42));
        store.set_flag(42, true).unwrap();
        assert!(visible(&store, 42));
    }
}
