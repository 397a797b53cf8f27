//! # Storage Layer
//!
//! The host site owns content items and persists the visibility flag in its
//! key-value metadata store. [`SiteStore`] is the boundary vvc consumes: item
//! lookup, flag read/write, the host's "meta query" and path lookup.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files in a site directory, used by the CLI.
//! - [`memory::InMemoryStore`]: For testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! site/
//! ├── items.json     # Content items keyed by id
//! ├── meta.json      # Visibility flags keyed by id (absent = never set)
//! └── config.json    # Site configuration
//! ```
//!
//! Items and flags live in separate files so that flag writes never rewrite
//! content, mirroring how the host keeps post meta apart from posts.

use crate::error::Result;
use crate::model::{ContentItem, ContentKind, PostStatus};

pub mod fs;
pub mod memory;

/// A predicate against the stored visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaClause {
    Equals(bool),
    Exists,
    NotExists,
}

impl MetaClause {
    pub fn matches(&self, stored: Option<bool>) -> bool {
        match self {
            MetaClause::Equals(v) => stored == Some(*v),
            MetaClause::Exists => stored.is_some(),
            MetaClause::NotExists => stored.is_none(),
        }
    }
}

/// Listing query understood by the host: item kinds, an optional status and
/// meta clauses that must all hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub kinds: Vec<ContentKind>,
    /// `None` matches any status.
    pub status: Option<PostStatus>,
    pub meta: Vec<MetaClause>,
}

impl ItemQuery {
    pub fn kinds(kinds: &[ContentKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_meta(mut self, clause: MetaClause) -> Self {
        self.meta.push(clause);
        self
    }

    pub fn matches(&self, item: &ContentItem, stored: Option<bool>) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&item.kind))
            && self.status.is_none_or(|s| s == item.status)
            && self.meta.iter().all(|clause| clause.matches(stored))
    }
}

/// Abstract interface over the host's content and metadata storage.
pub trait SiteStore {
    /// Get an item by id, failing with `ItemNotFound` when absent.
    fn get_item(&self, id: u64) -> Result<ContentItem>;

    /// Get an item by id, `Ok(None)` when absent.
    fn find_item(&self, id: u64) -> Result<Option<ContentItem>>;

    /// List every item, ordered by id.
    fn list_items(&self) -> Result<Vec<ContentItem>>;

    /// Create or update an item.
    fn save_item(&mut self, item: &ContentItem) -> Result<()>;

    /// Raw tri-state flag read.
    fn get_flag(&self, id: u64) -> Result<Option<bool>>;

    /// Write the flag. Returns `false` when the stored value was already `value`.
    fn set_flag(&mut self, id: u64, value: bool) -> Result<bool>;

    /// Remove the flag. Returns whether one existed.
    fn delete_flag(&mut self, id: u64) -> Result<bool>;

    /// Ids of items matching `query`, ordered by id.
    fn query_ids(&self, query: &ItemQuery) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for item in self.list_items()? {
            let stored = self.get_flag(item.id)?;
            if query.matches(&item, stored) {
                ids.push(item.id);
            }
        }
        Ok(ids)
    }

    /// Resolve a slash-separated slug path to an item of `kind`.
    ///
    /// For pages every leading segment must name the matching ancestor, so
    /// `about/team` only finds `team` when its parent's slug is `about`.
    /// Posts are matched on the last segment alone.
    fn find_by_path(&self, kind: ContentKind, path: &str) -> Result<Option<ContentItem>> {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let Some((leaf, ancestors)) = segments.split_last() else {
            return Ok(None);
        };

        let items = self.list_items()?;
        'candidates: for candidate in items.iter().filter(|i| i.kind == kind && i.slug == *leaf) {
            if kind == ContentKind::Post {
                return Ok(Some(candidate.clone()));
            }
            let mut parent = candidate.parent;
            for expected in ancestors.iter().rev() {
                match parent.and_then(|pid| items.iter().find(|i| i.id == pid)) {
                    Some(p) if p.slug == *expected => parent = p.parent,
                    _ => continue 'candidates,
                }
            }
            if parent.is_none() {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryStore;
    use super::*;

    fn site() -> InMemoryStore {
        InMemoryStore::with_items(vec![
            ContentItem::page(1, "about"),
            ContentItem::page(2, "team").with_parent(1),
            ContentItem::page(3, "team"),
            ContentItem::post(4, "hello-world"),
        ])
    }

    #[test]
    fn meta_clause_matches_tri_state() {
        assert!(MetaClause::NotExists.matches(None));
        assert!(!MetaClause::NotExists.matches(Some(false)));
        assert!(MetaClause::Exists.matches(Some(false)));
        assert!(MetaClause::Equals(false).matches(Some(false)));
        assert!(!MetaClause::Equals(false).matches(None));
    }

    #[test]
    fn query_filters_by_kind_status_and_meta() {
        let mut store = site();
        store.set_flag(1, true).unwrap();
        store.set_flag(4, false).unwrap();
        store
            .save_item(&ContentItem::page(5, "draft").with_status(PostStatus::Draft))
            .unwrap();

        let pages_without_flag = store
            .query_ids(&ItemQuery::kinds(&[ContentKind::Page]).with_meta(MetaClause::NotExists))
            .unwrap();
        assert_eq!(pages_without_flag, vec![2, 3, 5]);

        let published = store
            .query_ids(
                &ItemQuery::kinds(&[ContentKind::Page, ContentKind::Post])
                    .with_status(PostStatus::Publish)
                    .with_meta(MetaClause::Exists),
            )
            .unwrap();
        assert_eq!(published, vec![1, 4]);
    }

    #[test]
    fn find_by_path_follows_page_hierarchy() {
        let store = site();
        let nested = store.find_by_path(ContentKind::Page, "about/team").unwrap();
        assert_eq!(nested.map(|i| i.id), Some(2));

        let top = store.find_by_path(ContentKind::Page, "/team/").unwrap();
        assert_eq!(top.map(|i| i.id), Some(3));

        assert!(store
            .find_by_path(ContentKind::Page, "other/team")
            .unwrap()
            .is_none());
        assert!(store.find_by_path(ContentKind::Page, "").unwrap().is_none());
    }

    #[test]
    fn find_by_path_matches_posts_by_slug() {
        let store = site();
        let post = store.find_by_path(ContentKind::Post, "hello-world").unwrap();
        assert_eq!(post.map(|i| i.id), Some(4));
        assert!(store
            .find_by_path(ContentKind::Post, "about")
            .unwrap()
            .is_none());
    }
}
