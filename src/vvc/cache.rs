//! # Hidden-Page Cache
//!
//! Listing and menu filters need the full set of hidden pages, which costs two
//! meta queries against the host. The set is cached under a fixed key for a
//! short time-to-live (five minutes by default) measured from the write.
//!
//! ## Staleness
//!
//! Flag writes do **not** invalidate the cache. A page flipped to visible may
//! keep being excluded from listings until the entry expires. The only
//! explicit invalidation is [`HiddenSetCache::flush`], called on uninstall.
//!
//! ## Flat Definition
//!
//! "Hidden" here means: a page whose own flag is `false`, or a page with no
//! flag at all. Ancestors are not consulted; callers needing the full
//! hierarchical answer use [`crate::visibility::VisibilityResolver`].
//! Posts are never tracked.
//!
//! ## Sharing
//!
//! One cache serves the whole process and may be shared across threads behind
//! an `Arc`. Concurrent misses each compute the set and the last write wins.

use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::Result;
use crate::model::ContentKind;
use crate::store::{ItemQuery, MetaClause, SiteStore};

pub const HIDDEN_PAGES_CACHE_KEY: &str = "vvc_hidden_pages_v1";

#[derive(Debug, Clone)]
struct CacheEntry {
    ids: BTreeSet<u64>,
    stored_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct HiddenSetCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl Default for HiddenSetCache {
    fn default() -> Self {
        Self::new(Duration::minutes(5))
    }
}

impl HiddenSetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn key(&self) -> &'static str {
        HIDDEN_PAGES_CACHE_KEY
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_hidden_page_ids<S: SiteStore + ?Sized>(&self, store: &S) -> Result<BTreeSet<u64>> {
        self.get_hidden_page_ids_at(store, Utc::now())
    }

    /// Same as [`Self::get_hidden_page_ids`] with an explicit clock.
    pub fn get_hidden_page_ids_at<S: SiteStore + ?Sized>(
        &self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<BTreeSet<u64>> {
        if let Some(entry) = self.read().as_ref() {
            if now - entry.stored_at < self.ttl {
                debug!(key = HIDDEN_PAGES_CACHE_KEY, count = entry.ids.len(), "hidden-page cache hit");
                return Ok(entry.ids.clone());
            }
        }

        let ids = compute_hidden_page_ids(store)?;
        debug!(key = HIDDEN_PAGES_CACHE_KEY, count = ids.len(), "hidden-page cache miss");
        *self.write() = Some(CacheEntry {
            ids: ids.clone(),
            stored_at: now,
        });
        Ok(ids)
    }

    pub fn flush(&self) {
        *self.write() = None;
    }

    /// Whether an entry exists and is still fresh at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|entry| now - entry.stored_at < self.ttl)
    }

    // A panic while holding the lock cannot leave the Option half-written.
    fn read(&self) -> RwLockReadGuard<'_, Option<CacheEntry>> {
        self.entry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<CacheEntry>> {
        self.entry.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Pages explicitly flagged hidden, plus pages that never had a flag.
pub fn compute_hidden_page_ids<S: SiteStore + ?Sized>(store: &S) -> Result<BTreeSet<u64>> {
    let pages = ItemQuery::kinds(&[ContentKind::Page]);
    let explicit = store.query_ids(&pages.clone().with_meta(MetaClause::Equals(false)))?;
    let missing = store.query_ids(&pages.with_meta(MetaClause::NotExists))?;
    Ok(explicit.into_iter().chain(missing).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentItem;
    use crate::store::memory::InMemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn site() -> InMemoryStore {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(1, "shown"),
            ContentItem::page(2, "hidden"),
            ContentItem::page(3, "unset"),
            ContentItem::page(4, "child-of-hidden").with_parent(2),
            ContentItem::post(5, "post-unset"),
        ]);
        store.set_flag(1, true).unwrap();
        store.set_flag(2, false).unwrap();
        store.set_flag(4, true).unwrap();
        store
    }

    #[test]
    fn miss_computes_flat_page_set() {
        let store = site();
        let cache = HiddenSetCache::default();
        let ids = cache.get_hidden_page_ids_at(&store, t0()).unwrap();
        // Page 4 has a hidden parent but its own flag is true: not in the flat set.
        assert_eq!(ids, BTreeSet::from([2, 3]));
    }

    #[test]
    fn repeated_reads_within_ttl_are_identical() {
        let store = site();
        let cache = HiddenSetCache::default();
        let first = cache.get_hidden_page_ids_at(&store, t0()).unwrap();
        let second = cache
            .get_hidden_page_ids_at(&store, t0() + Duration::seconds(299))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flag_writes_are_not_seen_until_expiry() {
        let mut store = site();
        let cache = HiddenSetCache::default();
        cache.get_hidden_page_ids_at(&store, t0()).unwrap();

        store.set_flag(3, true).unwrap();
        let stale = cache
            .get_hidden_page_ids_at(&store, t0() + Duration::minutes(4))
            .unwrap();
        assert!(stale.contains(&3));

        let fresh = cache
            .get_hidden_page_ids_at(&store, t0() + Duration::minutes(5))
            .unwrap();
        assert_eq!(fresh, BTreeSet::from([2]));
    }

    #[test]
    fn expiry_is_measured_from_last_write() {
        let mut store = site();
        let cache = HiddenSetCache::new(Duration::seconds(10));
        cache.get_hidden_page_ids_at(&store, t0()).unwrap();
        assert!(cache.is_fresh_at(t0() + Duration::seconds(9)));
        assert!(!cache.is_fresh_at(t0() + Duration::seconds(10)));

        store.set_flag(1, false).unwrap();
        let rewritten = cache
            .get_hidden_page_ids_at(&store, t0() + Duration::seconds(10))
            .unwrap();
        assert!(rewritten.contains(&1));
        assert!(cache.is_fresh_at(t0() + Duration::seconds(19)));
    }

    #[test]
    fn flush_forces_recompute() {
        let mut store = site();
        let cache = HiddenSetCache::default();
        cache.get_hidden_page_ids_at(&store, t0()).unwrap();
        store.set_flag(2, true).unwrap();
        cache.flush();
        assert!(!cache.is_fresh_at(t0()));
        let ids = cache.get_hidden_page_ids_at(&store, t0()).unwrap();
        assert_eq!(ids, BTreeSet::from([3]));
    }

    #[test]
    fn posts_are_never_tracked() {
        let store = InMemoryStore::with_items(vec![ContentItem::post(1, "p")]);
        let ids = compute_hidden_page_ids(&store).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn cache_is_shareable_across_threads() {
        let cache = Arc::new(HiddenSetCache::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let store = site();
                    cache.get_hidden_page_ids_at(&store, t0()).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), BTreeSet::from([2, 3]));
        }
        assert_eq!(cache.key(), "vvc_hidden_pages_v1");
    }
}
