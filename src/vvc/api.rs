//! # API Facade
//!
//! A thin facade over the command layer and the core components. It is the
//! single entry point a UI (the CLI here, a host binding elsewhere) talks to.
//!
//! The facade owns the per-site state that outlives one request:
//!
//! - the [`SiteStore`] backend,
//! - the shared [`HiddenSetCache`] (behind an `Arc` so several facades or
//!   threads can share one),
//! - the site [`VvcConfig`],
//! - the [`NonceRegistry`] used by editorial writes.
//!
//! It does no business logic, no I/O beyond what commands do, and returns
//! structured `Result<CmdResult>` values. Per-request state such as
//! [`crate::gate::ResponseState`] is never stored here.
//!
//! `VvcApi<S: SiteStore>` is generic over the backend:
//! - Production: `VvcApi<FileStore>`
//! - Testing: `VvcApi<InMemoryStore>`

use std::sync::Arc;

use crate::cache::HiddenSetCache;
use crate::commands;
use crate::config::VvcConfig;
use crate::editorial::{Editor, NonceRegistry, Permissions};
use crate::error::Result;
use crate::store::SiteStore;
use crate::visibility::VisibilityResolver;

pub struct VvcApi<S: SiteStore> {
    store: S,
    cache: Arc<HiddenSetCache>,
    config: VvcConfig,
    nonces: NonceRegistry,
    paths: commands::SitePaths,
}

impl<S: SiteStore> VvcApi<S> {
    pub fn new(store: S, config: VvcConfig, paths: commands::SitePaths) -> Self {
        let cache = Arc::new(HiddenSetCache::new(config.cache_ttl()));
        Self {
            store,
            cache,
            config,
            nonces: NonceRegistry::new(),
            paths,
        }
    }

    /// Share an existing cache instead of the one built from config.
    pub fn with_cache(mut self, cache: Arc<HiddenSetCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn add_item(&mut self, item: NewItem) -> Result<commands::CmdResult> {
        commands::add::run(&mut self.store, item)
    }

    pub fn list_items(&self) -> Result<commands::CmdResult> {
        commands::list::run(&self.store, self.config.max_parent_depth)
    }

    /// Show items to visitors, acting as a site administrator.
    pub fn show_items(&mut self, ids: &[u64]) -> Result<commands::CmdResult> {
        self.set_visibility_as(&Editor::administrator(), ids, true)
    }

    /// Hide items from visitors, acting as a site administrator.
    pub fn hide_items(&mut self, ids: &[u64]) -> Result<commands::CmdResult> {
        self.set_visibility_as(&Editor::administrator(), ids, false)
    }

    pub fn set_visibility_as<P: Permissions + ?Sized>(
        &mut self,
        user: &P,
        ids: &[u64],
        show: bool,
    ) -> Result<commands::CmdResult> {
        commands::visibility::run(&mut self.store, &self.nonces, user, ids, show)
    }

    pub fn check(&self, uri: &str, logged_in: bool) -> Result<commands::CmdResult> {
        commands::check::run(&self.store, &self.config, uri, logged_in)
    }

    pub fn hidden_pages(&self) -> Result<commands::CmdResult> {
        commands::hidden::run(&self.store, &self.cache)
    }

    pub fn activate(&mut self) -> Result<commands::CmdResult> {
        commands::activate::run(&mut self.store)
    }

    pub fn uninstall(&mut self) -> Result<commands::CmdResult> {
        commands::uninstall::run(&mut self.store, &self.cache)
    }

    pub fn is_visible_to_visitor(&self, id: u64) -> Result<bool> {
        VisibilityResolver::new(&self.store)
            .with_max_depth(self.config.max_parent_depth)
            .is_id_visible_to_visitor(id)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn init(&self) -> Result<commands::CmdResult> {
        commands::init::run(&self.paths)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &Arc<HiddenSetCache> {
        &self.cache
    }

    pub fn nonces(&self) -> &NonceRegistry {
        &self.nonces
    }

    pub fn site_config(&self) -> &VvcConfig {
        &self.config
    }

    pub fn paths(&self) -> &commands::SitePaths {
        &self.paths
    }
}

pub use crate::commands::add::NewItem;
pub use crate::commands::config::ConfigAction;
pub use commands::{CheckOutcome, CmdMessage, CmdResult, ItemRow, MessageLevel, SitePaths};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentKind, PostStatus};
    use crate::store::memory::InMemoryStore;

    fn api() -> VvcApi<InMemoryStore> {
        VvcApi::new(
            InMemoryStore::new(),
            VvcConfig::default(),
            SitePaths::new("/unused"),
        )
    }

    fn page(slug: &str, parent: Option<u64>) -> NewItem {
        NewItem {
            kind: ContentKind::Page,
            slug: slug.to_string(),
            title: None,
            parent,
            status: PostStatus::Publish,
        }
    }

    #[test]
    fn show_and_hide_dispatch_as_administrator() {
        let mut api = api();
        api.add_item(page("members", None)).unwrap();
        api.add_item(page("handbook", Some(1))).unwrap();

        api.show_items(&[2]).unwrap();
        assert!(!api.is_visible_to_visitor(2).unwrap());

        api.show_items(&[1]).unwrap();
        assert!(api.is_visible_to_visitor(2).unwrap());

        api.hide_items(&[1]).unwrap();
        assert!(!api.is_visible_to_visitor(2).unwrap());
    }

    #[test]
    fn cache_is_shared_between_facades() {
        let cache = Arc::new(HiddenSetCache::default());
        let mut first = api().with_cache(Arc::clone(&cache));
        first.add_item(page("a", None)).unwrap();
        assert_eq!(first.hidden_pages().unwrap().hidden_page_ids, vec![1]);
        assert!(Arc::ptr_eq(first.cache(), &cache));
    }

    #[test]
    fn hidden_set_stays_stale_after_show_until_uninstall_flush() {
        let mut api = api();
        api.add_item(page("a", None)).unwrap();
        assert_eq!(api.hidden_pages().unwrap().hidden_page_ids, vec![1]);

        api.show_items(&[1]).unwrap();
        assert_eq!(api.hidden_pages().unwrap().hidden_page_ids, vec![1]);

        api.uninstall().unwrap();
        assert_eq!(api.hidden_pages().unwrap().hidden_page_ids, vec![1]);
        assert_eq!(api.store().get_flag(1).unwrap(), None);
    }

    #[test]
    fn check_dispatches_with_site_config() {
        let mut api = api();
        api.add_item(page("members", None)).unwrap();
        let check = api.check("/members/", false).unwrap().check.unwrap();
        assert_eq!(check.response.status, 404);
        assert!(check
            .login_url
            .unwrap()
            .starts_with("http://localhost/wp-login.php"));
    }
}
