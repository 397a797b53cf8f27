//! # Access Gate
//!
//! Turns a request for a hidden item into a not-found response for anonymous
//! visitors.
//!
//! ## Request Lifecycle
//!
//! ```text
//!   Undetermined ──visible──▶ Allowed
//!        │
//!        └──────hidden──────▶ Denied (404)
//! ```
//!
//! The gate runs twice per request:
//!
//! 1. [`AccessGate::on_parse_query`] when the host has parsed the query
//!    variables but not yet run the query.
//! 2. [`AccessGate::on_content_resolved`] once the main content object is
//!    known, catching anything the first pass missed (for example a query
//!    altered in between).
//!
//! Both passes reach the same [`ResponseState::deny`], which is idempotent.
//! `Denied` is terminal for the request.
//!
//! Logged-in users and admin screens bypass the gate: both passes mark them
//! `Allowed` without looking at the content.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{ContentItem, ContentKind};
use crate::request::RequestContext;
use crate::store::SiteStore;
use crate::visibility::{VisibilityResolver, DEFAULT_MAX_PARENT_DEPTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Undetermined,
    Allowed,
    Denied,
}

/// What the gate decided for one request's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseState {
    pub state: GateState,
    pub status: u16,
    pub not_found: bool,
    pub no_cache: bool,
    /// Set when the 404 was caused by visibility, so the renderer can show a
    /// log-in message instead of the generic not-found page.
    pub restricted: bool,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            state: GateState::Undetermined,
            status: 200,
            not_found: false,
            no_cache: false,
            restricted: false,
        }
    }
}

impl ResponseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force not-found. Safe to call any number of times.
    pub fn deny(&mut self, request: &RequestContext) {
        self.state = GateState::Denied;
        self.not_found = true;
        self.status = 404;
        self.no_cache = true;
        if !request.authenticated {
            self.restricted = true;
        }
    }

    fn allow(&mut self) {
        if self.state == GateState::Undetermined {
            self.state = GateState::Allowed;
        }
    }

    pub fn is_denied(&self) -> bool {
        self.state == GateState::Denied
    }
}

pub struct AccessGate<'a, S: SiteStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: SiteStore + ?Sized> AccessGate<'a, S> {
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

    fn resolver(&self) -> VisibilityResolver<'a, S> {
        VisibilityResolver::new(self.store).with_max_depth(self.max_depth)
    }

    /// First enforcement point: main singular front-end queries.
    pub fn on_parse_query(
        &self,
        request: &RequestContext,
        response: &mut ResponseState,
    ) -> Result<()> {
        if request.admin || request.authenticated {
            response.allow();
            return Ok(());
        }
        if !request.main_query || !request.is_singular() {
            return Ok(());
        }

        let Some(item) = self.resolve_queried_item(request)? else {
            debug!(uri = %request.request_uri, "no content item resolved; gate not applicable");
            return Ok(());
        };

        if self.resolver().is_visible_to_visitor(&item)? {
            response.allow();
        } else {
            debug!(item = item.id, kind = %item.kind, "hidden from visitors; denying");
            response.deny(request);
        }
        Ok(())
    }

    /// Second enforcement point, once the host has settled on the main
    /// content object (`None` when the query produced nothing).
    pub fn on_content_resolved(
        &self,
        request: &RequestContext,
        main_item: Option<&ContentItem>,
        response: &mut ResponseState,
    ) -> Result<()> {
        if request.admin || request.authenticated {
            response.allow();
            return Ok(());
        }
        if !response.restricted && (!request.is_singular() || response.not_found) {
            return Ok(());
        }

        if let Some(item) = main_item {
            if !self.resolver().is_visible_to_visitor(item)? {
                debug!(item = item.id, "main content hidden from visitors; denying");
                response.deny(request);
            }
        }
        Ok(())
    }

    /// Find the item a singular query names: explicit post id, explicit page
    /// id, post slug, page path, then a pretty-permalink path (page first).
    pub fn resolve_queried_item(&self, request: &RequestContext) -> Result<Option<ContentItem>> {
        let query = &request.query;
        if let Some(id) = query.p {
            return self.store.find_item(id);
        }
        if let Some(id) = query.page_id {
            return self.store.find_item(id);
        }
        if let Some(name) = &query.name {
            return self.store.find_by_path(ContentKind::Post, name);
        }
        if let Some(pagename) = &query.pagename {
            return self.store.find_by_path(ContentKind::Page, pagename);
        }
        if let Some(path) = &query.path {
            if let Some(page) = self.store.find_by_path(ContentKind::Page, path)? {
                return Ok(Some(page));
            }
            return self.store.find_by_path(ContentKind::Post, path);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn site() -> InMemoryStore {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(5, "members"),
            ContentItem::page(6, "handbook").with_parent(5),
            ContentItem::page(7, "about"),
            ContentItem::post(8, "hello-world"),
        ]);
        store.set_flag(6, true).unwrap();
        store.set_flag(7, true).unwrap();
        store
    }

    fn run(store: &InMemoryStore, request: &RequestContext) -> ResponseState {
        let gate = AccessGate::new(store);
        let mut response = ResponseState::new();
        gate.on_parse_query(request, &mut response).unwrap();
        response
    }

    #[test]
    fn hidden_item_is_denied_for_visitors() {
        let store = site();
        let request = RequestContext::visitor("/?page_id=5").unwrap();
        let response = run(&store, &request);
        assert_eq!(response.state, GateState::Denied);
        assert!(response.not_found);
        assert_eq!(response.status, 404);
        assert!(response.no_cache);
        assert!(response.restricted);
    }

    #[test]
    fn logged_in_users_are_never_denied() {
        let store = site();
        let request = RequestContext::visitor("/?page_id=5").unwrap().logged_in();
        let response = run(&store, &request);
        assert_eq!(response.state, GateState::Allowed);
        assert!(!response.not_found);
        assert_eq!(response.status, 200);
        assert!(!response.restricted);
    }

    #[test]
    fn admin_requests_bypass_the_gate() {
        let store = site();
        let request = RequestContext::visitor("/?page_id=5").unwrap().in_admin();
        let response = run(&store, &request);
        assert_eq!(response.state, GateState::Allowed);
        assert_eq!(response.status, 200);
        assert!(!response.not_found);
    }

    #[test]
    fn logged_in_front_page_is_allowed() {
        let store = site();
        for uri in ["/", "/?p=999"] {
            let request = RequestContext::visitor(uri).unwrap().logged_in();
            assert_eq!(run(&store, &request).state, GateState::Allowed, "{}", uri);
        }
    }

    #[test]
    fn second_pass_allows_logged_in_users() {
        let store = site();
        let gate = AccessGate::new(&store);
        let request = RequestContext::visitor("/?page_id=5").unwrap().logged_in();
        let mut response = ResponseState::new();
        let item = store.get_item(5).unwrap();
        gate.on_content_resolved(&request, Some(&item), &mut response)
            .unwrap();
        assert_eq!(response.state, GateState::Allowed);
        assert!(!response.not_found);
    }

    #[test]
    fn secondary_queries_are_ignored() {
        let store = site();
        let request = RequestContext::visitor("/?page_id=5")
            .unwrap()
            .secondary_query();
        assert_eq!(run(&store, &request).state, GateState::Undetermined);
    }

    #[test]
    fn visible_item_is_allowed() {
        let store = site();
        let request = RequestContext::visitor("/about/").unwrap();
        let response = run(&store, &request);
        assert_eq!(response.state, GateState::Allowed);
        assert_eq!(response.status, 200);
    }

    #[test]
    fn child_of_hidden_page_is_denied_by_path() {
        let store = site();
        let request = RequestContext::visitor("/?pagename=members/handbook").unwrap();
        assert!(run(&store, &request).is_denied());

        let request = RequestContext::visitor("/members/handbook/").unwrap();
        assert!(run(&store, &request).is_denied());
    }

    #[test]
    fn unresolved_item_leaves_state_undetermined() {
        let store = site();
        for uri in ["/?p=999", "/no-such-thing/", "/"] {
            let request = RequestContext::visitor(uri).unwrap();
            assert_eq!(run(&store, &request), ResponseState::default(), "{}", uri);
        }
    }

    #[test]
    fn post_lookup_by_name() {
        let mut store = site();
        let request = RequestContext::visitor("/?name=hello-world").unwrap();
        assert!(run(&store, &request).is_denied());

        store.set_flag(8, true).unwrap();
        assert_eq!(run(&store, &request).state, GateState::Allowed);
    }

    #[test]
    fn second_pass_denies_when_first_pass_missed() {
        let store = site();
        let gate = AccessGate::new(&store);
        let request = RequestContext::visitor("/?p=999").unwrap();
        let mut response = ResponseState::new();
        gate.on_parse_query(&request, &mut response).unwrap();
        assert_eq!(response.state, GateState::Undetermined);

        // The query was altered and now yields hidden page 5.
        let item = store.get_item(5).unwrap();
        gate.on_content_resolved(&request, Some(&item), &mut response)
            .unwrap();
        assert!(response.is_denied());
        assert!(response.restricted);
    }

    #[test]
    fn both_passes_reach_the_same_terminal_state() {
        let store = site();
        let gate = AccessGate::new(&store);
        let request = RequestContext::visitor("/?page_id=5").unwrap();
        let mut response = ResponseState::new();
        gate.on_parse_query(&request, &mut response).unwrap();
        let after_first = response.clone();

        let item = store.get_item(5).unwrap();
        gate.on_content_resolved(&request, Some(&item), &mut response)
            .unwrap();
        assert_eq!(response, after_first);
    }

    #[test]
    fn denied_is_never_reversed() {
        let store = site();
        let gate = AccessGate::new(&store);
        let request = RequestContext::visitor("/?page_id=5").unwrap();
        let mut response = ResponseState::new();
        gate.on_parse_query(&request, &mut response).unwrap();

        let visible = store.get_item(7).unwrap();
        gate.on_content_resolved(&request, Some(&visible), &mut response)
            .unwrap();
        assert!(response.is_denied());
    }

    #[test]
    fn second_pass_skips_plain_not_found() {
        let store = site();
        let gate = AccessGate::new(&store);
        let request = RequestContext::visitor("/?page_id=5").unwrap();
        let mut response = ResponseState {
            not_found: true,
            status: 404,
            ..ResponseState::default()
        };
        let item = store.get_item(5).unwrap();
        gate.on_content_resolved(&request, Some(&item), &mut response)
            .unwrap();
        assert!(!response.restricted);
        assert_eq!(response.state, GateState::Undetermined);
    }

    #[test]
    fn deny_marks_restricted_only_for_anonymous() {
        let request = RequestContext::visitor("/").unwrap().logged_in();
        let mut response = ResponseState::new();
        response.deny(&request);
        assert!(response.not_found);
        assert!(!response.restricted);
    }
}
