//! Listing, menu and page-list filters for anonymous front-end requests.
//!
//! Each filter mirrors one host hook. Every one is a no-op for admin screens
//! and logged-in users, which see everything.
//!
//! Two notions of "hidden" are in play:
//!
//! - the full hierarchical answer from [`VisibilityResolver`], used wherever a
//!   single item or page is judged;
//! - the flat hidden-page set from [`HiddenSetCache`], used where the host
//!   wants a list of ids to exclude.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cache::HiddenSetCache;
use crate::error::Result;
use crate::model::{ContentItem, ContentKind};
use crate::request::RequestContext;
use crate::store::{MetaClause, SiteStore};
use crate::visibility::{read_flag, VisibilityResolver};

pub const HIDDEN_PAGE_CSS_CLASS: &str = "vvc-hidden-page";

/// Meta clause to append to a listing query, if any.
pub fn visitor_listing_clause(request: &RequestContext, is_main_query: bool) -> Option<MetaClause> {
    if request.admin || !is_main_query || request.authenticated {
        return None;
    }
    Some(MetaClause::Equals(true))
}

/// A navigation menu entry pointing at some object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Object type name, `post`, `page`, `custom`, `category`...
    pub object: String,
    pub object_id: u64,
    pub title: String,
}

impl MenuItem {
    pub fn new(object: &str, object_id: u64, title: &str) -> Self {
        Self {
            object: object.to_string(),
            object_id,
            title: title.to_string(),
        }
    }

    fn content_kind(&self) -> Option<ContentKind> {
        self.object.parse().ok()
    }
}

/// First menu pass: drop post and page entries whose own flag is not set.
/// Ancestors are not consulted here.
pub fn filter_menu_items<S: SiteStore + ?Sized>(
    store: &S,
    request: &RequestContext,
    items: Vec<MenuItem>,
) -> Result<Vec<MenuItem>> {
    if !request.is_anonymous_front_end() {
        return Ok(items);
    }
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if item.content_kind().is_none() || read_flag(store, item.object_id)? {
            kept.push(item);
        }
    }
    Ok(kept)
}

/// Second menu pass: drop page entries hidden by their own flag or any
/// ancestor.
///
/// Stricter than the host plugin's own second pass, which only checked the
/// entry's own flag. Here a visible child of a hidden page is dropped too, so
/// menus agree with what the gate serves.
pub fn filter_nav_menu_objects<S: SiteStore + ?Sized>(
    store: &S,
    request: &RequestContext,
    items: Vec<MenuItem>,
    max_depth: usize,
) -> Result<Vec<MenuItem>> {
    if !request.is_anonymous_front_end() {
        return Ok(items);
    }
    let resolver = VisibilityResolver::new(store).with_max_depth(max_depth);
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if item.content_kind() != Some(ContentKind::Page)
            || resolver.is_id_visible_to_visitor(item.object_id)?
        {
            kept.push(item);
        }
    }
    Ok(kept)
}

/// Merge the hidden-page set into a page-list exclude list.
pub fn list_pages_excludes<S: SiteStore + ?Sized>(
    store: &S,
    cache: &HiddenSetCache,
    request: &RequestContext,
    existing: Vec<u64>,
) -> Result<Vec<u64>> {
    if !request.is_anonymous_front_end() {
        return Ok(existing);
    }
    let hidden = cache.get_hidden_page_ids(store)?;
    let mut seen = BTreeSet::new();
    Ok(existing
        .into_iter()
        .chain(hidden)
        .filter(|id| seen.insert(*id))
        .collect())
}

/// Keep only the pages a visitor may see.
pub fn filter_pages<S: SiteStore + ?Sized>(
    store: &S,
    request: &RequestContext,
    pages: Vec<ContentItem>,
    max_depth: usize,
) -> Result<Vec<ContentItem>> {
    if !request.is_anonymous_front_end() {
        return Ok(pages);
    }
    let resolver = VisibilityResolver::new(store).with_max_depth(max_depth);
    let mut kept = Vec::with_capacity(pages.len());
    for page in pages {
        if resolver.is_visible_to_visitor(&page)? {
            kept.push(page);
        }
    }
    Ok(kept)
}

/// Arguments of the host's page-menu call that vvc touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMenuArgs {
    /// Comma-separated page ids.
    pub exclude: String,
}

pub fn page_menu_args<S: SiteStore + ?Sized>(
    store: &S,
    cache: &HiddenSetCache,
    request: &RequestContext,
    mut args: PageMenuArgs,
) -> Result<PageMenuArgs> {
    if !request.is_anonymous_front_end() {
        return Ok(args);
    }
    let existing = args
        .exclude
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect();
    let merged = list_pages_excludes(store, cache, request, existing)?;
    args.exclude = merged
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    Ok(args)
}

/// Append the hidden-page class to a page-list entry a visitor may not see.
pub fn page_css_classes<S: SiteStore + ?Sized>(
    store: &S,
    request: &RequestContext,
    page: &ContentItem,
    mut classes: Vec<String>,
    max_depth: usize,
) -> Result<Vec<String>> {
    if !request.is_anonymous_front_end() {
        return Ok(classes);
    }
    let resolver = VisibilityResolver::new(store).with_max_depth(max_depth);
    if !resolver.is_visible_to_visitor(page)? {
        classes.push(HIDDEN_PAGE_CSS_CLASS.to_string());
    }
    Ok(classes)
}

/// Style block hiding tagged page entries, when any page is hidden.
pub fn inline_hidden_page_css<S: SiteStore + ?Sized>(
    store: &S,
    cache: &HiddenSetCache,
    request: &RequestContext,
) -> Result<Option<String>> {
    if !request.is_anonymous_front_end() {
        return Ok(None);
    }
    if cache.get_hidden_page_ids(store)?.is_empty() {
        return Ok(None);
    }
    Ok(Some(format!(
        r#"<style type="text/css">.{} {{ display: none !important; }}</style>"#,
        HIDDEN_PAGE_CSS_CLASS
    )))
}
