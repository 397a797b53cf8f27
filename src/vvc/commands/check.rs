use std::collections::BTreeMap;

use crate::commands::{CheckOutcome, CmdMessage, CmdResult};
use crate::config::VvcConfig;
use crate::error::Result;
use crate::gate::{AccessGate, ResponseState};
use crate::render::{default_not_found_template, render_blocks, RestrictedRender};
use crate::request::RequestContext;
use crate::store::SiteStore;

use super::helpers::describe;

const NOT_FOUND_TITLE: &str = "Page not found";

/// Replay a front-end request for `uri` through both gate passes and the
/// restricted renderer.
pub fn run<S: SiteStore + ?Sized>(
    store: &S,
    config: &VvcConfig,
    uri: &str,
    logged_in: bool,
) -> Result<CmdResult> {
    let mut request = RequestContext::visitor(uri)?;
    if logged_in {
        request = request.logged_in();
    }

    let gate = AccessGate::new(store).with_max_depth(config.max_parent_depth);
    let mut response = ResponseState::new();
    gate.on_parse_query(&request, &mut response)?;

    let item = gate.resolve_queried_item(&request)?;
    if item.is_none() && request.is_singular() && !response.not_found {
        response.not_found = true;
        response.status = 404;
    }
    let main_item = if response.not_found { None } else { item.as_ref() };
    gate.on_content_resolved(&request, main_item, &mut response)?;

    let mut title_parts = BTreeMap::new();
    let title = match (&item, response.not_found) {
        (Some(item), false) => item.title.clone(),
        _ => NOT_FOUND_TITLE.to_string(),
    };
    title_parts.insert("title".to_string(), title);

    let render = RestrictedRender::activate(&request, &response, config)?;
    let body = response
        .not_found
        .then(|| render_blocks(render.as_ref(), &default_not_found_template()));
    let login_url = render.as_ref().map(|r| r.login_url().to_string());
    if let Some(render) = render {
        render.filter_title_parts(&mut title_parts);
        render.finish();
    }

    let mut result = CmdResult::default();
    let summary = match (&item, response.is_denied()) {
        (Some(item), true) => CmdMessage::warning(format!("{} is hidden: 404", describe(item))),
        (Some(item), false) => CmdMessage::success(format!(
            "{} is served: {}",
            describe(item),
            response.status
        )),
        (None, _) => CmdMessage::info(format!("{} resolves to no item: {}", uri, response.status)),
    };
    result.add_message(summary);

    Ok(result.with_check(CheckOutcome {
        uri: uri.to_string(),
        item,
        response,
        login_url,
        document_title: title_parts.remove("title").unwrap_or_default(),
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateState;
    use crate::model::ContentItem;
    use crate::store::memory::InMemoryStore;

    fn site() -> InMemoryStore {
        let mut store = InMemoryStore::with_items(vec![
            ContentItem::page(5, "members").with_title("Members"),
            ContentItem::page(6, "about").with_title("About"),
        ]);
        store.set_flag(6, true).unwrap();
        store
    }

    fn outcome(store: &InMemoryStore, uri: &str, logged_in: bool) -> CheckOutcome {
        run(store, &VvcConfig::default(), uri, logged_in)
            .unwrap()
            .check
            .unwrap()
    }

    #[test]
    fn hidden_page_renders_login_prompt_for_visitors() {
        let store = site();
        let check = outcome(&store, "/members/", false);
        assert_eq!(check.response.status, 404);
        assert!(check.response.restricted);
        assert_eq!(check.document_title, "Restricted Content");
        let body = check.body.unwrap();
        assert!(body.contains("Log In to View"));
        assert!(body.contains("redirect_to=http%3A%2F%2Flocalhost%2Fmembers%2F"));
        assert!(check.login_url.is_some());
    }

    #[test]
    fn logged_in_user_gets_the_page() {
        let store = site();
        let check = outcome(&store, "/members/", true);
        assert_eq!(check.response.state, GateState::Allowed);
        assert_eq!(check.response.status, 200);
        assert_eq!(check.document_title, "Members");
        assert!(check.body.is_none());
    }

    #[test]
    fn visible_page_is_served() {
        let store = site();
        let check = outcome(&store, "/?page_id=6", false);
        assert_eq!(check.response.status, 200);
        assert_eq!(check.document_title, "About");
    }

    #[test]
    fn missing_page_is_a_plain_not_found() {
        let store = site();
        let check = outcome(&store, "/nowhere/", false);
        assert_eq!(check.response.status, 404);
        assert!(!check.response.restricted);
        assert_eq!(check.document_title, "Page not found");
        assert!(check.body.unwrap().contains("Page not found"));
        assert!(check.login_url.is_none());
    }
}
