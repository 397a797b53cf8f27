//! # Restricted Rendering
//!
//! When the gate denied a request because of visibility, the host still renders
//! its standard not-found template. [`RestrictedRender`] rewrites three of its
//! blocks and the document title so the visitor sees a log-in prompt instead of
//! "Page not found".
//!
//! The render state is a value owned by one request's render phase. It is
//! created by [`RestrictedRender::activate`], passed to every block and title
//! substitution, and consumed by [`RestrictedRender::finish`]. There is no
//! shared state to reset between requests.

use std::borrow::Cow;
use std::collections::BTreeMap;

use html_escape::encode_double_quoted_attribute;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::VvcConfig;
use crate::error::Result;
use crate::gate::ResponseState;
use crate::request::RequestContext;

pub const RESTRICTED_TITLE: &str = "Restricted Content";
pub const RESTRICTED_MESSAGE: &str =
    "This page or post is available for team members. Please log in to view.";
pub const LOGIN_BUTTON_TEXT: &str = "Log In to View";

const HEADING_MARKER: &str = "Page not found";
const PARAGRAPH_MARKER: &str = "The page you are looking for";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedRender {
    login_url: String,
}

impl RestrictedRender {
    /// Start a restricted render phase, or `None` when the response is not a
    /// visibility denial for an anonymous visitor.
    pub fn activate(
        request: &RequestContext,
        response: &ResponseState,
        config: &VvcConfig,
    ) -> Result<Option<Self>> {
        if request.authenticated || !response.not_found || !response.restricted {
            return Ok(None);
        }
        let login_url = login_url(config, &request.request_path()?)?;
        debug!(%login_url, "rendering restricted not-found template");
        Ok(Some(Self { login_url }))
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Substitute one rendered block. Blocks that do not match pass through
    /// untouched.
    pub fn filter_block<'c>(&self, block_name: &str, content: &'c str) -> Cow<'c, str> {
        match block_name {
            "core/heading" if content.contains(HEADING_MARKER) => Cow::Owned(restricted_heading()),
            "core/paragraph" if content.contains(PARAGRAPH_MARKER) => {
                Cow::Owned(format!("<p>{}</p>", RESTRICTED_MESSAGE))
            }
            "core/search" => Cow::Owned(login_button(&self.login_url)),
            _ => Cow::Borrowed(content),
        }
    }

    /// Replace the `title` part of the document title, if the host set one.
    pub fn filter_title_parts(&self, parts: &mut BTreeMap<String, String>) {
        if let Some(title) = parts.get_mut("title") {
            *title = RESTRICTED_TITLE.to_string();
        }
    }

    /// End the render phase.
    pub fn finish(self) {
        debug!("restricted render finished");
    }
}

/// Login screen URL that redirects back to `request_path` on the site.
pub fn login_url(config: &VvcConfig, request_path: &str) -> Result<String> {
    let mut url = Url::parse(&format!("{}{}", config.site_url, config.login_path))?;
    let return_to = format!("{}{}", config.site_url, request_path);
    url.query_pairs_mut().append_pair("redirect_to", &return_to);
    Ok(url.to_string())
}

fn restricted_heading() -> String {
    format!(
        r#"<h1 class="wp-block-heading"><span aria-hidden="true" class="vvc-restricted-icon" style="margin-right:0.35em">🔒</span>{}</h1>"#,
        RESTRICTED_TITLE
    )
}

fn login_button(login_url: &str) -> String {
    format!(
        r#"<div class="wp-block-buttons is-layout-flex wp-block-buttons-is-layout-flex" style="justify-content:flex-start"><div class="wp-block-button is-style-fill"><a class="wp-block-button__link wp-element-button" href="{}">{}</a></div></div>"#,
        encode_double_quoted_attribute(login_url),
        LOGIN_BUTTON_TEXT
    )
}

/// One rendered block of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub name: String,
    pub content: String,
}

impl Block {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

/// The host's stock not-found template, as rendered blocks.
pub fn default_not_found_template() -> Vec<Block> {
    vec![
        Block::new(
            "core/heading",
            r#"<h1 class="wp-block-heading">Page not found</h1>"#,
        ),
        Block::new(
            "core/paragraph",
            "<p>The page you are looking for does not exist, or it has been moved. Please try searching using the form below.</p>",
        ),
        Block::new(
            "core/search",
            r#"<form role="search" method="get" class="wp-block-search"><input type="search" name="s"/><button type="submit">Search</button></form>"#,
        ),
    ]
}

/// Concatenate blocks, substituting through `render` when one is active.
pub fn render_blocks(render: Option<&RestrictedRender>, blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match render {
            Some(render) => render.filter_block(&block.name, &block.content),
            None => Cow::Borrowed(block.content.as_str()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
