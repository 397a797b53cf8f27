//! Per-request context handed to the gate, listing filters and renderer.
//!
//! Everything the host knows about the current request that vvc consults
//! lives here, so no component needs process-wide mutable state.

use serde::Serialize;
use url::Url;

use crate::error::Result;

/// Query variables the host derives from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryVars {
    /// Explicit post id (`?p=`).
    pub p: Option<u64>,
    /// Explicit page id (`?page_id=`).
    pub page_id: Option<u64>,
    /// Post slug (`?name=`).
    pub name: Option<String>,
    /// Page path (`?pagename=`), slash-separated for nested pages.
    pub pagename: Option<String>,
    /// Pretty-permalink path with no explicit variables.
    pub path: Option<String>,
}

impl QueryVars {
    /// Parse the query variables out of a request URI such as `/about/?p=3`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let url = parse_request_uri(uri)?;
        let mut vars = QueryVars::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "p" => vars.p = value.parse().ok(),
                "page_id" => vars.page_id = value.parse().ok(),
                "name" if !value.is_empty() => vars.name = Some(value.into_owned()),
                "pagename" if !value.is_empty() => vars.pagename = Some(value.into_owned()),
                _ => {}
            }
        }

        if vars.is_empty() {
            let path = url.path().trim_matches('/');
            if !path.is_empty() {
                vars.path = Some(path.to_string());
            }
        }
        Ok(vars)
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_none()
            && self.page_id.is_none()
            && self.name.is_none()
            && self.pagename.is_none()
            && self.path.is_none()
    }

    /// A query naming exactly one content item.
    pub fn is_singular(&self) -> bool {
        !self.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// A logged-in user of any role.
    pub authenticated: bool,
    /// An administrative screen rather than the public front end.
    pub admin: bool,
    /// Whether the query being filtered is the request's main query.
    pub main_query: bool,
    pub query: QueryVars,
    /// Raw request URI (path plus query string).
    pub request_uri: String,
}

impl RequestContext {
    /// Anonymous front-end request for `uri`.
    pub fn visitor(uri: &str) -> Result<Self> {
        Ok(Self {
            authenticated: false,
            admin: false,
            main_query: true,
            query: QueryVars::from_uri(uri)?,
            request_uri: uri.to_string(),
        })
    }

    pub fn logged_in(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn in_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn secondary_query(mut self) -> Self {
        self.main_query = false;
        self
    }

    /// Front-end request by someone who is not logged in. Every visitor-facing
    /// filter is a no-op otherwise.
    pub fn is_anonymous_front_end(&self) -> bool {
        !self.admin && !self.authenticated
    }

    pub fn is_singular(&self) -> bool {
        self.query.is_singular()
    }

    /// Path component of the request URI, `/` when empty.
    pub fn request_path(&self) -> Result<String> {
        let path = parse_request_uri(&self.request_uri)?.path().to_string();
        if path.is_empty() {
            return Ok("/".to_string());
        }
        Ok(path)
    }
}

fn parse_request_uri(uri: &str) -> Result<Url> {
    // Request URIs are relative; anchor them so the url crate can split
    // path and query. Only path and query are ever read back.
    let base = Url::parse("http://request.invalid/")?;
    Ok(base.join(uri)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_ids_are_parsed() {
        let vars = QueryVars::from_uri("/?p=12").unwrap();
        assert_eq!(vars.p, Some(12));
        assert!(vars.is_singular());

        let vars = QueryVars::from_uri("/index.php?page_id=3&utm=x").unwrap();
        assert_eq!(vars.page_id, Some(3));
        assert_eq!(vars.path, None);
    }

    #[test]
    fn slugs_are_parsed() {
        let vars = QueryVars::from_uri("/?pagename=about/team").unwrap();
        assert_eq!(vars.pagename.as_deref(), Some("about/team"));

        let vars = QueryVars::from_uri("/?name=hello-world").unwrap();
        assert_eq!(vars.name.as_deref(), Some("hello-world"));
    }

    #[test]
    fn pretty_path_becomes_path_lookup() {
        let vars = QueryVars::from_uri("/about/team/").unwrap();
        assert_eq!(vars.path.as_deref(), Some("about/team"));
    }

    #[test]
    fn front_page_is_not_singular() {
        let vars = QueryVars::from_uri("/").unwrap();
        assert!(!vars.is_singular());
        let vars = QueryVars::from_uri("/?p=not-a-number").unwrap();
        assert!(!vars.is_singular());
    }

    #[test]
    fn request_path_drops_query_string() {
        let request = RequestContext::visitor("/members/area/?ref=mail").unwrap();
        assert_eq!(request.request_path().unwrap(), "/members/area/");
        let request = RequestContext::visitor("").unwrap();
        assert_eq!(request.request_path().unwrap(), "/");
    }

    #[test]
    fn anonymous_front_end_excludes_logged_in_and_admin() {
        let request = RequestContext::visitor("/").unwrap();
        assert!(request.is_anonymous_front_end());
        assert!(!request.clone().logged_in().is_anonymous_front_end());
        assert!(!request.in_admin().is_anonymous_front_end());
    }
}
