//! # Domain Model
//!
//! Content items are owned by the host site: vvc never creates or deletes them
//! in production, it only reads their identity, type, parent and status. The
//! one piece of state vvc owns is the per-item visibility flag, stored by the
//! host under [`SHOW_TO_VISITOR_KEY`].
//!
//! ## The Visibility Flag
//!
//! In storage the flag is tri-state:
//!
//! | Stored | Read as | Meaning |
//! |--------|---------|---------|
//! | absent | `false` | Never decided, hidden by default |
//! | `true` | `true`  | Shown to visitors |
//! | `false`| `false` | Explicitly hidden |
//!
//! Reads collapse it to a boolean (see [`crate::visibility::read_flag`]).
//! Writes are last-write-wins with no versioning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VvcError;

/// Key under which the host persists the visibility flag.
pub const SHOW_TO_VISITOR_KEY: &str = "_show_to_visitor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Page,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Page => "page",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = VvcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ContentKind::Post),
            "page" => Ok(ContentKind::Page),
            other => Err(VvcError::Api(format!("Unknown content type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Trash,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Trash => "trash",
        };
        f.write_str(s)
    }
}

impl FromStr for PostStatus {
    type Err = VvcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "private" => Ok(PostStatus::Private),
            "trash" => Ok(PostStatus::Trash),
            other => Err(VvcError::Api(format!("Unknown post status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub kind: ContentKind,
    /// Only meaningful for pages; posts are never walked upward.
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub status: PostStatus,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    pub modified_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(id: u64, kind: ContentKind, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id,
            kind,
            parent: None,
            status: PostStatus::Publish,
            title: slug.clone(),
            slug,
            modified_at: Utc::now(),
        }
    }

    pub fn post(id: u64, slug: impl Into<String>) -> Self {
        Self::new(id, ContentKind::Post, slug)
    }

    pub fn page(id: u64, slug: impl Into<String>) -> Self {
        Self::new(id, ContentKind::Page, slug)
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn is_page(&self) -> bool {
        self.kind == ContentKind::Page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_and_displays() {
        assert_eq!("page".parse::<ContentKind>().unwrap(), ContentKind::Page);
        assert_eq!(ContentKind::Post.to_string(), "post");
        assert!("attachment".parse::<ContentKind>().is_err());
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let json = r#"{"id":7,"kind":"page","slug":"about","modified_at":"2024-01-01T00:00:00Z"}"#;
        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.parent, None);
        assert_eq!(item.status, PostStatus::Publish);
        assert!(item.is_page());
    }
}
