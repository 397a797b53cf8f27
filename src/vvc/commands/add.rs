use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, VvcError};
use crate::model::{ContentItem, ContentKind, PostStatus};
use crate::store::SiteStore;

use super::helpers::{describe, next_item_id};

#[derive(Debug, Clone)]
pub struct NewItem {
    pub kind: ContentKind,
    pub slug: String,
    pub title: Option<String>,
    pub parent: Option<u64>,
    pub status: PostStatus,
}

/// Create a content item on the simulated site. New items carry no flag, so
/// they start out hidden.
pub fn run<S: SiteStore + ?Sized>(store: &mut S, new: NewItem) -> Result<CmdResult> {
    let slug = new.slug.trim().trim_matches('/');
    if slug.is_empty() || slug.contains('/') {
        return Err(VvcError::Api(format!("Invalid slug: {}", new.slug)));
    }

    if let Some(parent_id) = new.parent {
        if new.kind != ContentKind::Page {
            return Err(VvcError::Api("Only pages can have a parent".to_string()));
        }
        let parent = store.get_item(parent_id)?;
        if !parent.is_page() {
            return Err(VvcError::Api(format!(
                "Parent {} is not a page",
                parent_id
            )));
        }
    }

    let mut item = ContentItem::new(next_item_id(store)?, new.kind, slug).with_status(new.status);
    if let Some(title) = new.title {
        item = item.with_title(title);
    }
    if let Some(parent_id) = new.parent {
        item = item.with_parent(parent_id);
    }
    store.save_item(&item)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added {}", describe(&item))));
    Ok(result.with_affected_items(vec![item]))
}
