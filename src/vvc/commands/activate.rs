use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{ContentKind, PostStatus};
use crate::store::{ItemQuery, MetaClause, SiteStore};
use tracing::info;

use super::helpers::items_by_ids;

/// Give every published post and page that has never had a flag an explicit
/// `false`. Existing flags are left alone, so re-running is harmless.
pub fn run<S: SiteStore + ?Sized>(store: &mut S) -> Result<CmdResult> {
    let query = ItemQuery::kinds(&[ContentKind::Post, ContentKind::Page])
        .with_status(PostStatus::Publish)
        .with_meta(MetaClause::NotExists);
    let ids = store.query_ids(&query)?;

    for id in &ids {
        store.set_flag(*id, false)?;
    }
    info!(count = ids.len(), "activation backfilled visibility flags");

    let mut result = CmdResult::default().with_affected_items(items_by_ids(store, &ids)?);
    result.add_message(CmdMessage::success(format!(
        "Activated: {} item(s) set hidden by default",
        ids.len()
    )));
    Ok(result)
}
