use crate::cache::HiddenSetCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ContentKind;
use crate::store::{ItemQuery, MetaClause, SiteStore};
use tracing::info;

/// Remove every visibility flag on posts and pages, whatever their status,
/// then drop the cached hidden-page set.
pub fn run<S: SiteStore + ?Sized>(store: &mut S, cache: &HiddenSetCache) -> Result<CmdResult> {
    let query =
        ItemQuery::kinds(&[ContentKind::Post, ContentKind::Page]).with_meta(MetaClause::Exists);
    let ids = store.query_ids(&query)?;

    let mut removed = 0;
    for id in &ids {
        if store.delete_flag(*id)? {
            removed += 1;
        }
    }
    cache.flush();
    info!(removed, "uninstall removed visibility flags");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Uninstalled: removed {} visibility flag(s)",
        removed
    )));
    Ok(result)
}
