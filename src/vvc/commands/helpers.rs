use crate::error::Result;
use crate::model::ContentItem;
use crate::store::SiteStore;

/// Short human label, e.g. `page 3 (members)`.
pub fn describe(item: &ContentItem) -> String {
    format!("{} {} ({})", item.kind, item.id, item.slug)
}

pub fn items_by_ids<S: SiteStore + ?Sized>(store: &S, ids: &[u64]) -> Result<Vec<ContentItem>> {
    ids.iter().map(|id| store.get_item(*id)).collect()
}

pub fn next_item_id<S: SiteStore + ?Sized>(store: &S) -> Result<u64> {
    let max = store.list_items()?.iter().map(|item| item.id).max();
    Ok(max.map_or(1, |id| id + 1))
}
