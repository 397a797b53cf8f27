use crate::commands::{CmdResult, ItemRow};
use crate::editorial::{column_cell, ADMIN_COLUMN_ID};
use crate::error::Result;
use crate::store::SiteStore;
use crate::visibility::VisibilityResolver;

/// Admin list view: every item with its column cell and effective reach.
pub fn run<S: SiteStore + ?Sized>(store: &S, max_depth: usize) -> Result<CmdResult> {
    let resolver = VisibilityResolver::new(store).with_max_depth(max_depth);
    let mut rows = Vec::new();

    for item in store.list_items()? {
        let cell = column_cell(store, ADMIN_COLUMN_ID, item.id)?.unwrap_or_default();
        let reachable = resolver.is_visible_to_visitor(&item)?;
        rows.push(ItemRow {
            item,
            cell,
            reachable,
        });
    }

    Ok(CmdResult::default().with_listed_items(rows))
}
