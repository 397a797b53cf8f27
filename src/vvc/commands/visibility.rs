use crate::commands::{CmdMessage, CmdResult};
use crate::editorial::{
    save_bulk_edit, BulkChoice, BulkEditRequest, NonceAction, NonceRegistry, Permissions,
};
use crate::error::Result;
use crate::store::SiteStore;

use super::helpers::{describe, items_by_ids};

/// Show or hide items through the bulk-edit path, as `user`.
pub fn run<S: SiteStore + ?Sized, P: Permissions + ?Sized>(
    store: &mut S,
    nonces: &NonceRegistry,
    user: &P,
    ids: &[u64],
    show: bool,
) -> Result<CmdResult> {
    // Unknown ids fail the whole batch before anything is written.
    let items = items_by_ids(store, ids)?;

    let choice = if show { BulkChoice::Show } else { BulkChoice::Hide };
    let request = BulkEditRequest {
        nonce: Some(nonces.issue(NonceAction::BulkEdit)),
        post_ids: Some(ids.to_vec()),
        visibility: Some(choice.value().to_string()),
    };
    let outcome = save_bulk_edit(store, nonces, user, &request)?;

    let verb = if show { "visible to" } else { "hidden from" };
    let mut result = CmdResult::default();
    let mut affected = Vec::new();
    for item in items {
        if outcome.updated.contains(&item.id) {
            result.add_message(CmdMessage::success(format!(
                "{} is now {} visitors",
                describe(&item),
                verb
            )));
            affected.push(item);
        } else {
            result.add_message(CmdMessage::warning(format!(
                "Skipped {}: not editable",
                describe(&item)
            )));
        }
    }
    Ok(result.with_affected_items(affected))
}
