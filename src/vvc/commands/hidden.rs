use crate::cache::HiddenSetCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::SiteStore;

/// The cached flat set of hidden pages, as listing filters see it.
pub fn run<S: SiteStore + ?Sized>(store: &S, cache: &HiddenSetCache) -> Result<CmdResult> {
    let ids: Vec<u64> = cache.get_hidden_page_ids(store)?.into_iter().collect();
    let mut result = CmdResult::default();
    if ids.is_empty() {
        result.add_message(CmdMessage::info("No hidden pages"));
    }
    Ok(result.with_hidden_page_ids(ids))
}
