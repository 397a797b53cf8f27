use super::SiteStore;
use crate::error::{Result, VvcError};
use crate::model::ContentItem;
use std::collections::BTreeMap;

/// In-memory site for testing and embedding.
///
/// `flag_writes` counts writes that actually changed a stored flag, which lets
/// tests observe that repeating a write has no side effect.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: BTreeMap<u64, ContentItem>,
    flags: BTreeMap<u64, bool>,
    flag_writes: usize,
    simulate_write_error: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<ContentItem>) -> Self {
        let mut store = Self::new();
        for item in items {
            store.items.insert(item.id, item);
        }
        store
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    pub fn flag_writes(&self) -> usize {
        self.flag_writes
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error {
            return Err(VvcError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl SiteStore for InMemoryStore {
    fn get_item(&self, id: u64) -> Result<ContentItem> {
        self.items
            .get(&id)
            .cloned()
            .ok_or(VvcError::ItemNotFound(id))
    }

    fn find_item(&self, id: u64) -> Result<Option<ContentItem>> {
        Ok(self.items.get(&id).cloned())
    }

    fn list_items(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.values().cloned().collect())
    }

    fn save_item(&mut self, item: &ContentItem) -> Result<()> {
        self.check_writable()?;
        self.items.insert(item.id, item.clone());
        Ok(())
    }

    fn get_flag(&self, id: u64) -> Result<Option<bool>> {
        Ok(self.flags.get(&id).copied())
    }

    fn set_flag(&mut self, id: u64, value: bool) -> Result<bool> {
        self.check_writable()?;
        if self.flags.get(&id) == Some(&value) {
            return Ok(false);
        }
        self.flags.insert(id, value);
        self.flag_writes += 1;
        Ok(true)
    }

    fn delete_flag(&mut self, id: u64) -> Result<bool> {
        self.check_writable()?;
        Ok(self.flags.remove(&id).is_some())
    }
}
