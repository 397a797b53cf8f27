use super::SiteStore;
use crate::error::{Result, VvcError};
use crate::model::{ContentItem, SHOW_TO_VISITOR_KEY};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ITEMS_FILE: &str = "items.json";
const META_FILE: &str = "meta.json";

/// Per-item meta entries, keyed by meta key.
type ItemMeta = BTreeMap<String, bool>;

/// File-backed site: content items and item meta as JSON maps. The visibility
/// flag lives under [`SHOW_TO_VISITOR_KEY`] in each item's meta.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(VvcError::Io)?;
        }
        Ok(())
    }

    fn load_map<T: DeserializeOwned>(&self, name: &str) -> Result<BTreeMap<u64, T>> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path).map_err(VvcError::Io)?;
        let map = serde_json::from_str(&content).map_err(VvcError::Serialization)?;
        Ok(map)
    }

    fn save_map<T: Serialize>(&self, name: &str, map: &BTreeMap<u64, T>) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(map).map_err(VvcError::Serialization)?;

        // Atomic write
        let tmp_file = self.root.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(VvcError::Io)?;
        fs::rename(&tmp_file, self.root.join(name)).map_err(VvcError::Io)?;
        Ok(())
    }

    fn load_items(&self) -> Result<BTreeMap<u64, ContentItem>> {
        self.load_map(ITEMS_FILE)
    }

    fn load_meta(&self) -> Result<BTreeMap<u64, ItemMeta>> {
        self.load_map(META_FILE)
    }

    fn load_flags(&self) -> Result<BTreeMap<u64, bool>> {
        Ok(self
            .load_meta()?
            .into_iter()
            .filter_map(|(id, meta)| meta.get(SHOW_TO_VISITOR_KEY).map(|flag| (id, *flag)))
            .collect())
    }
}

impl SiteStore for FileStore {
    fn get_item(&self, id: u64) -> Result<ContentItem> {
        self.find_item(id)?.ok_or(VvcError::ItemNotFound(id))
    }

    fn find_item(&self, id: u64) -> Result<Option<ContentItem>> {
        Ok(self.load_items()?.remove(&id))
    }

    fn list_items(&self) -> Result<Vec<ContentItem>> {
        Ok(self.load_items()?.into_values().collect())
    }

    fn save_item(&mut self, item: &ContentItem) -> Result<()> {
        let mut items = self.load_items()?;
        items.insert(item.id, item.clone());
        self.save_map(ITEMS_FILE, &items)
    }

    fn get_flag(&self, id: u64) -> Result<Option<bool>> {
        Ok(self
            .load_meta()?
            .get(&id)
            .and_then(|meta| meta.get(SHOW_TO_VISITOR_KEY))
            .copied())
    }

    fn set_flag(&mut self, id: u64, value: bool) -> Result<bool> {
        let mut all = self.load_meta()?;
        let meta = all.entry(id).or_default();
        if meta.get(SHOW_TO_VISITOR_KEY) == Some(&value) {
            return Ok(false);
        }
        meta.insert(SHOW_TO_VISITOR_KEY.to_string(), value);
        self.save_map(META_FILE, &all)?;
        Ok(true)
    }

    fn delete_flag(&mut self, id: u64) -> Result<bool> {
        let mut all = self.load_meta()?;
        let Some(meta) = all.get_mut(&id) else {
            return Ok(false);
        };
        if meta.remove(SHOW_TO_VISITOR_KEY).is_none() {
            return Ok(false);
        }
        if meta.is_empty() {
            all.remove(&id);
        }
        self.save_map(META_FILE, &all)?;
        Ok(true)
    }

    // One read of each file instead of a flag read per item.
    fn query_ids(&self, query: &super::ItemQuery) -> Result<Vec<u64>> {
        let flags = self.load_flags()?;
        Ok(self
            .load_items()?
            .values()
            .filter(|item| query.matches(item, flags.get(&item.id).copied()))
            .map(|item| item.id)
            .collect())
    }
}
