use crate::config::VvcConfig;
use crate::editorial::ColumnCell;
use crate::gate::ResponseState;
use crate::model::ContentItem;
use std::path::PathBuf;

pub mod activate;
pub mod add;
pub mod check;
pub mod config;
pub mod helpers;
pub mod hidden;
pub mod init;
pub mod list;
pub mod uninstall;
pub mod visibility;

/// Where a site's data lives. Store files and config share one directory.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub site: PathBuf,
}

impl SitePaths {
    pub fn new(site: impl Into<PathBuf>) -> Self {
        Self { site: site.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One row of the admin list view.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub item: ContentItem,
    /// The item's own flag, as the admin column shows it.
    pub cell: ColumnCell,
    /// Whether a visitor can actually reach it, ancestors included.
    pub reachable: bool,
}

/// What an anonymous (or logged-in) request for a URI would get back.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub uri: String,
    pub item: Option<ContentItem>,
    pub response: ResponseState,
    pub login_url: Option<String>,
    pub document_title: String,
    /// Rendered not-found template, when the response is a 404.
    pub body: Option<String>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_items: Vec<ContentItem>,
    pub listed_items: Vec<ItemRow>,
    pub hidden_page_ids: Vec<u64>,
    pub check: Option<CheckOutcome>,
    pub config: Option<VvcConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_items(mut self, items: Vec<ContentItem>) -> Self {
        self.affected_items = items;
        self
    }

    pub fn with_listed_items(mut self, rows: Vec<ItemRow>) -> Self {
        self.listed_items = rows;
        self
    }

    pub fn with_hidden_page_ids(mut self, ids: Vec<u64>) -> Self {
        self.hidden_page_ids = ids;
        self
    }

    pub fn with_check(mut self, outcome: CheckOutcome) -> Self {
        self.check = Some(outcome);
        self
    }

    pub fn with_config(mut self, config: VvcConfig) -> Self {
        self.config = Some(config);
        self
    }
}
