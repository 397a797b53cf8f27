//! # Editorial Adapters
//!
//! The write side of vvc: how editors see and change the visibility flag.
//!
//! - Admin list column showing each item's own flag.
//! - Bulk-edit and quick-edit field descriptors (posts and pages only).
//! - Save handlers for bulk edit, quick edit, the classic editor meta box and
//!   the REST meta endpoint used by the block editor.
//!
//! Every write handler checks an anti-forgery token and the editor's
//! capabilities before touching the store. Bulk edit fails loudly with a
//! [`SecurityFailure`]; the per-item save handlers skip silently, since they
//! run on every save and most saves are not vvc's.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, SecurityFailure, VvcError};
use crate::model::ContentKind;
use crate::store::SiteStore;
use crate::visibility::read_flag;

pub const ADMIN_COLUMN_ID: &str = "visitor_visibility";
pub const ADMIN_COLUMN_LABEL: &str = "Visitor Visibility";

pub const BULK_EDIT_SELECT_NAME: &str = "vvc_bulk_edit_visitor_visibility";
pub const CHECKBOX_NAME: &str = "vvc_show_to_visitor";
pub const QUICK_EDIT_NONCE_FIELD: &str = "vvc_quick_edit_nonce";
pub const META_NONCE_FIELD: &str = "vvc_meta_nonce";

const CHECKBOX_LABEL: &str = "Show to visitor";
const HELP_TEXT: &str =
    "When unchecked, this content will be hidden from visitors and excluded from navigation menus.";

/// Append the visibility column to an admin list's ordered columns.
pub fn add_admin_column(columns: &mut Vec<(String, String)>) {
    match columns.iter_mut().find(|(id, _)| id == ADMIN_COLUMN_ID) {
        Some((_, label)) => *label = ADMIN_COLUMN_LABEL.to_string(),
        None => columns.push((ADMIN_COLUMN_ID.to_string(), ADMIN_COLUMN_LABEL.to_string())),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnCell {
    pub visible: bool,
}

impl ColumnCell {
    pub fn glyph(&self) -> char {
        if self.visible {
            '✓'
        } else {
            '✗'
        }
    }

    pub fn label(&self) -> &'static str {
        if self.visible {
            "Visible"
        } else {
            "Hidden"
        }
    }

    pub fn color(&self) -> &'static str {
        if self.visible {
            "green"
        } else {
            "red"
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<span style="color: {};" data-visibility="{}">{} {}</span>"#,
            self.color(),
            u8::from(self.visible),
            self.glyph(),
            self.label()
        )
    }
}

impl fmt::Display for ColumnCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}

/// Cell for `column` on item `id`. Other plugins' columns yield `None`.
///
/// The column shows the item's own flag, not the inherited answer.
pub fn column_cell<S: SiteStore + ?Sized>(
    store: &S,
    column: &str,
    id: u64,
) -> Result<Option<ColumnCell>> {
    if column != ADMIN_COLUMN_ID {
        return Ok(None);
    }
    Ok(Some(ColumnCell {
        visible: read_flag(store, id)?,
    }))
}

/// Value of the bulk-edit select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BulkChoice {
    NoChange,
    Show,
    Hide,
}

impl BulkChoice {
    pub fn value(&self) -> &'static str {
        match self {
            BulkChoice::NoChange => "-1",
            BulkChoice::Show => "1",
            BulkChoice::Hide => "0",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BulkChoice::NoChange => "— No Change —",
            BulkChoice::Show => "Show to visitors",
            BulkChoice::Hide => "Hide from visitors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkEditField {
    pub title: &'static str,
    pub select_name: &'static str,
    pub options: Vec<BulkChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickEditField {
    pub title: &'static str,
    pub nonce_field: &'static str,
    pub nonce: String,
    pub checkbox_name: &'static str,
    pub checkbox_label: &'static str,
}

fn editable_list(column: &str, post_type: &str) -> bool {
    column == ADMIN_COLUMN_ID && post_type.parse::<ContentKind>().is_ok()
}

pub fn bulk_edit_field(column: &str, post_type: &str) -> Option<BulkEditField> {
    if !editable_list(column, post_type) {
        return None;
    }
    Some(BulkEditField {
        title: ADMIN_COLUMN_LABEL,
        select_name: BULK_EDIT_SELECT_NAME,
        options: vec![BulkChoice::NoChange, BulkChoice::Show, BulkChoice::Hide],
    })
}

pub fn quick_edit_field(
    column: &str,
    post_type: &str,
    nonces: &NonceRegistry,
) -> Option<QuickEditField> {
    if !editable_list(column, post_type) {
        return None;
    }
    Some(QuickEditField {
        title: ADMIN_COLUMN_LABEL,
        nonce_field: QUICK_EDIT_NONCE_FIELD,
        nonce: nonces.issue(NonceAction::QuickEdit),
        checkbox_name: CHECKBOX_NAME,
        checkbox_label: CHECKBOX_LABEL,
    })
}

/// Classic editor meta box for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassicMetaBox {
    pub nonce_field: &'static str,
    pub nonce: String,
    pub checkbox_name: &'static str,
    pub checked: bool,
    pub label: &'static str,
    pub description: &'static str,
}

pub fn classic_meta_box<S: SiteStore + ?Sized>(
    store: &S,
    nonces: &NonceRegistry,
    id: u64,
) -> Result<ClassicMetaBox> {
    Ok(ClassicMetaBox {
        nonce_field: META_NONCE_FIELD,
        nonce: nonces.issue(NonceAction::SaveMeta),
        checkbox_name: CHECKBOX_NAME,
        checked: read_flag(store, id)?,
        label: CHECKBOX_LABEL,
        description: HELP_TEXT,
    })
}

/// Strings for the block editor's document settings panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorPanelStrings {
    pub title: &'static str,
    pub label: &'static str,
    pub help: &'static str,
}

impl Default for EditorPanelStrings {
    fn default() -> Self {
        Self {
            title: ADMIN_COLUMN_LABEL,
            label: CHECKBOX_LABEL,
            help: HELP_TEXT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonceAction {
    SaveMeta,
    QuickEdit,
    BulkEdit,
}

impl NonceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NonceAction::SaveMeta => "vvc_save_meta",
            NonceAction::QuickEdit => "vvc_quick_edit",
            NonceAction::BulkEdit => "vvc_bulk_edit",
        }
    }
}

/// Issues and checks anti-forgery tokens, each bound to one action.
///
/// Tokens stay valid for the life of the registry.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    issued: Mutex<HashMap<String, NonceAction>>,
}

impl NonceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, action: NonceAction) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.issued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.clone(), action);
        token
    }

    pub fn verify(&self, action: NonceAction, token: &str) -> bool {
        self.issued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .is_some_and(|issued| *issued == action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    EditPosts,
    EditPages,
}

impl Capability {
    /// Capability guarding REST writes of the flag for `kind`.
    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Post => Capability::EditPosts,
            ContentKind::Page => Capability::EditPages,
        }
    }
}

pub trait Permissions {
    fn can(&self, capability: Capability) -> bool;

    /// Per-item edit check.
    fn can_edit_item(&self, id: u64) -> bool;
}

/// A logged-in user with a fixed capability set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    capabilities: BTreeSet<Capability>,
    /// `None` means every item is editable.
    editable: Option<BTreeSet<u64>>,
}

impl Editor {
    pub fn administrator() -> Self {
        Self {
            capabilities: BTreeSet::from([Capability::EditPosts, Capability::EditPages]),
            editable: None,
        }
    }

    /// A user with no editing rights at all.
    pub fn subscriber() -> Self {
        Self {
            capabilities: BTreeSet::new(),
            editable: Some(BTreeSet::new()),
        }
    }

    /// Can edit posts, but only the listed items.
    pub fn author(own_items: impl IntoIterator<Item = u64>) -> Self {
        Self {
            capabilities: BTreeSet::from([Capability::EditPosts]),
            editable: Some(own_items.into_iter().collect()),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }
}

impl Permissions for Editor {
    fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn can_edit_item(&self, id: u64) -> bool {
        !self.capabilities.is_empty()
            && self
                .editable
                .as_ref()
                .is_none_or(|items| items.contains(&id))
    }
}

/// Submitted bulk-edit form. Fields are optional because the request may
/// arrive incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkEditRequest {
    pub nonce: Option<String>,
    pub post_ids: Option<Vec<u64>>,
    /// `"-1"` no change, `"1"` show, anything else hide.
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkEditOutcome {
    pub updated: Vec<u64>,
    pub skipped: Vec<u64>,
}

pub fn save_bulk_edit<S: SiteStore + ?Sized, P: Permissions + ?Sized>(
    store: &mut S,
    nonces: &NonceRegistry,
    user: &P,
    request: &BulkEditRequest,
) -> Result<BulkEditOutcome> {
    let token_ok = request
        .nonce
        .as_deref()
        .is_some_and(|token| nonces.verify(NonceAction::BulkEdit, token));
    if !token_ok {
        return Err(VvcError::Security(SecurityFailure::SecurityCheckFailed));
    }
    if !user.can(Capability::EditPosts) {
        return Err(VvcError::Security(SecurityFailure::PermissionDenied));
    }
    let (Some(ids), Some(visibility)) = (&request.post_ids, &request.visibility) else {
        return Err(VvcError::Security(SecurityFailure::MissingRequiredData));
    };
    let visibility = visibility.trim();
    if visibility == BulkChoice::NoChange.value() {
        return Err(VvcError::Security(SecurityFailure::NoChangeSelected));
    }
    let show = visibility == BulkChoice::Show.value();

    let mut outcome = BulkEditOutcome::default();
    for &id in ids {
        if user.can_edit_item(id) {
            store.set_flag(id, show)?;
            outcome.updated.push(id);
        } else {
            outcome.skipped.push(id);
        }
    }
    info!(
        updated = outcome.updated.len(),
        skipped = outcome.skipped.len(),
        show,
        "bulk edit applied"
    );
    Ok(outcome)
}

/// A single-item save carrying vvc's form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSaveRequest {
    pub nonce: Option<String>,
    /// Whether the checkbox was submitted checked.
    pub show_to_visitor: bool,
    pub autosave: bool,
}

/// Quick edit save. Returns whether the flag was written.
pub fn save_quick_edit<S: SiteStore + ?Sized, P: Permissions + ?Sized>(
    store: &mut S,
    nonces: &NonceRegistry,
    user: &P,
    id: u64,
    request: &ItemSaveRequest,
) -> Result<bool> {
    save_item_flag(store, nonces, user, id, request, NonceAction::QuickEdit)
}

/// Classic editor meta box save. Returns whether the flag was written.
pub fn save_classic_meta<S: SiteStore + ?Sized, P: Permissions + ?Sized>(
    store: &mut S,
    nonces: &NonceRegistry,
    user: &P,
    id: u64,
    request: &ItemSaveRequest,
) -> Result<bool> {
    save_item_flag(store, nonces, user, id, request, NonceAction::SaveMeta)
}

fn save_item_flag<S: SiteStore + ?Sized, P: Permissions + ?Sized>(
    store: &mut S,
    nonces: &NonceRegistry,
    user: &P,
    id: u64,
    request: &ItemSaveRequest,
    action: NonceAction,
) -> Result<bool> {
    let Some(token) = request.nonce.as_deref() else {
        return Ok(false);
    };
    if !nonces.verify(action, token) {
        debug!(item = id, action = action.as_str(), "token rejected; skipping");
        return Ok(false);
    }
    if !user.can_edit_item(id) || request.autosave {
        return Ok(false);
    }
    store.set_flag(id, request.show_to_visitor)?;
    Ok(true)
}

/// REST meta write from the block editor.
pub fn rest_update_flag<S: SiteStore + ?Sized, P: Permissions + ?Sized>(
    store: &mut S,
    user: &P,
    id: u64,
    value: bool,
) -> Result<()> {
    let item = store.get_item(id)?;
    if !user.can(Capability::for_kind(item.kind)) {
        return Err(VvcError::Security(SecurityFailure::PermissionDenied));
    }
    store.set_flag(id, value)?;
    Ok(())
}
