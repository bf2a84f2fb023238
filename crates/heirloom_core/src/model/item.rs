//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical physical-item record tracked per estate.
//! - Validate item-local invariants including barcode format.
//!
//! # Invariants
//! - Every item belongs to exactly one estate.
//! - `action_note` is meaningful only when `action` is set.
//! - `is_locked=true` forbids agent/executor/beneficiary mutation
//!   regardless of other permissions; only an admin may touch a locked
//!   item.
//! - Barcode uniqueness across the store is the repository's concern,
//!   not validated here.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::estate::EstateId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for items.
pub type ItemId = Uuid;

/// Barcode labels are printed on physical tags; keep the charset narrow
/// so scans survive OCR fallback.
static BARCODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Z0-9][A-Z0-9-]{3,31}$").expect("barcode pattern compiles"));

/// Planned disposition for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Sale,
    Distribute,
    Donate,
    Other,
}

impl ItemAction {
    /// Stable string id used in persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Distribute => "distribute",
            Self::Donate => "donate",
            Self::Other => "other",
        }
    }
}

/// Parses one item action from its persisted string value.
pub fn parse_item_action(value: &str) -> Option<ItemAction> {
    match value {
        "sale" => Some(ItemAction::Sale),
        "distribute" => Some(ItemAction::Distribute),
        "donate" => Some(ItemAction::Donate),
        "other" => Some(ItemAction::Other),
        _ => None,
    }
}

/// Canonical record for one tracked physical item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable global id used for messaging references and auditing.
    pub uuid: ItemId,
    /// Owning estate. An item never moves between estates.
    pub estate_uuid: EstateId,
    /// Short human-facing label.
    pub name: String,
    /// Free-form condition/provenance notes.
    pub description: Option<String>,
    /// Printed tag code used for scan-based lookup. Unique store-wide.
    pub barcode: Option<String>,
    /// Locked items are frozen for every role except admin.
    pub is_locked: bool,
    /// Planned disposition, if decided.
    pub action: Option<ItemAction>,
    /// Disposition detail. For `distribute`, the designated
    /// beneficiary's display name.
    pub action_note: Option<String>,
    /// Soft delete tombstone to preserve audit history.
    pub is_deleted: bool,
}

impl Item {
    /// Creates a new item with a generated stable id.
    ///
    /// Optional fields start as `None`; the item starts unlocked and
    /// active.
    pub fn new(estate_uuid: EstateId, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), estate_uuid, name)
    }

    /// Creates an item with a caller-provided stable id.
    pub fn with_id(uuid: ItemId, estate_uuid: EstateId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            estate_uuid,
            name: name.into(),
            description: None,
            barcode: None,
            is_locked: false,
            action: None,
            action_note: None,
            is_deleted: false,
        }
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::BlankName);
        }
        if self.action.is_none() && self.action_note.is_some() {
            return Err(ItemValidationError::NoteWithoutAction);
        }
        if let Some(barcode) = self.barcode.as_deref() {
            if !BARCODE_PATTERN.is_match(barcode) {
                return Err(ItemValidationError::InvalidBarcode(barcode.to_string()));
            }
        }
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Item record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    BlankName,
    NoteWithoutAction,
    InvalidBarcode(String),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "item name must not be blank"),
            Self::NoteWithoutAction => {
                write!(f, "item action note requires an action to be set")
            }
            Self::InvalidBarcode(value) => write!(f, "item barcode format is invalid: {value}"),
        }
    }
}

impl Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::{parse_item_action, Item, ItemAction, ItemValidationError};
    use uuid::Uuid;

    #[test]
    fn validate_accepts_minimal_item() {
        let item = Item::new(Uuid::new_v4(), "Walnut writing desk");
        assert!(item.validate().is_ok());
        assert!(!item.is_locked);
        assert!(!item.is_deleted);
    }

    #[test]
    fn validate_rejects_note_without_action() {
        let mut item = Item::new(Uuid::new_v4(), "Silver tea set");
        item.action_note = Some("Alice".to_string());
        assert_eq!(
            item.validate(),
            Err(ItemValidationError::NoteWithoutAction)
        );
    }

    #[test]
    fn validate_enforces_barcode_format() {
        let mut item = Item::new(Uuid::new_v4(), "Grandfather clock");
        item.barcode = Some("EST-0042-CLOCK".to_string());
        assert!(item.validate().is_ok());

        item.barcode = Some("est 42".to_string());
        assert!(matches!(
            item.validate(),
            Err(ItemValidationError::InvalidBarcode(_))
        ));

        item.barcode = Some("AB".to_string());
        assert!(matches!(
            item.validate(),
            Err(ItemValidationError::InvalidBarcode(_))
        ));
    }

    #[test]
    fn action_strings_round_trip() {
        for action in [
            ItemAction::Sale,
            ItemAction::Distribute,
            ItemAction::Donate,
            ItemAction::Other,
        ] {
            assert_eq!(parse_item_action(action.as_str()), Some(action));
        }
        assert_eq!(parse_item_action("auction"), None);
    }
}
