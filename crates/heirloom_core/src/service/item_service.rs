//! Item use-case service.
//!
//! # Responsibility
//! - Serve visibility-filtered, redacted item views per actor.
//! - Gate item writes through the mutation authorizer before any
//!   repository call.
//!
//! # Invariants
//! - Reads build a fresh relationship index from the estate snapshot;
//!   nothing is cached across requests.
//! - Scoped roles receive redacted clones; the persisted record is
//!   never modified by a read.

use crate::access::mutation::{authorize_item, DenyReason, ItemField, Operation};
use crate::access::relationship::{DataIntegrityError, RelationshipIndex};
use crate::access::visibility::{item_access, resolve_items, ItemAccess};
use crate::model::item::{Item, ItemId};
use crate::model::user::Actor;
use crate::repo::estate_repo::{EstateRepoError, EstateRepository};
use crate::repo::item_repo::{ItemListQuery, ItemRepoError, ItemRepository};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from item use-case operations.
#[derive(Debug)]
pub enum ItemServiceError {
    /// The actor may not perform this operation on this item.
    AccessDenied(DenyReason),
    ItemNotFound(ItemId),
    /// The estate snapshot failed integrity checks.
    Integrity(DataIntegrityError),
    Repo(ItemRepoError),
    EstateRepo(EstateRepoError),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied(reason) => write!(f, "access denied: {reason}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Integrity(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::EstateRepo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integrity(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::EstateRepo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemRepoError> for ItemServiceError {
    fn from(value: ItemRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<EstateRepoError> for ItemServiceError {
    fn from(value: EstateRepoError) -> Self {
        Self::EstateRepo(value)
    }
}

impl From<DataIntegrityError> for ItemServiceError {
    fn from(value: DataIntegrityError) -> Self {
        Self::Integrity(value)
    }
}

/// Use-case service for item reads and writes.
pub struct ItemService<I: ItemRepository, E: EstateRepository> {
    items: I,
    estates: E,
}

impl<I: ItemRepository, E: EstateRepository> ItemService<I, E> {
    pub fn new(items: I, estates: E) -> Self {
        Self { items, estates }
    }

    /// Lists the items the actor may see, redaction applied.
    pub fn list_items_for(&self, actor: &Actor) -> Result<Vec<Item>, ItemServiceError> {
        let index = self.build_index()?;
        let items = self.items.list_items(&ItemListQuery::default())?;
        Ok(resolve_items(actor, &index, &items))
    }

    /// Gets one item if the actor may see it, redaction applied.
    ///
    /// A hidden item is indistinguishable from a missing one.
    pub fn get_item_for(
        &self,
        actor: &Actor,
        id: ItemId,
    ) -> Result<Option<Item>, ItemServiceError> {
        let Some(item) = self.items.get_item(id, false)? else {
            return Ok(None);
        };

        let index = self.build_index()?;
        match item_access(actor, &index, &item) {
            ItemAccess::Denied => Ok(None),
            ItemAccess::Visible { display_note } => {
                let mut resolved = item;
                resolved.action_note = display_note;
                Ok(Some(resolved))
            }
        }
    }

    /// Scan-based lookup: resolves a barcode to an item the actor may
    /// see, redaction applied.
    pub fn find_by_barcode_for(
        &self,
        actor: &Actor,
        barcode: &str,
    ) -> Result<Option<Item>, ItemServiceError> {
        let Some(item) = self.items.find_by_barcode(barcode)? else {
            return Ok(None);
        };

        let index = self.build_index()?;
        match item_access(actor, &index, &item) {
            ItemAccess::Denied => Ok(None),
            ItemAccess::Visible { display_note } => {
                let mut resolved = item;
                resolved.action_note = display_note;
                Ok(Some(resolved))
            }
        }
    }

    /// Creates an item after authorizing the actor.
    pub fn create_item(&self, actor: &Actor, item: &Item) -> Result<ItemId, ItemServiceError> {
        let decision = authorize_item(actor, item, Operation::Create, &BTreeSet::new());
        if !decision.allowed {
            return Err(deny(actor, "item_create", decision.reason));
        }

        let id = self.items.create_item(item)?;
        info!(
            "event=item_created module=service status=ok item={id} estate={} actor_role={}",
            item.estate_uuid, actor.role
        );
        Ok(id)
    }

    /// Applies a full-record update after authorizing the requested
    /// field set.
    pub fn update_item(
        &self,
        actor: &Actor,
        item: &Item,
        requested_fields: &BTreeSet<ItemField>,
    ) -> Result<(), ItemServiceError> {
        let current = self
            .items
            .get_item(item.uuid, true)?
            .ok_or(ItemServiceError::ItemNotFound(item.uuid))?;

        let decision = authorize_item(actor, &current, Operation::Update, requested_fields);
        if !decision.allowed {
            return Err(deny(actor, "item_update", decision.reason));
        }

        self.items.update_item(item)?;
        Ok(())
    }

    /// Locks an item against non-admin mutation.
    pub fn lock_item(&self, actor: &Actor, id: ItemId) -> Result<(), ItemServiceError> {
        self.set_locked(actor, id, true)
    }

    /// Unlocks an item. Only an admin passes the locked-update rule.
    pub fn unlock_item(&self, actor: &Actor, id: ItemId) -> Result<(), ItemServiceError> {
        self.set_locked(actor, id, false)
    }

    /// Soft-deletes an item. Admin-only.
    pub fn soft_delete_item(&self, actor: &Actor, id: ItemId) -> Result<(), ItemServiceError> {
        let item = self
            .items
            .get_item(id, true)?
            .ok_or(ItemServiceError::ItemNotFound(id))?;

        let decision = authorize_item(actor, &item, Operation::Delete, &BTreeSet::new());
        if !decision.allowed {
            return Err(deny(actor, "item_delete", decision.reason));
        }

        self.items.soft_delete_item(id)?;
        Ok(())
    }

    fn set_locked(&self, actor: &Actor, id: ItemId, locked: bool) -> Result<(), ItemServiceError> {
        let mut item = self
            .items
            .get_item(id, true)?
            .ok_or(ItemServiceError::ItemNotFound(id))?;

        let requested = BTreeSet::from([ItemField::IsLocked]);
        let decision = authorize_item(actor, &item, Operation::Update, &requested);
        if !decision.allowed {
            return Err(deny(actor, "item_lock", decision.reason));
        }

        item.is_locked = locked;
        self.items.update_item(&item)?;
        Ok(())
    }

    fn build_index(&self) -> Result<RelationshipIndex, ItemServiceError> {
        let snapshot = self.estates.load_snapshot()?;
        Ok(RelationshipIndex::build(&snapshot)?)
    }
}

fn deny(actor: &Actor, operation: &str, reason: Option<DenyReason>) -> ItemServiceError {
    let reason = reason.unwrap_or(DenyReason::RoleForbidden);
    warn!(
        "event=access_denied module=service operation={operation} actor_role={} reason={reason}",
        actor.role
    );
    ItemServiceError::AccessDenied(reason)
}
