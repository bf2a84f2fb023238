//! Visibility resolver for items, messages, and notifications.
//!
//! # Responsibility
//! - Decide whether an actor may view a record and compute display-time
//!   redaction for beneficiary item views.
//!
//! # Invariants
//! - Item visibility for admin/agent is capability-driven; executor and
//!   beneficiary visibility is estate-scoped via the relationship index.
//! - Message visibility is party-only for every role. Admin holds the
//!   `can_see_all_messages` capability but the message rule never
//!   consults it.
//! - Deterministic: no clock, no randomness, no hidden state.
//!
//! # See also
//! - docs/architecture/access-model.md

use crate::access::relationship::RelationshipIndex;
use crate::model::item::{Item, ItemAction};
use crate::model::message::Message;
use crate::model::notification::Notification;
use crate::model::role::Role;
use crate::model::user::Actor;

/// Literal shown to a beneficiary in place of another beneficiary's
/// distribution designation.
pub const DISTRIBUTION_PLACEHOLDER: &str = "DISTRIBUTION";

/// Outcome of one item visibility decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAccess {
    /// The actor must not see this item at all.
    Denied,
    /// The actor may see the item; `display_note` is the action note to
    /// render, with redaction already applied.
    Visible { display_note: Option<String> },
}

impl ItemAccess {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }
}

/// Resolves one (actor, item) visibility decision.
pub fn item_access(actor: &Actor, index: &RelationshipIndex, item: &Item) -> ItemAccess {
    if actor.role.capabilities().can_see_all_items {
        return ItemAccess::Visible {
            display_note: item.action_note.clone(),
        };
    }

    match actor.role {
        Role::Executor => match index.estate_of_executor(actor.id) {
            Some(estate) if estate == item.estate_uuid => ItemAccess::Visible {
                display_note: item.action_note.clone(),
            },
            _ => ItemAccess::Denied,
        },
        Role::Beneficiary => match index.estate_of_beneficiary(actor.id) {
            Some(estate) if estate == item.estate_uuid => ItemAccess::Visible {
                display_note: beneficiary_display_note(actor, item),
            },
            _ => ItemAccess::Denied,
        },
        // Admin/agent returned above; clients and any future scoped role
        // see nothing without an explicit rule.
        Role::Admin | Role::Agent | Role::Client => ItemAccess::Denied,
    }
}

/// Filters an item snapshot down to what the actor may see, with the
/// distribution redaction applied to each surviving record.
pub fn resolve_items(actor: &Actor, index: &RelationshipIndex, items: &[Item]) -> Vec<Item> {
    items
        .iter()
        .filter_map(|item| match item_access(actor, index, item) {
            ItemAccess::Denied => None,
            ItemAccess::Visible { display_note } => {
                let mut resolved = item.clone();
                resolved.action_note = display_note;
                Some(resolved)
            }
        })
        .collect()
}

/// Resolves one (actor, message) visibility decision.
///
/// Party-only for every role: no role grants visibility into a thread
/// the actor is not part of.
pub fn message_visible(actor: &Actor, message: &Message) -> bool {
    message.is_party(actor.id)
}

/// Filters a message snapshot down to the actor's own threads.
pub fn resolve_messages(actor: &Actor, messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter(|message| message_visible(actor, message))
        .cloned()
        .collect()
}

/// Resolves one (actor, notification) visibility decision: plain
/// ownership.
pub fn notification_visible(actor: &Actor, notification: &Notification) -> bool {
    notification.user_uuid == actor.id
}

/// A beneficiary must not learn another beneficiary's name as a
/// distribution target. The comparison is against the display name, by
/// observed product behavior; same-named beneficiaries collide.
fn beneficiary_display_note(actor: &Actor, item: &Item) -> Option<String> {
    match (&item.action, item.action_note.as_deref()) {
        (Some(ItemAction::Distribute), Some(note)) if note != actor.name => {
            Some(DISTRIBUTION_PLACEHOLDER.to_string())
        }
        _ => item.action_note.clone(),
    }
}
