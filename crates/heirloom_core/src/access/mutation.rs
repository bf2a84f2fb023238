//! Mutation authorizer for item, user, and message writes.
//!
//! # Responsibility
//! - Decide whether an actor may apply a given operation to a record and
//!   narrow the update to the permitted field set.
//!
//! # Invariants
//! - A disallowed request yields `allowed=false` with a reason code,
//!   never a silent partial success.
//! - Decisions are pure and idempotent: identical inputs produce
//!   identical decisions.
//!
//! # See also
//! - docs/architecture/access-model.md

use crate::model::item::Item;
use crate::model::message::Message;
use crate::model::role::Role;
use crate::model::user::Actor;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Write operation kinds adjudicated by the authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Stable reason codes attached to every denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The record is locked and the actor is not an admin.
    Locked,
    /// The actor's role never permits this operation.
    RoleForbidden,
    /// The operation is reserved to a specific record party.
    NotOwner,
}

impl DenyReason {
    /// Stable uppercase code surfaced to callers and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::RoleForbidden => "ROLE_FORBIDDEN",
            Self::NotOwner => "NOT_OWNER",
        }
    }
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable fields of an item record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemField {
    Name,
    Description,
    Barcode,
    IsLocked,
    Action,
    ActionNote,
}

/// Mutable fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserField {
    Name,
    Role,
}

/// Mutable fields of a message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageField {
    IsRead,
}

/// Outcome of one mutation authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationDecision<F: Ord> {
    pub allowed: bool,
    /// Fields the write may touch. Empty on denial.
    pub permitted_fields: BTreeSet<F>,
    /// Reason code. Present exactly on denial.
    pub reason: Option<DenyReason>,
}

impl<F: Ord> MutationDecision<F> {
    fn allow(permitted_fields: BTreeSet<F>) -> Self {
        Self {
            allowed: true,
            permitted_fields,
            reason: None,
        }
    }

    fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            permitted_fields: BTreeSet::new(),
            reason: Some(reason),
        }
    }
}

/// Authorizes one item write.
///
/// Locked items are frozen for every role except admin. Unlocked items
/// accept admin/agent updates on all requested fields; executors,
/// beneficiaries, and clients never write items. Deletion is
/// admin-only.
pub fn authorize_item(
    actor: &Actor,
    item: &Item,
    op: Operation,
    requested_fields: &BTreeSet<ItemField>,
) -> MutationDecision<ItemField> {
    match op {
        Operation::Create => match actor.role {
            Role::Admin | Role::Agent => MutationDecision::allow(requested_fields.clone()),
            Role::Executor | Role::Beneficiary | Role::Client => {
                MutationDecision::deny(DenyReason::RoleForbidden)
            }
        },
        Operation::Update => {
            if item.is_locked && actor.role != Role::Admin {
                return MutationDecision::deny(DenyReason::Locked);
            }
            match actor.role {
                Role::Admin | Role::Agent => MutationDecision::allow(requested_fields.clone()),
                Role::Executor | Role::Beneficiary | Role::Client => {
                    MutationDecision::deny(DenyReason::RoleForbidden)
                }
            }
        }
        Operation::Delete => match actor.role {
            Role::Admin => MutationDecision::allow(BTreeSet::new()),
            _ => MutationDecision::deny(DenyReason::RoleForbidden),
        },
    }
}

/// Authorizes one user-directory write. Admin-only across the board.
pub fn authorize_user(actor: &Actor, op: Operation) -> MutationDecision<UserField> {
    match (actor.role, op) {
        (Role::Admin, Operation::Delete) => MutationDecision::allow(BTreeSet::new()),
        (Role::Admin, Operation::Create | Operation::Update) => {
            MutationDecision::allow(BTreeSet::from([UserField::Name, UserField::Role]))
        }
        _ => MutationDecision::deny(DenyReason::RoleForbidden),
    }
}

/// Authorizes one message write.
///
/// Update may only flip the read flag and only by the receiver. Create
/// pins sender identity; whether the pair may correspond at all is the
/// messaging eligibility resolver's decision, taken before this one.
/// Deletion is admin-only.
pub fn authorize_message(
    actor: &Actor,
    message: &Message,
    op: Operation,
    requested_fields: &BTreeSet<MessageField>,
) -> MutationDecision<MessageField> {
    match op {
        Operation::Create => {
            if actor.id == message.sender_uuid {
                MutationDecision::allow(BTreeSet::new())
            } else {
                MutationDecision::deny(DenyReason::NotOwner)
            }
        }
        Operation::Update => {
            if actor.id != message.receiver_uuid {
                return MutationDecision::deny(DenyReason::NotOwner);
            }
            let permitted: BTreeSet<MessageField> = requested_fields
                .iter()
                .copied()
                .filter(|field| *field == MessageField::IsRead)
                .collect();
            if permitted.is_empty() {
                return MutationDecision::deny(DenyReason::RoleForbidden);
            }
            MutationDecision::allow(permitted)
        }
        Operation::Delete => match actor.role {
            Role::Admin => MutationDecision::allow(BTreeSet::new()),
            _ => MutationDecision::deny(DenyReason::RoleForbidden),
        },
    }
}
