//! Messaging eligibility resolver.
//!
//! # Responsibility
//! - Decide, per the role-pair matrix, whether a sender may open a
//!   thread with a candidate receiver.
//!
//! # Invariants
//! - Self-messaging is rejected unconditionally.
//! - Executor/beneficiary pairs require estate equality via the
//!   relationship index.
//! - An actor with no estate association has an empty scoped branch;
//!   that is an empty eligible set, not an error.
//!
//! # See also
//! - docs/architecture/access-model.md

use crate::access::relationship::RelationshipIndex;
use crate::model::estate::EstateId;
use crate::model::role::Role;
use crate::model::user::{Actor, User};

/// Decides whether `sender` may open a new thread with `receiver`.
pub fn may_open_thread(sender: &Actor, receiver: &User, index: &RelationshipIndex) -> bool {
    if sender.id == receiver.uuid {
        return false;
    }
    if receiver.is_deleted {
        return false;
    }

    match (sender.role, receiver.role) {
        (Role::Admin, _) => true,
        (Role::Agent, Role::Executor | Role::Beneficiary) => true,
        (Role::Agent, _) => false,
        (Role::Executor, Role::Agent) => true,
        (Role::Executor, Role::Beneficiary) => estates_match(
            index.estate_of_executor(sender.id),
            index.estate_of_beneficiary(receiver.uuid),
        ),
        (Role::Executor, _) => false,
        (Role::Beneficiary, Role::Executor) => estates_match(
            index.estate_of_executor(receiver.uuid),
            index.estate_of_beneficiary(sender.id),
        ),
        (Role::Beneficiary, _) => false,
        // Clients are managed entities, not active correspondents.
        (Role::Client, _) => false,
    }
}

/// Filters a candidate list down to eligible receivers for UI
/// population.
pub fn eligible_receivers<'a>(
    sender: &Actor,
    candidates: &'a [User],
    index: &RelationshipIndex,
) -> Vec<&'a User> {
    candidates
        .iter()
        .filter(|candidate| may_open_thread(sender, candidate, index))
        .collect()
}

fn estates_match(
    executor_estate: Option<EstateId>,
    beneficiary_estate: Option<EstateId>,
) -> bool {
    match (executor_estate, beneficiary_estate) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
