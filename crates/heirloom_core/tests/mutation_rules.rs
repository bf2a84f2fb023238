use heirloom_core::{
    authorize_item, authorize_message, authorize_user, Actor, DenyReason, Item, ItemField,
    Message, MessageField, Operation, Role,
};
use std::collections::BTreeSet;
use uuid::Uuid;

fn actor(role: Role) -> Actor {
    Actor::new(Uuid::new_v4(), "Test Actor", role)
}

fn all_item_fields() -> BTreeSet<ItemField> {
    BTreeSet::from([
        ItemField::Name,
        ItemField::Description,
        ItemField::Barcode,
        ItemField::IsLocked,
        ItemField::Action,
        ItemField::ActionNote,
    ])
}

#[test]
fn locked_item_update_is_denied_for_every_non_admin_role() {
    let mut item = Item::new(Uuid::new_v4(), "Sealed crate");
    item.is_locked = true;

    for role in [Role::Agent, Role::Executor, Role::Beneficiary, Role::Client] {
        let decision = authorize_item(&actor(role), &item, Operation::Update, &all_item_fields());
        assert!(!decision.allowed, "{role} must not edit a locked item");
        assert_eq!(decision.reason, Some(DenyReason::Locked));
        assert!(decision.permitted_fields.is_empty());
    }
}

#[test]
fn admin_updates_locked_items() {
    let mut item = Item::new(Uuid::new_v4(), "Sealed crate");
    item.is_locked = true;

    let decision = authorize_item(
        &actor(Role::Admin),
        &item,
        Operation::Update,
        &all_item_fields(),
    );
    assert!(decision.allowed);
    assert_eq!(decision.permitted_fields, all_item_fields());
    assert_eq!(decision.reason, None);
}

#[test]
fn agent_updates_unlocked_items_on_requested_fields() {
    let item = Item::new(Uuid::new_v4(), "Open crate");
    let requested = BTreeSet::from([ItemField::Name]);

    let decision = authorize_item(&actor(Role::Agent), &item, Operation::Update, &requested);
    assert!(decision.allowed);
    assert_eq!(decision.permitted_fields, requested);
}

#[test]
fn scoped_roles_never_update_items_even_unlocked() {
    let item = Item::new(Uuid::new_v4(), "Open crate");

    for role in [Role::Executor, Role::Beneficiary, Role::Client] {
        let decision = authorize_item(&actor(role), &item, Operation::Update, &all_item_fields());
        assert!(!decision.allowed, "{role} must not edit items");
        assert_eq!(decision.reason, Some(DenyReason::RoleForbidden));
    }
}

#[test]
fn item_create_is_allowed_for_admin_and_agent_only() {
    let item = Item::new(Uuid::new_v4(), "New arrival");

    for role in [Role::Admin, Role::Agent] {
        let decision = authorize_item(&actor(role), &item, Operation::Create, &BTreeSet::new());
        assert!(decision.allowed, "{role} must create items");
    }
    for role in [Role::Executor, Role::Beneficiary, Role::Client] {
        let decision = authorize_item(&actor(role), &item, Operation::Create, &BTreeSet::new());
        assert!(!decision.allowed, "{role} must not create items");
        assert_eq!(decision.reason, Some(DenyReason::RoleForbidden));
    }
}

#[test]
fn item_delete_is_admin_only() {
    let item = Item::new(Uuid::new_v4(), "Obsolete record");

    let admin_decision =
        authorize_item(&actor(Role::Admin), &item, Operation::Delete, &BTreeSet::new());
    assert!(admin_decision.allowed);

    for role in [Role::Agent, Role::Executor, Role::Beneficiary, Role::Client] {
        let decision = authorize_item(&actor(role), &item, Operation::Delete, &BTreeSet::new());
        assert!(!decision.allowed, "{role} must not delete items");
        assert_eq!(decision.reason, Some(DenyReason::RoleForbidden));
    }
}

#[test]
fn user_directory_writes_are_admin_only() {
    for op in [Operation::Create, Operation::Update, Operation::Delete] {
        assert!(authorize_user(&actor(Role::Admin), op).allowed);
        for role in [Role::Agent, Role::Executor, Role::Beneficiary, Role::Client] {
            let decision = authorize_user(&actor(role), op);
            assert!(!decision.allowed, "{role} must not manage users");
            assert_eq!(decision.reason, Some(DenyReason::RoleForbidden));
        }
    }
}

#[test]
fn message_read_flip_is_receiver_only() {
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let message = Message::new(sender, receiver, "ping", 1_700_000_000_000);
    let requested = BTreeSet::from([MessageField::IsRead]);

    let as_receiver = Actor::new(receiver, "Ruth", Role::Beneficiary);
    let decision = authorize_message(&as_receiver, &message, Operation::Update, &requested);
    assert!(decision.allowed);
    assert_eq!(decision.permitted_fields, requested);

    let as_sender = Actor::new(sender, "Sam", Role::Admin);
    let decision = authorize_message(&as_sender, &message, Operation::Update, &requested);
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::NotOwner));
}

#[test]
fn message_update_with_no_permissible_field_is_denied() {
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let message = Message::new(sender, receiver, "ping", 1_700_000_000_000);

    let as_receiver = Actor::new(receiver, "Ruth", Role::Beneficiary);
    let decision = authorize_message(&as_receiver, &message, Operation::Update, &BTreeSet::new());
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::RoleForbidden));
}

#[test]
fn message_create_pins_sender_identity() {
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let message = Message::new(sender, receiver, "ping", 1_700_000_000_000);

    let as_sender = Actor::new(sender, "Sam", Role::Agent);
    assert!(authorize_message(&as_sender, &message, Operation::Create, &BTreeSet::new()).allowed);

    let impostor = actor(Role::Agent);
    let decision = authorize_message(&impostor, &message, Operation::Create, &BTreeSet::new());
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::NotOwner));
}

#[test]
fn message_delete_is_admin_only() {
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let message = Message::new(sender, receiver, "ping", 1_700_000_000_000);

    assert!(
        authorize_message(&actor(Role::Admin), &message, Operation::Delete, &BTreeSet::new())
            .allowed
    );

    let as_receiver = Actor::new(receiver, "Ruth", Role::Executor);
    let decision = authorize_message(&as_receiver, &message, Operation::Delete, &BTreeSet::new());
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(DenyReason::RoleForbidden));
}

#[test]
fn authorize_is_idempotent_for_identical_inputs() {
    let mut item = Item::new(Uuid::new_v4(), "Sealed crate");
    item.is_locked = true;
    let agent = actor(Role::Agent);
    let requested = all_item_fields();

    let first = authorize_item(&agent, &item, Operation::Update, &requested);
    let second = authorize_item(&agent, &item, Operation::Update, &requested);
    assert_eq!(first, second);

    let message = Message::new(Uuid::new_v4(), Uuid::new_v4(), "ping", 1);
    let fields = BTreeSet::from([MessageField::IsRead]);
    let first = authorize_message(&agent, &message, Operation::Update, &fields);
    let second = authorize_message(&agent, &message, Operation::Update, &fields);
    assert_eq!(first, second);
}

#[test]
fn deny_reasons_expose_stable_codes() {
    assert_eq!(DenyReason::Locked.as_str(), "LOCKED");
    assert_eq!(DenyReason::RoleForbidden.as_str(), "ROLE_FORBIDDEN");
    assert_eq!(DenyReason::NotOwner.as_str(), "NOT_OWNER");
}
