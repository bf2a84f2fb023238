use heirloom_core::{Estate, Item, ItemAction, Message, Role, User};
use serde_json::json;
use uuid::Uuid;

#[test]
fn role_serializes_to_uppercase_wire_strings() {
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("ADMIN"));
    assert_eq!(
        serde_json::to_value(Role::Beneficiary).unwrap(),
        json!("BENEFICIARY")
    );

    let parsed: Role = serde_json::from_value(json!("EXECUTOR")).unwrap();
    assert_eq!(parsed, Role::Executor);

    assert!(serde_json::from_value::<Role>(json!("executor")).is_err());
}

#[test]
fn item_action_serializes_to_snake_case() {
    assert_eq!(
        serde_json::to_value(ItemAction::Distribute).unwrap(),
        json!("distribute")
    );
    let parsed: ItemAction = serde_json::from_value(json!("sale")).unwrap();
    assert_eq!(parsed, ItemAction::Sale);
}

#[test]
fn item_round_trips_through_json() {
    let mut item = Item::new(Uuid::new_v4(), "Pocket watch");
    item.action = Some(ItemAction::Distribute);
    item.action_note = Some("Alice".to_string());
    item.barcode = Some("EST-0001-WATCH".to_string());

    let encoded = serde_json::to_string(&item).unwrap();
    let decoded: Item = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, item);
}

#[test]
fn user_and_estate_round_trip_through_json() {
    let user = User::new("Dana", Role::Executor);
    let decoded: User =
        serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
    assert_eq!(decoded, user);

    let mut estate = Estate::new("Harper estate");
    estate.executor_uuid = Some(user.uuid);
    let decoded: Estate =
        serde_json::from_str(&serde_json::to_string(&estate).unwrap()).unwrap();
    assert_eq!(decoded, estate);
}

#[test]
fn message_json_shape_is_stable() {
    let message = Message::new(Uuid::new_v4(), Uuid::new_v4(), "hello", 1_700_000_000_000);
    let value = serde_json::to_value(&message).unwrap();

    assert!(value.get("sender_uuid").is_some());
    assert!(value.get("receiver_uuid").is_some());
    assert_eq!(value.get("is_read"), Some(&json!(false)));
    assert_eq!(
        value.get("sent_at_epoch_ms"),
        Some(&json!(1_700_000_000_000_i64))
    );
}
