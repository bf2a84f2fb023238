use heirloom_core::db::migrations::latest_version;
use heirloom_core::db::open_db_in_memory;
use heirloom_core::{
    Estate, EstateRepository, Item, ItemListQuery, ItemRepoError, ItemRepository,
    SqliteEstateRepository, SqliteItemRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seeded_estate(conn: &Connection) -> Estate {
    let estates = SqliteEstateRepository::try_new(conn).unwrap();
    let estate = Estate::new("Fixture estate");
    estates.create_estate(&estate).unwrap();
    estate
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new(estate.uuid, "Walnut writing desk");
    item.description = Some("Minor scratches on the left side".to_string());
    item.barcode = Some("EST-0001-DESK".to_string());
    let id = repo.create_item(&item).unwrap();

    let loaded = repo.get_item(id, false).unwrap().unwrap();
    assert_eq!(loaded.uuid, item.uuid);
    assert_eq!(loaded.estate_uuid, estate.uuid);
    assert_eq!(loaded.name, "Walnut writing desk");
    assert_eq!(loaded.barcode.as_deref(), Some("EST-0001-DESK"));
    assert!(!loaded.is_locked);
    assert!(!loaded.is_deleted);
}

#[test]
fn update_existing_item() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new(estate.uuid, "Draft name");
    repo.create_item(&item).unwrap();

    item.name = "Silver tea set".to_string();
    item.is_locked = true;
    repo.update_item(&item).unwrap();

    let loaded = repo.get_item(item.uuid, false).unwrap().unwrap();
    assert_eq!(loaded.name, "Silver tea set");
    assert!(loaded.is_locked);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = Item::new(estate.uuid, "Missing");
    let err = repo.update_item(&item).unwrap_err();
    assert!(matches!(err, ItemRepoError::NotFound(id) if id == item.uuid));
}

#[test]
fn duplicate_barcode_is_reported_as_barcode_in_use() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut first = Item::new(estate.uuid, "First");
    first.barcode = Some("EST-0042-TAG".to_string());
    repo.create_item(&first).unwrap();

    let mut second = Item::new(estate.uuid, "Second");
    second.barcode = Some("EST-0042-TAG".to_string());
    let err = repo.create_item(&second).unwrap_err();
    assert!(matches!(err, ItemRepoError::BarcodeInUse(code) if code == "EST-0042-TAG"));
}

#[test]
fn find_by_barcode_resolves_active_items_only() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new(estate.uuid, "Grandfather clock");
    item.barcode = Some("EST-0007-CLOCK".to_string());
    repo.create_item(&item).unwrap();

    let found = repo.find_by_barcode("EST-0007-CLOCK").unwrap().unwrap();
    assert_eq!(found.uuid, item.uuid);
    assert!(repo.find_by_barcode("EST-0000-NONE").unwrap().is_none());

    repo.soft_delete_item(item.uuid).unwrap();
    assert!(repo.find_by_barcode("EST-0007-CLOCK").unwrap().is_none());
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut invalid = Item::new(estate.uuid, "Bad barcode");
    invalid.barcode = Some("not a barcode".to_string());
    let create_err = repo.create_item(&invalid).unwrap_err();
    assert!(matches!(create_err, ItemRepoError::Validation(_)));

    let mut valid = Item::new(estate.uuid, "Good barcode");
    valid.barcode = Some("EST-0100-OK".to_string());
    repo.create_item(&valid).unwrap();

    valid.action_note = Some("note without action".to_string());
    let update_err = repo.update_item(&valid).unwrap_err();
    assert!(matches!(update_err, ItemRepoError::Validation(_)));
}

#[test]
fn list_excludes_deleted_by_default_and_can_include_them() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item_a = Item::new(estate.uuid, "Active");
    let item_b = Item::new(estate.uuid, "Deleted later");
    repo.create_item(&item_a).unwrap();
    repo.create_item(&item_b).unwrap();
    repo.soft_delete_item(item_b.uuid).unwrap();

    let visible = repo.list_items(&ItemListQuery::default()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].uuid, item_a.uuid);

    let include_deleted = ItemListQuery {
        include_deleted: true,
        ..ItemListQuery::default()
    };
    let all = repo.list_items(&include_deleted).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn list_filters_by_estate() {
    let conn = open_db_in_memory().unwrap();
    let estates = SqliteEstateRepository::try_new(&conn).unwrap();
    let first = Estate::new("First estate");
    let second = Estate::new("Second estate");
    estates.create_estate(&first).unwrap();
    estates.create_estate(&second).unwrap();

    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let in_first = Item::new(first.uuid, "Bookcase");
    let in_second = Item::new(second.uuid, "Piano");
    repo.create_item(&in_first).unwrap();
    repo.create_item(&in_second).unwrap();

    let query = ItemListQuery {
        estate: Some(first.uuid),
        ..ItemListQuery::default()
    };
    let result = repo.list_items(&query).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].uuid, in_first.uuid);
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let estate = seeded_estate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item_a = item_with_fixed_id("00000000-0000-4000-8000-000000000001", estate.uuid, "a");
    let item_b = item_with_fixed_id("00000000-0000-4000-8000-000000000002", estate.uuid, "b");
    let item_c = item_with_fixed_id("00000000-0000-4000-8000-000000000003", estate.uuid, "c");
    repo.create_item(&item_c).unwrap();
    repo.create_item(&item_a).unwrap();
    repo.create_item(&item_b).unwrap();

    conn.execute("UPDATE items SET updated_at = 1234567890000;", [])
        .unwrap();

    let query = ItemListQuery {
        include_deleted: true,
        limit: Some(2),
        offset: 1,
        ..ItemListQuery::default()
    };
    let page = repo.list_items(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].uuid, item_b.uuid);
    assert_eq!(page[1].uuid, item_c.uuid);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    match result {
        Err(ItemRepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_items_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(ItemRepoError::MissingRequiredTable("items"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_items_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE items (
            uuid TEXT PRIMARY KEY NOT NULL,
            estate_uuid TEXT NOT NULL,
            name TEXT NOT NULL,
            is_locked INTEGER NOT NULL DEFAULT 0,
            action TEXT NULL,
            action_note TEXT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(ItemRepoError::MissingRequiredColumn {
            table: "items",
            column: "barcode"
        })
    ));
}

fn item_with_fixed_id(id: &str, estate: heirloom_core::EstateId, name: &str) -> Item {
    Item::with_id(Uuid::parse_str(id).unwrap(), estate, name)
}
