use heirloom_core::{DataIntegrityError, Estate, IndexDiagnostic, RelationshipIndex};
use uuid::Uuid;

fn estate_with_fixed_id(id: &str, name: &str) -> Estate {
    Estate::with_id(Uuid::parse_str(id).unwrap(), name)
}

#[test]
fn build_maps_executors_and_beneficiaries_to_their_estates() {
    let executor = Uuid::new_v4();
    let beneficiary_a = Uuid::new_v4();
    let beneficiary_b = Uuid::new_v4();

    let mut estate = Estate::new("Ellington estate");
    estate.executor_uuid = Some(executor);
    estate.beneficiary_uuids = vec![beneficiary_a, beneficiary_b];

    let index = RelationshipIndex::build(&[estate.clone()]).unwrap();

    assert_eq!(index.estate_of_executor(executor), Some(estate.uuid));
    assert_eq!(index.estate_of_beneficiary(beneficiary_a), Some(estate.uuid));
    assert_eq!(index.estate_of_beneficiary(beneficiary_b), Some(estate.uuid));
    assert!(index.diagnostics().is_empty());
}

#[test]
fn build_returns_none_for_unassociated_users() {
    let estate = Estate::new("Empty estate");
    let index = RelationshipIndex::build(&[estate]).unwrap();

    let stranger = Uuid::new_v4();
    assert_eq!(index.estate_of_executor(stranger), None);
    assert_eq!(index.estate_of_beneficiary(stranger), None);
}

#[test]
fn duplicate_estate_ids_fail_the_build() {
    let first = estate_with_fixed_id("00000000-0000-4000-8000-000000000001", "a");
    let duplicate = estate_with_fixed_id("00000000-0000-4000-8000-000000000001", "b");

    let err = RelationshipIndex::build(&[first.clone(), duplicate]).unwrap_err();
    assert_eq!(err, DataIntegrityError::DuplicateEstateId(first.uuid));
}

#[test]
fn dangling_user_references_are_retained_without_crashing() {
    // Referential integrity against the user directory is the store's
    // job; the index keeps whatever ids the snapshot carries.
    let ghost_executor = Uuid::new_v4();
    let ghost_beneficiary = Uuid::new_v4();

    let mut estate = Estate::new("Orphaned estate");
    estate.executor_uuid = Some(ghost_executor);
    estate.beneficiary_uuids = vec![ghost_beneficiary];

    let index = RelationshipIndex::build(&[estate.clone()]).unwrap();
    assert_eq!(index.estate_of_executor(ghost_executor), Some(estate.uuid));
    assert_eq!(
        index.estate_of_beneficiary(ghost_beneficiary),
        Some(estate.uuid)
    );
}

#[test]
fn conflicting_executor_assignment_keeps_first_and_records_diagnostic() {
    let executor = Uuid::new_v4();

    let mut first = estate_with_fixed_id("00000000-0000-4000-8000-000000000001", "first");
    first.executor_uuid = Some(executor);
    let mut second = estate_with_fixed_id("00000000-0000-4000-8000-000000000002", "second");
    second.executor_uuid = Some(executor);

    let index = RelationshipIndex::build(&[first.clone(), second.clone()]).unwrap();

    assert_eq!(index.estate_of_executor(executor), Some(first.uuid));
    assert_eq!(
        index.diagnostics(),
        &[IndexDiagnostic::ConflictingExecutor {
            user: executor,
            kept: first.uuid,
            ignored: second.uuid,
        }]
    );
}

#[test]
fn conflicting_beneficiary_membership_keeps_first_and_records_diagnostic() {
    let beneficiary = Uuid::new_v4();

    let mut first = estate_with_fixed_id("00000000-0000-4000-8000-000000000001", "first");
    first.beneficiary_uuids = vec![beneficiary];
    let mut second = estate_with_fixed_id("00000000-0000-4000-8000-000000000002", "second");
    second.beneficiary_uuids = vec![beneficiary];

    let index = RelationshipIndex::build(&[first.clone(), second.clone()]).unwrap();

    assert_eq!(index.estate_of_beneficiary(beneficiary), Some(first.uuid));
    assert_eq!(
        index.diagnostics(),
        &[IndexDiagnostic::ConflictingBeneficiary {
            user: beneficiary,
            kept: first.uuid,
            ignored: second.uuid,
        }]
    );
}

#[test]
fn build_is_deterministic_for_identical_snapshots() {
    let executor = Uuid::new_v4();
    let mut estate = Estate::new("Stable estate");
    estate.executor_uuid = Some(executor);
    let snapshot = vec![estate];

    let first = RelationshipIndex::build(&snapshot).unwrap();
    let second = RelationshipIndex::build(&snapshot).unwrap();

    assert_eq!(
        first.estate_of_executor(executor),
        second.estate_of_executor(executor)
    );
    assert_eq!(first.diagnostics(), second.diagnostics());
}
