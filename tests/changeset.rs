#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::{
    config::GenerationConfig,
    model::{Employee, EmployeeId, Roster, Shift, ShiftId, ShiftStatus, ShiftTemplate},
    ChangeConflictKind, Changeset, ChangesetError, JsonStorage, MemoryStorage, Scheduler, Storage,
};
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn day_template() -> ShiftTemplate {
    ShiftTemplate::new("day", "Day", "08:00".parse().unwrap(), "16:00".parse().unwrap(), 30)
}

fn base_roster() -> Roster {
    Roster {
        employees: vec![Employee::new("alice", "Alice"), Employee::new("bob", "Bob")],
        templates: vec![day_template()],
        ..Roster::default()
    }
}

fn shift_for(employee: &str, day: u32) -> Shift {
    Shift::from_template(&day_template(), &EmployeeId::new(employee), d(2025, 3, day))
}

/// Stockage contenant une semaine générée et commitée.
fn committed_week() -> (MemoryStorage, Vec<ShiftId>) {
    let storage = MemoryStorage::new(base_roster());
    let scheduler = Scheduler::from_roster(storage.load().unwrap());
    let config = GenerationConfig::new(d(2025, 3, 3), d(2025, 3, 7)).with_daily_staffing(1, 1);
    let result = scheduler.generate(&config).unwrap();

    let mut cs = Changeset::from_storage(&storage).unwrap();
    assert_eq!(cs.stage_generated(result.shifts).unwrap(), 5);
    assert!(cs.is_dirty());
    let plan = cs.commit(&storage).unwrap();
    assert_eq!(plan.inserts.len(), 5);
    assert!(!cs.is_dirty());

    let ids = storage.load().unwrap().shifts.into_iter().map(|s| s.id).collect();
    (storage, ids)
}

#[test]
fn commit_persists_generated_shifts() {
    let (storage, ids) = committed_week();
    let roster = storage.load().unwrap();
    assert_eq!(ids.len(), 5);
    assert!(roster.shifts.iter().all(|s| s.status == ShiftStatus::Unchanged));
    assert_eq!(roster.employees.len(), 2);
}

#[test]
fn edit_tracks_modifications_against_base() {
    let (storage, ids) = committed_week();
    let mut cs = Changeset::from_storage(&storage).unwrap();

    cs.edit(&ids[0], |s| s.notes = Some("inventaire".into())).unwrap();
    assert_eq!(cs.status(&ids[0]), Some(ShiftStatus::Modified));
    cs.edit(&ids[0], |s| s.notes = None).unwrap();
    assert_eq!(cs.status(&ids[0]), Some(ShiftStatus::Unchanged));

    let fresh = cs.add(shift_for("bob", 10)).unwrap();
    cs.edit(&fresh, |s| s.color = Some("#ff0000".into())).unwrap();
    assert_eq!(cs.status(&fresh), Some(ShiftStatus::New));

    let err = cs.edit(&ShiftId::new("nope"), |_| {}).unwrap_err();
    assert!(matches!(err, ChangesetError::UnknownShift(_)));
}

#[test]
fn remove_and_restore() {
    let (storage, ids) = committed_week();
    let mut cs = Changeset::from_storage(&storage).unwrap();

    cs.remove(&ids[1]).unwrap();
    assert_eq!(cs.status(&ids[1]), Some(ShiftStatus::Deleted));
    assert!(matches!(
        cs.edit(&ids[1], |_| {}),
        Err(ChangesetError::Deleted(_))
    ));
    cs.restore(&ids[1]).unwrap();
    assert_eq!(cs.status(&ids[1]), Some(ShiftStatus::Unchanged));
    assert!(!cs.is_dirty());

    let fresh = cs.add(shift_for("bob", 10)).unwrap();
    cs.remove(&fresh).unwrap();
    assert!(cs.get(&fresh).is_none());

    cs.remove(&ids[2]).unwrap();
    let plan = cs.commit(&storage).unwrap();
    assert_eq!(plan.deletes, vec![ids[2].clone()]);
    assert_eq!(storage.load().unwrap().shifts.len(), 4);
    assert!(cs.get(&ids[2]).is_none());
}

#[test]
fn duplicate_staging_is_rejected_atomically() {
    let mut cs = Changeset::default();
    cs.add(shift_for("alice", 3)).unwrap();
    assert!(matches!(
        cs.add(shift_for("alice", 3)),
        Err(ChangesetError::DuplicateShift(_))
    ));

    let batch = vec![shift_for("alice", 4), shift_for("alice", 3)];
    assert!(cs.stage_generated(batch).is_err());
    assert_eq!(cs.shifts().len(), 1);
}

#[test]
fn concurrent_edit_of_same_shift_conflicts() {
    let (storage, ids) = committed_week();
    let mut first = Changeset::from_storage(&storage).unwrap();
    let mut second = Changeset::from_storage(&storage).unwrap();

    first.edit(&ids[0], |s| s.notes = Some("a".into())).unwrap();
    let plan = first.commit(&storage).unwrap();
    assert_eq!(plan.updates.len(), 1);

    second.edit(&ids[0], |s| s.notes = Some("b".into())).unwrap();
    second.edit(&ids[3], |s| s.notes = Some("b".into())).unwrap();
    match second.commit(&storage) {
        Err(ChangesetError::Conflicts(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].shift_id, ids[0]);
            assert_eq!(conflicts[0].kind, ChangeConflictKind::ModifiedRemotely);
        }
        other => panic!("expected conflicts, got {other:?}"),
    }
    // rien n'a été écrit
    let stored = storage.load().unwrap();
    let untouched = stored.shifts.iter().find(|s| s.id == ids[3]).unwrap();
    assert_eq!(untouched.notes, None);
    assert_eq!(second.status(&ids[3]), Some(ShiftStatus::Modified));
}

#[test]
fn identical_concurrent_edits_merge() {
    let (storage, ids) = committed_week();
    let mut first = Changeset::from_storage(&storage).unwrap();
    let mut second = Changeset::from_storage(&storage).unwrap();

    first.edit(&ids[0], |s| s.notes = Some("same".into())).unwrap();
    second.edit(&ids[0], |s| s.notes = Some("same".into())).unwrap();
    first.commit(&storage).unwrap();
    let plan = second.commit(&storage).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn remote_deletion_conflicts_with_local_edit() {
    let (storage, ids) = committed_week();
    let mut first = Changeset::from_storage(&storage).unwrap();
    let mut second = Changeset::from_storage(&storage).unwrap();
    let mut third = Changeset::from_storage(&storage).unwrap();

    first.remove(&ids[4]).unwrap();
    first.commit(&storage).unwrap();

    second.edit(&ids[4], |s| s.notes = Some("late".into())).unwrap();
    let plan = second.reconcile(&storage.load().unwrap().shifts);
    assert_eq!(plan.conflicts[0].kind, ChangeConflictKind::DeletedRemotely);

    // double suppression : sans effet
    third.remove(&ids[4]).unwrap();
    assert!(third.commit(&storage).unwrap().is_empty());
}

#[test]
fn same_id_inserted_twice_with_different_content() {
    let storage = MemoryStorage::new(base_roster());
    let mut first = Changeset::from_storage(&storage).unwrap();
    let mut second = Changeset::from_storage(&storage).unwrap();

    first.add(shift_for("alice", 3)).unwrap();
    first.commit(&storage).unwrap();

    let mut variant = shift_for("alice", 3);
    variant.notes = Some("ouverture".into());
    second.add(variant).unwrap();
    let Err(ChangesetError::Conflicts(conflicts)) = second.commit(&storage) else {
        panic!("expected conflict");
    };
    assert_eq!(conflicts[0].kind, ChangeConflictKind::InsertedRemotely);
}

#[test]
fn json_storage_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    let storage = JsonStorage::open(&path).unwrap();
    assert!(storage.load_or_default().unwrap().employees.is_empty());
    assert!(storage.load().is_err());

    storage.save(&base_roster()).unwrap();
    let mut cs = Changeset::from_storage(&storage).unwrap();
    cs.add(shift_for("bob", 5)).unwrap();
    cs.commit(&storage).unwrap();

    let reloaded = storage.load().unwrap();
    assert_eq!(reloaded.shifts.len(), 1);
    assert_eq!(reloaded.shifts[0].employee_id.as_str(), "bob");
    assert_eq!(reloaded.shifts[0].start.to_string(), "08:00:00");
    assert_eq!(reloaded.shifts[0].status, ShiftStatus::Unchanged);
}
