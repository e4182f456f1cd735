//! The item invariant gate and the attribute constraint gate, checked
//! rule by rule with their deterministic messages.

mod common;

use common::{attr, make_item, seeded, task_defaults};
use trellis_core::model::{AttributeKind, AttributePatch, ItemPatch, NewAttribute, NewItem};
use trellis_core::{Error, ValidationError, item, project, settings};

#[test]
fn create_round_trips_with_trimmed_text() {
    let (conn, pid) = seeded();
    let (ty, st, lo) = task_defaults(&conn, pid);

    let mut new = NewItem::new(pid, None, ty, st, lo, "  Fix the gate  ");
    new.requirements = "hinges and screws".to_string();

    let created = item::create_item(&conn, &new).expect("create");
    assert_eq!(created.title, "Fix the gate");
    assert_eq!(created.requirements, "hinges and screws");

    let read = item::get_item(&conn, created.id).expect("read back");
    assert_eq!(read, created);
}

#[test]
fn blank_title_is_rejected_on_create_and_update() {
    let (conn, pid) = seeded();
    let (ty, st, lo) = task_defaults(&conn, pid);

    let err = item::create_item(&conn, &NewItem::new(pid, None, ty, st, lo, "   "))
        .expect_err("blank title");
    assert!(matches!(err, Error::Validation(ValidationError::EmptyTitle)));
    assert_eq!(err.to_string(), "title cannot be empty");

    let a = make_item(&conn, pid, None, "Task", "ok");
    let err = item::update_item(
        &conn,
        a.id,
        &ItemPatch {
            title: Some("  ".to_string()),
            ..ItemPatch::default()
        },
    )
    .expect_err("blank title on update");
    assert!(matches!(err, Error::Validation(ValidationError::EmptyTitle)));
}

#[test]
fn project_is_immutable_after_creation() {
    let (conn, pid) = seeded();
    let other = project::create_project(&conn, "Other").expect("create other");
    project::seed_default_attributes(&conn, other.id).expect("seed other");

    let a = make_item(&conn, pid, None, "Task", "stuck here");
    let err = item::update_item(
        &conn,
        a.id,
        &ItemPatch {
            project_id: Some(other.id),
            ..ItemPatch::default()
        },
    )
    .expect_err("project move");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ProjectImmutable)
    ));
    assert_eq!(err.to_string(), "an item cannot change project once created");
}

#[test]
fn attributes_must_belong_to_the_items_project() {
    let (conn, pid) = seeded();
    let other = project::create_project(&conn, "Other").expect("create other");
    project::seed_default_attributes(&conn, other.id).expect("seed other");

    let (ty, st, lo) = task_defaults(&conn, pid);
    let (other_ty, other_st, other_lo) = task_defaults(&conn, other.id);

    let err = item::create_item(&conn, &NewItem::new(pid, None, other_ty, st, lo, "x"))
        .expect_err("foreign type");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ForeignAttribute(AttributeKind::Type))
    ));
    assert_eq!(err.to_string(), "invalid item type choice");

    let err = item::create_item(&conn, &NewItem::new(pid, None, ty, other_st, lo, "x"))
        .expect_err("foreign status");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ForeignAttribute(AttributeKind::Status))
    ));

    let err = item::create_item(&conn, &NewItem::new(pid, None, ty, st, other_lo, "x"))
        .expect_err("foreign location");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ForeignAttribute(AttributeKind::Location))
    ));
}

#[test]
fn a_status_id_in_the_type_slot_is_a_foreign_attribute() {
    let (conn, pid) = seeded();
    let (_, st, lo) = task_defaults(&conn, pid);

    let err = item::create_item(&conn, &NewItem::new(pid, None, st, st, lo, "x"))
        .expect_err("kind mismatch");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ForeignAttribute(AttributeKind::Type))
    ));
}

#[test]
fn parent_must_share_the_project() {
    let (conn, pid) = seeded();
    let other = project::create_project(&conn, "Other").expect("create other");
    project::seed_default_attributes(&conn, other.id).expect("seed other");

    let foreign_parent = make_item(&conn, other.id, None, "Area", "over there");
    let (ty, st, lo) = task_defaults(&conn, pid);

    let err = item::create_item(
        &conn,
        &NewItem::new(pid, Some(foreign_parent.id), ty, st, lo, "x"),
    )
    .expect_err("cross-project parent");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ParentProjectMismatch)
    ));
    assert_eq!(
        err.to_string(),
        "an item must belong to the same project as its parent"
    );
}

#[test]
fn same_type_nesting_requires_a_nestable_type() {
    // Scenario D: Area is not nestable.
    let (conn, pid) = seeded();
    let a = make_item(&conn, pid, None, "Area", "outer");
    let (_, st, lo) = task_defaults(&conn, pid);
    let area = attr(&conn, pid, AttributeKind::Type, "Area").id;

    let err = item::create_item(&conn, &NewItem::new(pid, Some(a.id), area, st, lo, "inner"))
        .expect_err("area under area");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::SameTypeNotNestable)
    ));

    // Task under Task is the sanctioned same-type case.
    let t = make_item(&conn, pid, None, "Task", "outer task");
    make_item(&conn, pid, Some(t.id), "Task", "inner task");
}

#[test]
fn nesting_must_descend_the_type_ordering() {
    // Scenario E: Area (order 1) cannot nest under Epic (order 2).
    let (conn, pid) = seeded();
    let e = make_item(&conn, pid, None, "Epic", "epic");
    let (_, st, lo) = task_defaults(&conn, pid);
    let area = attr(&conn, pid, AttributeKind::Type, "Area").id;

    let err = item::create_item(&conn, &NewItem::new(pid, Some(e.id), area, st, lo, "area"))
        .expect_err("area under epic");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NestingOrder)
    ));

    // The other direction is fine: Task (order 4) under Epic (order 2).
    make_item(&conn, pid, Some(e.id), "Task", "task under epic");
}

#[test]
fn update_rechecks_nesting_when_the_type_changes() {
    let (conn, pid) = seeded();
    let e = make_item(&conn, pid, None, "Epic", "parent epic");
    let t = make_item(&conn, pid, Some(e.id), "Task", "child");
    let area = attr(&conn, pid, AttributeKind::Type, "Area").id;

    // Retyping the child to Area breaks the ordering rule even though
    // the parent link itself did not change.
    let err = item::update_item(
        &conn,
        t.id,
        &ItemPatch {
            type_id: Some(area),
            ..ItemPatch::default()
        },
    )
    .expect_err("retype above parent");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NestingOrder)
    ));
}

#[test]
fn unresolved_references_are_not_found_before_validation() {
    let (conn, pid) = seeded();
    let (ty, st, lo) = task_defaults(&conn, pid);

    let err = item::create_item(&conn, &NewItem::new(9999, None, ty, st, lo, "x"))
        .expect_err("missing project");
    assert!(matches!(err, Error::NotFound { entity: "project", .. }));

    let err = item::create_item(&conn, &NewItem::new(pid, Some(424_242), ty, st, lo, "x"))
        .expect_err("missing parent");
    assert!(matches!(err, Error::NotFound { entity: "parent", .. }));

    // A blank title AND a missing type: resolution fails first.
    let err = item::create_item(&conn, &NewItem::new(pid, None, 9999, st, lo, " "))
        .expect_err("missing type");
    assert!(matches!(err, Error::NotFound { entity: "item type", .. }));
}

#[test]
fn referenced_attribute_cannot_be_deleted() {
    let (conn, pid) = seeded();
    let a = make_item(&conn, pid, None, "Task", "holds the type");
    let task_type = attr(&conn, pid, AttributeKind::Type, "Task");

    let err = settings::delete_attribute(&conn, task_type.id).expect_err("in use");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::AttributeInUse(AttributeKind::Type))
    ));

    // Once the item is gone the entry can be removed.
    item::delete_item(&conn, a.id).expect("delete item");
    settings::delete_attribute(&conn, task_type.id).expect("delete attribute");
}

#[test]
fn attribute_update_cannot_steal_the_default_flag() {
    let (conn, pid) = seeded();
    let in_progress = attr(&conn, pid, AttributeKind::Status, "In Progress");

    let err = settings::update_attribute(
        &conn,
        in_progress.id,
        &AttributePatch {
            is_default: Some(true),
            ..AttributePatch::default()
        },
    )
    .expect_err("second default");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::DuplicateDefault(AttributeKind::Status))
    ));
    assert_eq!(
        err.to_string(),
        "there can only be one default item status within each project"
    );
}

#[test]
fn custom_attribute_extends_the_nesting_ladder() {
    let (conn, pid) = seeded();
    let (_, st, lo) = task_defaults(&conn, pid);

    // A "Subtask" type below Task in the ordering.
    let subtask = settings::create_attribute(
        &conn,
        &NewAttribute {
            project_id: pid,
            kind: AttributeKind::Type,
            name: "Subtask".to_string(),
            ord: 5,
            is_default: false,
            nestable: false,
        },
    )
    .expect("create subtask type");

    let t = make_item(&conn, pid, None, "Task", "parent task");
    item::create_item(
        &conn,
        &NewItem::new(pid, Some(t.id), subtask.id, st, lo, "nested subtask"),
    )
    .expect("subtask under task");
}
