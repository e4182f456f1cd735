//! Shared helpers for integration tests.

#![allow(dead_code)]

use rusqlite::Connection;
use trellis_core::model::{AttributeEntry, AttributeKind, Item, NewItem};
use trellis_core::{db, item, project, settings};

/// Fresh in-memory tracker with one project carrying the default
/// attribute sets. Returns the connection and the project id.
pub fn seeded() -> (Connection, i64) {
    let conn = db::open_in_memory().expect("open in-memory db");
    let p = project::create_project(&conn, "Test Project").expect("create project");
    project::seed_default_attributes(&conn, p.id).expect("seed defaults");
    let id = p.id;
    (conn, id)
}

/// Look up an attribute entry by kind and name.
pub fn attr(conn: &Connection, project_id: i64, kind: AttributeKind, name: &str) -> AttributeEntry {
    settings::list_attributes(conn, project_id, kind)
        .expect("list attributes")
        .into_iter()
        .find(|a| a.name == name)
        .unwrap_or_else(|| panic!("no {kind} named '{name}'"))
}

/// Ids of the default Task type / To Do status / Backlog location.
pub fn task_defaults(conn: &Connection, project_id: i64) -> (i64, i64, i64) {
    (
        attr(conn, project_id, AttributeKind::Type, "Task").id,
        attr(conn, project_id, AttributeKind::Status, "To Do").id,
        attr(conn, project_id, AttributeKind::Location, "Backlog").id,
    )
}

/// Create an item of the named type with default status/location.
pub fn make_item(
    conn: &Connection,
    project_id: i64,
    parent_id: Option<i64>,
    type_name: &str,
    title: &str,
) -> Item {
    let type_id = attr(conn, project_id, AttributeKind::Type, type_name).id;
    let status_id = attr(conn, project_id, AttributeKind::Status, "To Do").id;
    let location_id = attr(conn, project_id, AttributeKind::Location, "Backlog").id;
    item::create_item(
        conn,
        &NewItem::new(project_id, parent_id, type_id, status_id, location_id, title),
    )
    .unwrap_or_else(|e| panic!("create item '{title}': {e}"))
}

/// Ids of a slice of items, in order.
pub fn ids(items: &[Item]) -> Vec<i64> {
    items.iter().map(|i| i.id).collect()
}
