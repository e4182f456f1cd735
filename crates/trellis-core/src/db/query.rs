//! Typed query helpers over the tracker database.
//!
//! Composable fetch functions for the engine's read paths: single
//! records by id, ordered listings, the bulk `(id, parent_id)` pairs
//! the traversal algorithms run on, and the existence probes backing
//! the validation gates.
//!
//! All functions take a shared `&Connection` and return
//! `anyhow::Result<T>` with typed model structs, never raw rows. Items
//! materialize in the canonical listing order: type order, then
//! creation time, then id.

use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params, types::Type};
use std::collections::HashMap;

use crate::model::{AttributeEntry, AttributeKind, Item, Project};

const ITEM_COLUMNS: &str = "i.id, i.project_id, i.parent_id, i.type_id, i.status_id, \
     i.location_id, i.title, i.changelog, i.requirements, i.outcome, \
     i.created_at_us, i.updated_at_us";

/// `ORDER BY` clause shared by every item listing: type order, then
/// oldest first, then id as the final tiebreak.
const ITEM_ORDER: &str = "ORDER BY t.ord ASC, i.created_at_us ASC, i.id ASC";

const ITEM_JOIN: &str = "FROM items i JOIN item_attributes t ON t.id = i.type_id";

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at_us: row.get(2)?,
        updated_at_us: row.get(3)?,
    })
}

fn row_to_attribute(row: &Row<'_>) -> rusqlite::Result<AttributeEntry> {
    let kind: String = row.get(2)?;
    let kind = kind
        .parse::<AttributeKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;
    Ok(AttributeEntry {
        id: row.get(0)?,
        project_id: row.get(1)?,
        kind,
        name: row.get(3)?,
        ord: row.get(4)?,
        is_default: row.get(5)?,
        nestable: row.get(6)?,
    })
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        project_id: row.get(1)?,
        parent_id: row.get(2)?,
        type_id: row.get(3)?,
        status_id: row.get(4)?,
        location_id: row.get(5)?,
        title: row.get(6)?,
        changelog: row.get(7)?,
        requirements: row.get(8)?,
        outcome: row.get(9)?,
        created_at_us: row.get(10)?,
        updated_at_us: row.get(11)?,
    })
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Fetch a single project by id. Returns `None` if it does not exist.
pub fn get_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let result = conn.query_row(
        "SELECT id, name, created_at_us, updated_at_us FROM projects WHERE id = ?1",
        params![id],
        row_to_project,
    );
    match result {
        Ok(project) => Ok(Some(project)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_project {id}")),
    }
}

/// List all projects, ordered by name then id.
pub fn list_projects(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn
        .prepare("SELECT id, name, created_at_us, updated_at_us FROM projects ORDER BY name ASC, id ASC")
        .context("prepare list_projects")?;
    let rows = stmt
        .query_map([], row_to_project)
        .context("query list_projects")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("collect list_projects")
}

// ---------------------------------------------------------------------------
// Attribute entries
// ---------------------------------------------------------------------------

/// Fetch a single attribute entry by id. Returns `None` if missing.
pub fn get_attribute(conn: &Connection, id: i64) -> Result<Option<AttributeEntry>> {
    let result = conn.query_row(
        "SELECT id, project_id, kind, name, ord, is_default, nestable \
         FROM item_attributes WHERE id = ?1",
        params![id],
        row_to_attribute,
    );
    match result {
        Ok(attr) => Ok(Some(attr)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_attribute {id}")),
    }
}

/// List a project's attribute entries of one kind, in declared order.
pub fn list_attributes(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
) -> Result<Vec<AttributeEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, project_id, kind, name, ord, is_default, nestable \
             FROM item_attributes WHERE project_id = ?1 AND kind = ?2 \
             ORDER BY ord ASC, id ASC",
        )
        .context("prepare list_attributes")?;
    let rows = stmt
        .query_map(params![project_id, kind.as_str()], row_to_attribute)
        .context("query list_attributes")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("collect list_attributes")
}

/// The default entry of one kind for a project, or `None` if unset.
pub fn default_attribute(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
) -> Result<Option<AttributeEntry>> {
    let result = conn.query_row(
        "SELECT id, project_id, kind, name, ord, is_default, nestable \
         FROM item_attributes \
         WHERE project_id = ?1 AND kind = ?2 AND is_default = 1 \
         ORDER BY ord ASC, id ASC LIMIT 1",
        params![project_id, kind.as_str()],
        row_to_attribute,
    );
    match result {
        Ok(attr) => Ok(Some(attr)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("default_attribute for project {project_id}")),
    }
}

/// Whether another entry in the {project, kind} scope already uses
/// this (trimmed) name. `exclude_id` skips the entry itself on update.
pub fn attribute_name_taken(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    scope_probe(
        conn,
        "name = ?3",
        params![project_id, kind.as_str(), name, exclude_id.unwrap_or(-1)],
    )
    .context("attribute_name_taken")
}

/// Whether another entry in the {project, kind} scope already uses
/// this order value.
pub fn attribute_order_taken(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
    ord: i64,
    exclude_id: Option<i64>,
) -> Result<bool> {
    scope_probe(
        conn,
        "ord = ?3",
        params![project_id, kind.as_str(), ord, exclude_id.unwrap_or(-1)],
    )
    .context("attribute_order_taken")
}

/// Whether another entry in the {project, kind} scope is already the
/// default.
pub fn attribute_default_taken(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM item_attributes \
             WHERE project_id = ?1 AND kind = ?2 AND is_default = 1 AND id <> ?3)",
            params![project_id, kind.as_str(), exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )
        .context("attribute_default_taken")?;
    Ok(exists)
}

fn scope_probe(
    conn: &Connection,
    condition: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM item_attributes \
         WHERE project_id = ?1 AND kind = ?2 AND {condition} AND id <> ?4)"
    );
    let exists: bool = conn.query_row(&sql, params, |row| row.get(0))?;
    Ok(exists)
}

/// Count the items whose type/status/location column references this
/// attribute entry. Backs the restrict-on-delete rule.
pub fn count_items_referencing(conn: &Connection, attr: &AttributeEntry) -> Result<usize> {
    let column = match attr.kind {
        AttributeKind::Type => "type_id",
        AttributeKind::Status => "status_id",
        AttributeKind::Location => "location_id",
    };
    let sql = format!("SELECT COUNT(*) FROM items WHERE {column} = ?1");
    let count: i64 = conn
        .query_row(&sql, params![attr.id], |row| row.get(0))
        .with_context(|| format!("count items referencing attribute {}", attr.id))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Fetch a single item by id. Returns `None` if it does not exist.
pub fn get_item(conn: &Connection, id: i64) -> Result<Option<Item>> {
    let sql = format!("SELECT {ITEM_COLUMNS} {ITEM_JOIN} WHERE i.id = ?1");
    let result = conn.query_row(&sql, params![id], row_to_item);
    match result {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_item {id}")),
    }
}

/// Bulk-fetch `(id, parent_id)` for every item in a project, in the
/// canonical listing order.
///
/// This is the single pass both traversal directions are built from:
/// the upward walk keys a child→parent map off it, the BFS keys a
/// parent→children map, and the pair order fixes sibling order at
/// each level.
pub fn parent_pairs(conn: &Connection, project_id: i64) -> Result<Vec<(i64, Option<i64>)>> {
    let sql = format!("SELECT i.id, i.parent_id {ITEM_JOIN} WHERE i.project_id = ?1 {ITEM_ORDER}");
    let mut stmt = conn.prepare(&sql).context("prepare parent_pairs")?;
    let rows = stmt
        .query_map(params![project_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .context("query parent_pairs")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("collect parent_pairs")
}

/// Direct children of an item, in the canonical listing order.
pub fn children_of(conn: &Connection, item_id: i64) -> Result<Vec<Item>> {
    let sql = format!("SELECT {ITEM_COLUMNS} {ITEM_JOIN} WHERE i.parent_id = ?1 {ITEM_ORDER}");
    collect_items(conn, &sql, params![item_id]).context("children_of")
}

/// Number of direct children of an item.
pub fn count_children(conn: &Connection, item_id: i64) -> Result<usize> {
    count(conn, "SELECT COUNT(*) FROM items WHERE parent_id = ?1", item_id)
        .context("count_children")
}

/// Every item owned by a project (flat ownership, not traversal), in
/// the canonical listing order.
pub fn project_items(conn: &Connection, project_id: i64) -> Result<Vec<Item>> {
    let sql = format!("SELECT {ITEM_COLUMNS} {ITEM_JOIN} WHERE i.project_id = ?1 {ITEM_ORDER}");
    collect_items(conn, &sql, params![project_id]).context("project_items")
}

/// Number of items owned by a project.
pub fn count_project_items(conn: &Connection, project_id: i64) -> Result<usize> {
    count(conn, "SELECT COUNT(*) FROM items WHERE project_id = ?1", project_id)
        .context("count_project_items")
}

/// A project's parentless items, in the canonical listing order.
pub fn root_items(conn: &Connection, project_id: i64) -> Result<Vec<Item>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} {ITEM_JOIN} WHERE i.project_id = ?1 AND i.parent_id IS NULL {ITEM_ORDER}"
    );
    collect_items(conn, &sql, params![project_id]).context("root_items")
}

/// Number of a project's parentless items.
pub fn count_root_items(conn: &Connection, project_id: i64) -> Result<usize> {
    count(
        conn,
        "SELECT COUNT(*) FROM items WHERE project_id = ?1 AND parent_id IS NULL",
        project_id,
    )
    .context("count_root_items")
}

/// Materialize items for a list of ids, preserving the order of `ids`.
///
/// The traversal algorithms compute id sequences (root→parent for
/// ancestors, breadth-first for descendants) whose order must survive
/// materialization, so rows are fetched into a map and re-emitted in
/// input order. Ids with no backing row are skipped.
pub fn items_by_ids_ordered(conn: &Connection, ids: &[i64]) -> Result<Vec<Item>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT {ITEM_COLUMNS} {ITEM_JOIN} WHERE i.id IN ({placeholders})");
    let mut stmt = conn.prepare(&sql).context("prepare items_by_ids_ordered")?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(ids.iter()), row_to_item)
        .context("query items_by_ids_ordered")?;

    let mut by_id: HashMap<i64, Item> = HashMap::with_capacity(ids.len());
    for row in rows {
        let item = row.context("collect items_by_ids_ordered")?;
        by_id.insert(item.id, item);
    }

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn collect_items(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_item)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn count(conn: &Connection, sql: &str, id: i64) -> Result<usize> {
    let count: i64 = conn.query_row(sql, params![id], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or(0))
}
