//! Item mutations: create, update, delete, each behind the full
//! invariant gate.
//!
//! The gate always re-runs the complete rule set, not just rules
//! touched by the changed fields: a patch that only edits free text
//! still re-checks the title and attribute membership, and a parent
//! change re-runs the cycle walk against the candidate value before
//! anything is persisted. Checks run in a fixed order so the first
//! violation produces a deterministic error.
//!
//! Reference resolution happens eagerly at the top of each operation;
//! unresolvable ids surface as [`Error::NotFound`] before validation
//! begins.

use rusqlite::{Connection, params};

use crate::db::{self, query};
use crate::error::{Error, Result, ValidationError};
use crate::hierarchy;
use crate::model::{AttributeEntry, AttributeKind, Item, ItemPatch, NewItem, Project};

/// Fetch an item by id.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve.
pub fn get_item(conn: &Connection, id: i64) -> Result<Item> {
    query::get_item(conn, id)?.ok_or(Error::not_found("item", id))
}

/// Validate and persist a new item.
///
/// # Errors
///
/// [`Error::NotFound`] if project/parent/type/status/location ids do
/// not resolve; [`Error::Validation`] on any invariant violation.
pub fn create_item(conn: &Connection, new: &NewItem) -> Result<Item> {
    let project = require_project(conn, new.project_id)?;
    let type_attr = require_attribute(conn, new.type_id, AttributeKind::Type)?;
    let status_attr = require_attribute(conn, new.status_id, AttributeKind::Status)?;
    let location_attr = require_attribute(conn, new.location_id, AttributeKind::Location)?;
    let parent = resolve_parent(conn, new.parent_id)?;

    let title = validate_item(
        conn,
        None,
        None,
        &project,
        parent.as_ref(),
        &type_attr,
        &status_attr,
        &location_attr,
        &new.title,
    )?;

    let now = db::now_us();
    conn.execute(
        "INSERT INTO items (project_id, parent_id, type_id, status_id, location_id, \
         title, changelog, requirements, outcome, created_at_us, updated_at_us) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            new.project_id,
            new.parent_id,
            new.type_id,
            new.status_id,
            new.location_id,
            title,
            new.changelog,
            new.requirements,
            new.outcome,
            now,
            now
        ],
    )
    .map_err(|e| Error::Db(e.into()))?;

    let id = conn.last_insert_rowid();
    tracing::info!(id, project_id = new.project_id, %title, "item created");
    get_item(conn, id)
}

/// Apply a partial update, re-running the full invariant gate on the
/// merged candidate. On failure nothing is persisted.
///
/// # Errors
///
/// [`Error::NotFound`] if the item or any patched reference does not
/// resolve; [`Error::Validation`] on any invariant violation.
pub fn update_item(conn: &Connection, id: i64, patch: &ItemPatch) -> Result<Item> {
    let existing = get_item(conn, id)?;

    let project_id = patch.project_id.unwrap_or(existing.project_id);
    let parent_id = patch.parent_id.unwrap_or(existing.parent_id);
    let type_id = patch.type_id.unwrap_or(existing.type_id);
    let status_id = patch.status_id.unwrap_or(existing.status_id);
    let location_id = patch.location_id.unwrap_or(existing.location_id);
    let title = patch.title.clone().unwrap_or_else(|| existing.title.clone());
    let changelog = patch
        .changelog
        .clone()
        .unwrap_or_else(|| existing.changelog.clone());
    let requirements = patch
        .requirements
        .clone()
        .unwrap_or_else(|| existing.requirements.clone());
    let outcome = patch
        .outcome
        .clone()
        .unwrap_or_else(|| existing.outcome.clone());

    let project = require_project(conn, project_id)?;
    let type_attr = require_attribute(conn, type_id, AttributeKind::Type)?;
    let status_attr = require_attribute(conn, status_id, AttributeKind::Status)?;
    let location_attr = require_attribute(conn, location_id, AttributeKind::Location)?;
    let parent = resolve_parent(conn, parent_id)?;

    let title = validate_item(
        conn,
        Some(existing.id),
        Some(existing.project_id),
        &project,
        parent.as_ref(),
        &type_attr,
        &status_attr,
        &location_attr,
        &title,
    )?;

    conn.execute(
        "UPDATE items SET project_id = ?1, parent_id = ?2, type_id = ?3, status_id = ?4, \
         location_id = ?5, title = ?6, changelog = ?7, requirements = ?8, outcome = ?9, \
         updated_at_us = ?10 WHERE id = ?11",
        params![
            project_id,
            parent_id,
            type_id,
            status_id,
            location_id,
            title,
            changelog,
            requirements,
            outcome,
            db::now_us(),
            id
        ],
    )
    .map_err(|e| Error::Db(e.into()))?;

    tracing::debug!(id, "item updated");
    get_item(conn, id)
}

/// Delete an item, returning its last snapshot. The storage cascade
/// removes the whole subtree beneath it.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve.
pub fn delete_item(conn: &Connection, id: i64) -> Result<Item> {
    let existing = get_item(conn, id)?;

    conn.execute("DELETE FROM items WHERE id = ?1", params![id])
        .map_err(|e| Error::Db(e.into()))?;
    tracing::info!(id, title = %existing.title, "item deleted (subtree cascades)");
    Ok(existing)
}

// ---------------------------------------------------------------------------
// The invariant gate
// ---------------------------------------------------------------------------

/// Run the full rule set against a candidate item. Returns the trimmed
/// title on success.
///
/// `item_id` is `None` on create. `stored_project` is the project the
/// item was loaded with, used for the immutability check on update.
#[allow(clippy::too_many_arguments)]
fn validate_item(
    conn: &Connection,
    item_id: Option<i64>,
    stored_project: Option<i64>,
    project: &Project,
    parent: Option<&Item>,
    type_attr: &AttributeEntry,
    status_attr: &AttributeEntry,
    location_attr: &AttributeEntry,
    title: &str,
) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }

    if let Some(stored) = stored_project {
        if stored != project.id {
            return Err(ValidationError::ProjectImmutable.into());
        }
    }

    check_membership(type_attr, project, AttributeKind::Type)?;
    check_membership(status_attr, project, AttributeKind::Status)?;
    check_membership(location_attr, project, AttributeKind::Location)?;

    if let Some(parent) = parent {
        if item_id == Some(parent.id) {
            return Err(ValidationError::SelfParent.into());
        }

        if parent.project_id != project.id {
            return Err(ValidationError::ParentProjectMismatch.into());
        }

        // Live consistency check against the candidate parent value:
        // walking up from it must never reach this item.
        hierarchy::candidate_ancestor_ids(conn, project.id, item_id, Some(parent.id))?;

        let parent_type = require_attribute(conn, parent.type_id, AttributeKind::Type)?;
        if type_attr.id == parent_type.id {
            if !type_attr.nestable {
                return Err(ValidationError::SameTypeNotNestable.into());
            }
        } else if type_attr.ord <= parent_type.ord {
            return Err(ValidationError::NestingOrder.into());
        }
    }

    Ok(title.to_string())
}

/// An attribute reference is valid only if the entry is of the
/// expected kind and owned by the item's project.
fn check_membership(
    attr: &AttributeEntry,
    project: &Project,
    expected: AttributeKind,
) -> Result<()> {
    if attr.kind != expected || attr.project_id != project.id {
        return Err(ValidationError::ForeignAttribute(expected).into());
    }
    Ok(())
}

fn require_project(conn: &Connection, id: i64) -> Result<Project> {
    query::get_project(conn, id)?.ok_or(Error::not_found("project", id))
}

fn require_attribute(conn: &Connection, id: i64, kind: AttributeKind) -> Result<AttributeEntry> {
    query::get_attribute(conn, id)?.ok_or(Error::NotFound {
        entity: kind.label(),
        id,
    })
}

fn resolve_parent(conn: &Connection, parent_id: Option<i64>) -> Result<Option<Item>> {
    match parent_id {
        None => Ok(None),
        Some(id) => Ok(Some(
            query::get_item(conn, id)?.ok_or(Error::not_found("parent", id))?,
        )),
    }
}
