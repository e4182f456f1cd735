//! Attribute option set management (Type, Status, Location entries).
//!
//! Every write passes the constraint gate before touching storage, in
//! a fixed order so the first violation yields a deterministic error:
//! empty name, duplicate name, duplicate order, second default. No
//! automatic renumbering happens on conflict; callers supply unique
//! order values and get told when they don't.

use rusqlite::{Connection, params};

use crate::db::query;
use crate::error::{Error, Result, ValidationError};
use crate::model::{AttributeEntry, AttributeKind, AttributePatch, NewAttribute};

/// Fetch an attribute entry by id.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve.
pub fn get_attribute(conn: &Connection, id: i64) -> Result<AttributeEntry> {
    query::get_attribute(conn, id)?.ok_or(Error::not_found("attribute", id))
}

/// List a project's entries of one kind, in declared order.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve.
pub fn list_attributes(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
) -> Result<Vec<AttributeEntry>> {
    require_project(conn, project_id)?;
    Ok(query::list_attributes(conn, project_id, kind)?)
}

/// Create an attribute entry after validating the scope constraints.
///
/// The name is persisted trimmed. `nestable` is only honored for
/// `kind = Type` and stored false otherwise.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve;
/// [`Error::Validation`] per the gate ordering above.
pub fn create_attribute(conn: &Connection, new: &NewAttribute) -> Result<AttributeEntry> {
    require_project(conn, new.project_id)?;

    let name = validate_entry(
        conn,
        new.project_id,
        new.kind,
        &new.name,
        new.ord,
        new.is_default,
        None,
    )?;
    let nestable = new.nestable && new.kind == AttributeKind::Type;

    conn.execute(
        "INSERT INTO item_attributes (project_id, kind, name, ord, is_default, nestable) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.project_id,
            new.kind.as_str(),
            name,
            new.ord,
            new.is_default,
            nestable
        ],
    )
    .map_err(|e| Error::Db(e.into()))?;

    let id = conn.last_insert_rowid();
    tracing::debug!(id, project_id = new.project_id, kind = new.kind.as_str(), %name, "attribute created");
    get_attribute(conn, id)
}

/// Apply a partial update to an attribute entry, re-validating the
/// merged candidate against the full constraint set (excluding the
/// entry itself).
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve;
/// [`Error::Validation`] per the gate ordering.
pub fn update_attribute(conn: &Connection, id: i64, patch: &AttributePatch) -> Result<AttributeEntry> {
    let existing = get_attribute(conn, id)?;

    let name = patch.name.clone().unwrap_or_else(|| existing.name.clone());
    let ord = patch.ord.unwrap_or(existing.ord);
    let is_default = patch.is_default.unwrap_or(existing.is_default);
    let nestable = patch.nestable.unwrap_or(existing.nestable)
        && existing.kind == AttributeKind::Type;

    let name = validate_entry(
        conn,
        existing.project_id,
        existing.kind,
        &name,
        ord,
        is_default,
        Some(id),
    )?;

    conn.execute(
        "UPDATE item_attributes SET name = ?1, ord = ?2, is_default = ?3, nestable = ?4 \
         WHERE id = ?5",
        params![name, ord, is_default, nestable, id],
    )
    .map_err(|e| Error::Db(e.into()))?;

    get_attribute(conn, id)
}

/// Delete an attribute entry, returning its last snapshot.
///
/// Restrict-on-delete: an entry still referenced by items cannot be
/// removed.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve;
/// [`ValidationError::AttributeInUse`] if items still reference it.
pub fn delete_attribute(conn: &Connection, id: i64) -> Result<AttributeEntry> {
    let existing = get_attribute(conn, id)?;

    let referencing = query::count_items_referencing(conn, &existing)?;
    if referencing > 0 {
        return Err(ValidationError::AttributeInUse(existing.kind).into());
    }

    conn.execute("DELETE FROM item_attributes WHERE id = ?1", params![id])
        .map_err(|e| Error::Db(e.into()))?;
    tracing::debug!(id, kind = existing.kind.as_str(), "attribute deleted");
    Ok(existing)
}

/// The constraint gate. Returns the trimmed name on success.
fn validate_entry(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
    name: &str,
    ord: i64,
    is_default: bool,
    exclude_id: Option<i64>,
) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    if query::attribute_name_taken(conn, project_id, kind, name, exclude_id)? {
        return Err(ValidationError::DuplicateName(kind).into());
    }

    if query::attribute_order_taken(conn, project_id, kind, ord, exclude_id)? {
        return Err(ValidationError::DuplicateOrder(kind).into());
    }

    if is_default && query::attribute_default_taken(conn, project_id, kind, exclude_id)? {
        return Err(ValidationError::DuplicateDefault(kind).into());
    }

    Ok(name.to_string())
}

fn require_project(conn: &Connection, project_id: i64) -> Result<()> {
    query::get_project(conn, project_id)?
        .map(|_| ())
        .ok_or(Error::not_found("project", project_id))
}
