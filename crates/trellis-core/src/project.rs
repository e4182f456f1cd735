//! Project lifecycle and project-level aggregate queries.
//!
//! Seeding the default attribute option sets is an explicit step
//! ([`seed_default_attributes`]) invoked by the project-creation
//! workflow, not a hidden save hook: the engine only depends on a
//! default existing per category before items can validly be created.

use rusqlite::{Connection, params};

use crate::db::{self, query};
use crate::error::{Error, Result, ValidationError};
use crate::model::{attrs, AttributeEntry, AttributeKind, Item, Project};
use crate::settings;

/// Fetch a project by id.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve.
pub fn get_project(conn: &Connection, id: i64) -> Result<Project> {
    query::get_project(conn, id)?.ok_or(Error::not_found("project", id))
}

/// List all projects, ordered by name.
///
/// # Errors
///
/// Returns [`Error::Db`] on storage failure.
pub fn list_projects(conn: &Connection) -> Result<Vec<Project>> {
    Ok(query::list_projects(conn)?)
}

/// Create a project. Does NOT seed attribute defaults; call
/// [`seed_default_attributes`] next if the project should start with
/// the documented option sets.
///
/// # Errors
///
/// [`ValidationError::EmptyName`] if the name is blank after trimming.
pub fn create_project(conn: &Connection, name: &str) -> Result<Project> {
    let name = validate_name(name)?;
    let now = db::now_us();

    conn.execute(
        "INSERT INTO projects (name, created_at_us, updated_at_us) VALUES (?1, ?2, ?3)",
        params![name, now, now],
    )
    .map_err(|e| Error::Db(e.into()))?;

    let id = conn.last_insert_rowid();
    tracing::info!(id, %name, "project created");
    get_project(conn, id)
}

/// Rename a project, re-validating the name.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve;
/// [`ValidationError::EmptyName`] if the new name is blank.
pub fn rename_project(conn: &Connection, id: i64, name: &str) -> Result<Project> {
    get_project(conn, id)?;
    let name = validate_name(name)?;

    conn.execute(
        "UPDATE projects SET name = ?1, updated_at_us = ?2 WHERE id = ?3",
        params![name, db::now_us(), id],
    )
    .map_err(|e| Error::Db(e.into()))?;

    get_project(conn, id)
}

/// Delete a project, returning its last snapshot. Storage cascades
/// remove every owned item and attribute entry.
///
/// # Errors
///
/// [`Error::NotFound`] if the id does not resolve.
pub fn delete_project(conn: &Connection, id: i64) -> Result<Project> {
    let existing = get_project(conn, id)?;

    conn.execute("DELETE FROM projects WHERE id = ?1", params![id])
        .map_err(|e| Error::Db(e.into()))?;
    tracing::info!(id, name = %existing.name, "project deleted");
    Ok(existing)
}

/// Populate a fresh project with the documented default option sets:
/// four types (Area < Epic < Feature < Task, Task nestable and
/// default), three statuses (To Do default), three locations (Backlog
/// default).
///
/// Runs in one transaction; a half-seeded project is never visible.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve;
/// [`Error::Validation`] if seeding collides with existing entries
/// (e.g. called twice).
pub fn seed_default_attributes(conn: &Connection, project_id: i64) -> Result<()> {
    get_project(conn, project_id)?;

    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| Error::Db(e.into()))?;

    let result = seed_inner(conn, project_id);
    if result.is_err() {
        // Best effort: the caller sees the original error either way.
        let _ = conn.execute_batch("ROLLBACK");
        return result;
    }

    conn.execute_batch("COMMIT")
        .map_err(|e| Error::Db(e.into()))?;
    tracing::info!(project_id, "default attribute sets seeded");
    Ok(())
}

fn seed_inner(conn: &Connection, project_id: i64) -> Result<()> {
    for seed in attrs::default_types() {
        settings::create_attribute(conn, &seed.into_new(project_id, AttributeKind::Type))?;
    }
    for seed in attrs::default_statuses() {
        settings::create_attribute(conn, &seed.into_new(project_id, AttributeKind::Status))?;
    }
    for seed in attrs::default_locations() {
        settings::create_attribute(conn, &seed.into_new(project_id, AttributeKind::Location))?;
    }
    Ok(())
}

/// The project's default entry for one attribute kind, or `None` if
/// no entry is flagged default.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve.
pub fn default_attribute(
    conn: &Connection,
    project_id: i64,
    kind: AttributeKind,
) -> Result<Option<AttributeEntry>> {
    get_project(conn, project_id)?;
    Ok(query::default_attribute(conn, project_id, kind)?)
}

/// Every item owned by the project. Flat ownership query, no
/// traversal: project containment is a plain FK, not a tree edge.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve.
pub fn get_descendants(conn: &Connection, project_id: i64) -> Result<Vec<Item>> {
    get_project(conn, project_id)?;
    Ok(query::project_items(conn, project_id)?)
}

/// Number of items owned by the project.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve.
pub fn get_num_descendants(conn: &Connection, project_id: i64) -> Result<usize> {
    get_project(conn, project_id)?;
    Ok(query::count_project_items(conn, project_id)?)
}

/// The project's parentless items, in the canonical listing order.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve.
pub fn get_children(conn: &Connection, project_id: i64) -> Result<Vec<Item>> {
    get_project(conn, project_id)?;
    Ok(query::root_items(conn, project_id)?)
}

/// Number of the project's parentless items.
///
/// # Errors
///
/// [`Error::NotFound`] if the project does not resolve.
pub fn get_num_children(conn: &Connection, project_id: i64) -> Result<usize> {
    get_project(conn, project_id)?;
    Ok(query::count_root_items(conn, project_id)?)
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn create_trims_name_and_rejects_blank() {
        let conn = db::open_in_memory().expect("open db");

        let p = create_project(&conn, "  Garden  ").expect("create");
        assert_eq!(p.name, "Garden");

        let err = create_project(&conn, "   ").expect_err("blank name");
        assert!(matches!(
            err,
            Error::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn seeding_twice_rolls_back_cleanly() {
        let conn = db::open_in_memory().expect("open db");
        let p = create_project(&conn, "P").expect("create");
        seed_default_attributes(&conn, p.id).expect("first seed");

        let err = seed_default_attributes(&conn, p.id).expect_err("second seed collides");
        assert!(matches!(err, Error::Validation(_)));

        // The failed second pass must not leave partial rows behind.
        let types = query::list_attributes(&conn, p.id, AttributeKind::Type).expect("types");
        assert_eq!(types.len(), 4);
    }

    #[test]
    fn list_projects_orders_by_name() {
        let conn = db::open_in_memory().expect("open db");
        create_project(&conn, "banana").expect("create");
        create_project(&conn, "Apple").expect("create");
        create_project(&conn, "1st").expect("create");

        let names: Vec<String> = list_projects(&conn)
            .expect("list")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["1st", "Apple", "banana"]);
    }

    #[test]
    fn default_attribute_is_none_when_unset() {
        let conn = db::open_in_memory().expect("open db");
        let p = create_project(&conn, "P").expect("create");
        let default = default_attribute(&conn, p.id, AttributeKind::Type).expect("query");
        assert!(default.is_none());
    }
}
