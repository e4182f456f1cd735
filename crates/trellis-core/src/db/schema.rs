//! Canonical SQLite schema for the tracker.
//!
//! Ownership lifetimes live in the schema:
//! - `projects` own `item_attributes` and `items` via FK cascade
//! - `items.parent_id` cascades so deleting an item removes its subtree
//! - attribute FKs on items deliberately do NOT cascade; the settings
//!   gate enforces restrict-on-delete with a domain error first, and
//!   the plain FK is the backstop
//!
//! Uniqueness of attribute name/order/default within {project, kind} is
//! enforced by the validation gates, not by UNIQUE constraints, so the
//! first violated rule surfaces as a deterministic domain error.

/// Migration v1: core tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS item_attributes (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    kind TEXT NOT NULL CHECK (kind IN ('type', 'status', 'location')),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    ord INTEGER NOT NULL,
    is_default INTEGER NOT NULL DEFAULT 0 CHECK (is_default IN (0, 1)),
    nestable INTEGER NOT NULL DEFAULT 0 CHECK (nestable IN (0, 1))
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    parent_id INTEGER REFERENCES items(id) ON DELETE CASCADE,
    type_id INTEGER NOT NULL REFERENCES item_attributes(id),
    status_id INTEGER NOT NULL REFERENCES item_attributes(id),
    location_id INTEGER NOT NULL REFERENCES item_attributes(id),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    changelog TEXT NOT NULL DEFAULT '',
    requirements TEXT NOT NULL DEFAULT '',
    outcome TEXT NOT NULL DEFAULT '',
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);
";

/// Migration v2: read-path indexes for the traversal queries.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_attributes_project_kind_ord
    ON item_attributes(project_id, kind, ord);

CREATE INDEX IF NOT EXISTS idx_items_project
    ON items(project_id);

CREATE INDEX IF NOT EXISTS idx_items_parent
    ON items(parent_id);

CREATE INDEX IF NOT EXISTS idx_items_type
    ON items(type_id);

CREATE INDEX IF NOT EXISTS idx_items_status
    ON items(status_id);

CREATE INDEX IF NOT EXISTS idx_items_location
    ON items(location_id);
";
