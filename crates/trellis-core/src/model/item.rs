//! Item snapshots and mutation inputs.

use serde::{Deserialize, Serialize};

/// A node in a project's task hierarchy.
///
/// The project link is immutable after creation. The parent link is a
/// weak back-reference: traversal follows it, but subtree lifetime is
/// owned by the storage layer's cascade rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub project_id: i64,
    pub parent_id: Option<i64>,
    pub type_id: i64,
    pub status_id: i64,
    pub location_id: i64,
    /// Non-empty, stored trimmed.
    pub title: String,
    /// Free text; no hierarchy semantics.
    pub changelog: String,
    pub requirements: String,
    pub outcome: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// Input for creating an item. All attribute references must resolve
/// to entries owned by `project_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub project_id: i64,
    pub parent_id: Option<i64>,
    pub type_id: i64,
    pub status_id: i64,
    pub location_id: i64,
    pub title: String,
    pub changelog: String,
    pub requirements: String,
    pub outcome: String,
}

impl NewItem {
    /// A minimal item with empty free-text fields.
    #[must_use]
    pub fn new(
        project_id: i64,
        parent_id: Option<i64>,
        type_id: i64,
        status_id: i64,
        location_id: i64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            parent_id,
            type_id,
            status_id,
            location_id,
            title: title.into(),
            changelog: String::new(),
            requirements: String::new(),
            outcome: String::new(),
        }
    }
}

/// Partial update for an item. Absent fields keep their stored values.
///
/// `parent_id` is doubly optional: `None` leaves the parent untouched,
/// `Some(None)` detaches the item to the root of its project.
/// `project_id` is accepted so the gate can reject the move with a
/// deterministic error rather than silently ignoring it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub project_id: Option<i64>,
    pub parent_id: Option<Option<i64>>,
    pub type_id: Option<i64>,
    pub status_id: Option<i64>,
    pub location_id: Option<i64>,
    pub title: Option<String>,
    pub changelog: Option<String>,
    pub requirements: Option<String>,
    pub outcome: Option<String>,
}

impl ItemPatch {
    /// A patch that only moves the item under a new parent (or to the
    /// root with `None`).
    #[must_use]
    pub fn reparent(parent_id: Option<i64>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }
}
