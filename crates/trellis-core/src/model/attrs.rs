//! Project-scoped attribute option sets (Type, Status, Location).
//!
//! The three categories are structurally identical — only Type carries
//! the extra `nestable` flag — so they share one entry struct and one
//! storage table, discriminated by [`AttributeKind`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The three attribute categories assignable to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Type,
    Status,
    Location,
}

impl AttributeKind {
    /// Storage discriminant for the `kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Status => "status",
            Self::Location => "location",
        }
    }

    /// Human label used in validation messages ("item type" etc).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "item type",
            Self::Status => "item status",
            Self::Location => "item location",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AttributeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(Self::Type),
            "status" => Ok(Self::Status),
            "location" => Ok(Self::Location),
            other => Err(format!("unknown attribute kind: '{other}'")),
        }
    }
}

/// One entry of a project's attribute option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub id: i64,
    pub project_id: i64,
    pub kind: AttributeKind,
    /// Non-empty, stored trimmed, unique within {project, kind}.
    pub name: String,
    /// Signed; lower values sit closer to the root of the type
    /// hierarchy. Unique within {project, kind}.
    pub ord: i64,
    /// At most one entry per {project, kind} may be the default.
    pub is_default: bool,
    /// Whether items of this type may nest under items of the same
    /// type. Only meaningful for `kind = Type`; stored false otherwise.
    pub nestable: bool,
}

/// Input for creating an attribute entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttribute {
    pub project_id: i64,
    pub kind: AttributeKind,
    pub name: String,
    pub ord: i64,
    pub is_default: bool,
    pub nestable: bool,
}

/// Partial update for an attribute entry. Project and kind are fixed
/// at creation; absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePatch {
    pub name: Option<String>,
    pub ord: Option<i64>,
    pub is_default: Option<bool>,
    pub nestable: Option<bool>,
}

/// The default type options seeded into a fresh project.
///
/// `(name, ord, is_default, nestable)`. Task is the default and the
/// only type that may contain itself.
#[must_use]
pub fn default_types() -> Vec<NewAttributeSeed> {
    vec![
        NewAttributeSeed::new("Area", 1, false, false),
        NewAttributeSeed::new("Epic", 2, false, false),
        NewAttributeSeed::new("Feature", 3, false, false),
        NewAttributeSeed::new("Task", 4, true, true),
    ]
}

/// The default status options seeded into a fresh project.
#[must_use]
pub fn default_statuses() -> Vec<NewAttributeSeed> {
    vec![
        NewAttributeSeed::new("To Do", 1, true, false),
        NewAttributeSeed::new("In Progress", 2, false, false),
        NewAttributeSeed::new("Done", 3, false, false),
    ]
}

/// The default location options seeded into a fresh project.
#[must_use]
pub fn default_locations() -> Vec<NewAttributeSeed> {
    vec![
        NewAttributeSeed::new("Backlog", 1, true, false),
        NewAttributeSeed::new("Board", 2, false, false),
        NewAttributeSeed::new("Cleared", 3, false, false),
    ]
}

/// A seed row before it is bound to a project and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttributeSeed {
    pub name: &'static str,
    pub ord: i64,
    pub is_default: bool,
    pub nestable: bool,
}

impl NewAttributeSeed {
    const fn new(name: &'static str, ord: i64, is_default: bool, nestable: bool) -> Self {
        Self {
            name,
            ord,
            is_default,
            nestable,
        }
    }

    /// Bind this seed to a concrete project and kind.
    #[must_use]
    pub fn into_new(self, project_id: i64, kind: AttributeKind) -> NewAttribute {
        NewAttribute {
            project_id,
            kind,
            name: self.name.to_string(),
            ord: self.ord,
            is_default: self.is_default,
            nestable: self.nestable,
        }
    }
}
