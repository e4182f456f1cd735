//! Domain types: projects, attribute option sets, and items.
//!
//! These structs are the snapshots handed back to collaborator layers;
//! they carry serde derives so an API layer can ship them over the wire
//! without re-mapping.

pub mod attrs;
pub mod item;

pub use attrs::{AttributeEntry, AttributeKind, AttributePatch, NewAttribute};
pub use item::{Item, ItemPatch, NewItem};

use serde::{Deserialize, Serialize};

/// A tenant container owning its own items and attribute option sets.
///
/// Deleting a project cascades to everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Non-empty, stored trimmed.
    pub name: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}
