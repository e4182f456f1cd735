//! Error taxonomy for the trellis core.
//!
//! Three families matter to callers:
//!
//! - [`Error::NotFound`] — a referenced id did not resolve to a record.
//! - [`Error::Validation`] — a domain rule rejected the mutation; one
//!   variant per rule so collaborator layers get deterministic,
//!   user-facing messages.
//! - [`Error::Db`] — an opaque storage failure. Not part of the domain
//!   contract; treat as fatal.
//!
//! [`Error::PermissionDenied`] is never raised here. The authorization
//! layer wraps core calls and injects it; the core only promises to
//! pass it through unchanged.

use thiserror::Error;

use crate::model::AttributeKind;

/// Result alias used across the crate's public surface.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for all core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced project/item/attribute id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: i64,
    },

    /// A domain rule rejected the mutation. Nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authorization failure, owned by the collaborator layer.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Underlying storage failure.
    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with the given entity label.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// One variant per validation rule, surfaced verbatim to callers.
///
/// The first violated rule wins; check ordering is fixed (see the
/// `settings` and `item` gates) so messages are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Attribute entry name is empty after trimming.
    #[error("name cannot be empty")]
    EmptyName,

    /// Another entry in the same {project, kind} scope has this name.
    #[error("{0} names must be unique within each project")]
    DuplicateName(AttributeKind),

    /// Another entry in the same {project, kind} scope has this order.
    #[error("{0} order must be unique within each project")]
    DuplicateOrder(AttributeKind),

    /// A default entry already exists in the {project, kind} scope.
    #[error("there can only be one default {0} within each project")]
    DuplicateDefault(AttributeKind),

    /// The entry is still referenced by items (restrict-on-delete).
    #[error("{0} is still referenced by items and cannot be deleted")]
    AttributeInUse(AttributeKind),

    /// Item title is empty after trimming.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// An item cannot move between projects after creation.
    #[error("an item cannot change project once created")]
    ProjectImmutable,

    /// The referenced attribute belongs to another project or kind.
    #[error("invalid {0} choice")]
    ForeignAttribute(AttributeKind),

    /// An item cannot be its own parent.
    #[error("an item cannot be its own parent")]
    SelfParent,

    /// Parent and child must live in the same project.
    #[error("an item must belong to the same project as its parent")]
    ParentProjectMismatch,

    /// The parent chain loops back through the item itself.
    #[error("an item cannot be its own ancestor")]
    CycleDetected,

    /// Same-type nesting is only allowed for nestable types.
    #[error("an item cannot be the same type as its parent unless it is a nestable type")]
    SameTypeNotNestable,

    /// Child type must sit strictly below the parent type in the
    /// type ordering.
    #[error("an item must be below its parent in the hierarchy unless they are of the same nestable type")]
    NestingOrder,
}

#[cfg(test)]
mod tests {
    use super::{Error, ValidationError};
    use crate::model::AttributeKind;

    #[test]
    fn validation_messages_are_user_facing() {
        let err = ValidationError::DuplicateName(AttributeKind::Type);
        assert_eq!(
            err.to_string(),
            "item type names must be unique within each project"
        );

        let err = ValidationError::CycleDetected;
        assert_eq!(err.to_string(), "an item cannot be its own ancestor");
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = Error::not_found("item", 42);
        assert_eq!(err.to_string(), "item not found: 42");
    }

    #[test]
    fn permission_denied_passes_through() {
        let err = Error::PermissionDenied("viewer role cannot edit".into());
        assert_eq!(err.to_string(), "permission denied: viewer role cannot edit");
    }
}
