//! trellis-core: data model, validation gates, and hierarchy traversal
//! for a multi-tenant task tracker.
//!
//! Projects own items arranged in a tree plus project-scoped attribute
//! option sets (type, status, location). The crate's job is keeping
//! that tree consistent under arbitrary mutation: cycle prevention,
//! cross-project containment, type-ordering rules on nesting, and
//! ancestor/descendant queries that stay cheap at depth.
//!
//! API, admin, and auth layers live elsewhere and call in through the
//! operations in [`project`], [`settings`], [`item`], and
//! [`hierarchy`], reading back snapshots and filtered listings via
//! [`filter`].
//!
//! # Conventions
//!
//! - **Errors**: every operation returns [`Result`]; validation
//!   failures are typed, deterministic, and user-facing.
//! - **Logging**: `tracing` macros on mutation paths; read paths stay
//!   quiet.
//! - **Storage**: `rusqlite` with FK cascades for ownership lifetimes;
//!   each mutation is all-or-nothing.

pub mod db;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod item;
pub mod model;
pub mod project;
pub mod settings;

pub use error::{Error, Result, ValidationError};
