//! Stateless predicate composition over fetched collections.
//!
//! Filters are conjunctive: every supplied argument must match.
//! Absent arguments are no-ops, as are blank or whitespace-only
//! substring arguments, so an unfiltered call returns the input
//! unchanged. Substring matching is case-insensitive.
//!
//! Wrong-typed filter values are unrepresentable here: the fields are
//! typed `Option`s, and the blank-string no-op carries the old falsy
//! semantics for text arguments.

use serde::{Deserialize, Serialize};

use crate::model::{Item, Project};

/// Named filter arguments for project listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    /// Case-insensitive substring match on the project name.
    pub name_contains: Option<String>,
}

/// Named filter arguments for item listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring match on the item title.
    pub title_contains: Option<String>,
    /// Exact match on the owning project id.
    pub project: Option<i64>,
    /// Exact match on the item type id.
    pub item_type: Option<i64>,
    /// Exact match on the item status id.
    pub item_status: Option<i64>,
    /// Exact match on the item location id.
    pub item_location: Option<i64>,
}

/// Apply a [`ProjectFilter`] to a collection of projects.
#[must_use]
pub fn filter_projects(projects: &[Project], filter: &ProjectFilter) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| contains_ci(&p.name, filter.name_contains.as_deref()))
        .cloned()
        .collect()
}

/// Apply an [`ItemFilter`] to a collection of items.
#[must_use]
pub fn filter_items(items: &[Item], filter: &ItemFilter) -> Vec<Item> {
    items
        .iter()
        .filter(|i| contains_ci(&i.title, filter.title_contains.as_deref()))
        .filter(|i| id_matches(i.project_id, filter.project))
        .filter(|i| id_matches(i.type_id, filter.item_type))
        .filter(|i| id_matches(i.status_id, filter.item_status))
        .filter(|i| id_matches(i.location_id, filter.item_location))
        .cloned()
        .collect()
}

/// Blank needles are no-ops; anything else must appear in the
/// haystack, case-insensitively.
fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) if needle.trim().is_empty() => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

fn id_matches(value: i64, wanted: Option<i64>) -> bool {
    wanted.is_none_or(|id| id == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            created_at_us: 0,
            updated_at_us: 0,
        }
    }

    fn item(id: i64, project_id: i64, type_id: i64, title: &str) -> Item {
        Item {
            id,
            project_id,
            parent_id: None,
            type_id,
            status_id: 100,
            location_id: 200,
            title: title.to_string(),
            changelog: String::new(),
            requirements: String::new(),
            outcome: String::new(),
            created_at_us: 0,
            updated_at_us: 0,
        }
    }

    #[test]
    fn no_filters_returns_input_unchanged() {
        let projects = vec![project(1, "Alpha"), project(2, "Beta")];
        let out = filter_projects(&projects, &ProjectFilter::default());
        assert_eq!(out, projects);

        let items = vec![item(1, 1, 10, "One"), item(2, 1, 11, "Two")];
        let out = filter_items(&items, &ItemFilter::default());
        assert_eq!(out, items);
    }

    #[test]
    fn blank_substring_is_a_no_op() {
        let projects = vec![project(1, "Alpha")];
        let filter = ProjectFilter {
            name_contains: Some("   ".to_string()),
        };
        assert_eq!(filter_projects(&projects, &filter), projects);
    }

    #[test]
    fn substring_is_case_insensitive() {
        let projects = vec![project(1, "Garden Shed"), project(2, "Kitchen")];
        let filter = ProjectFilter {
            name_contains: Some("gArDeN".to_string()),
        };
        let out = filter_projects(&projects, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn filters_compose_conjunctively() {
        let items = vec![
            item(1, 1, 10, "fix the door"),
            item(2, 1, 11, "fix the window"),
            item(3, 2, 10, "fix the fence"),
        ];

        let filter = ItemFilter {
            title_contains: Some("fix".to_string()),
            project: Some(1),
            item_type: Some(10),
            ..ItemFilter::default()
        };
        let out = filter_items(&items, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn unmatched_id_filter_yields_empty_not_error() {
        let items = vec![item(1, 1, 10, "task")];
        let filter = ItemFilter {
            item_status: Some(9999),
            ..ItemFilter::default()
        };
        assert!(filter_items(&items, &filter).is_empty());
    }
}
