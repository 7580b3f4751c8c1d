//! Read-side views used by the public pages.
//!
//! Everything here is a pure function over loaded, normalized records. The
//! `load_*` helpers do the single read from a [`Repository`] and hand off.

use std::cmp::Reverse;

use crate::collection;
use crate::error::Result;
use crate::model::{Message, Project, Record};
use crate::repo::{Repository, Stored};

/// Category value that disables the portfolio filter.
pub const ALL_CATEGORIES: &str = "all";

/// Records in display order: by `order`, unset last, ties stable.
#[must_use]
pub fn ordered<R: Record>(mut records: Vec<R>) -> Vec<R> {
    collection::sort_by_order(&mut records);
    records
}

/// Load a collection in display order.
///
/// # Errors
///
/// Returns an error only if the backend itself cannot be read.
pub fn load_listing<R: Stored>(repo: &Repository) -> Result<Vec<R>> {
    Ok(ordered(repo.load::<R>()?))
}

/// Outcome of resolving a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail<R> {
    /// The record exists. Neighbours wrap around the ends of the listing;
    /// a single-record listing is its own neighbour.
    Found {
        /// The record itself.
        record: R,
        /// Previous record in display order.
        prev: R,
        /// Next record in display order.
        next: R,
    },
    /// No record has the requested id.
    NotFound {
        /// The id that was requested.
        id: i64,
    },
}

impl<R> Detail<R> {
    /// The record, if found.
    #[must_use]
    pub fn record(&self) -> Option<&R> {
        match self {
            Self::Found { record, .. } => Some(record),
            Self::NotFound { .. } => None,
        }
    }

    /// Whether the record was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Resolve a detail page within an already ordered listing.
///
/// The first record matching `id` wins.
#[must_use]
pub fn detail<R: Record>(listing: &[R], id: i64) -> Detail<R> {
    let Some(index) = collection::position(listing, id) else {
        return Detail::NotFound { id };
    };
    let len = listing.len();
    Detail::Found {
        record: listing[index].clone(),
        prev: listing[(index + len - 1) % len].clone(),
        next: listing[(index + 1) % len].clone(),
    }
}

/// Load a collection and resolve a detail page in it.
///
/// # Errors
///
/// Returns an error only if the backend itself cannot be read.
pub fn load_detail<R: Stored>(repo: &Repository, id: i64) -> Result<Detail<R>> {
    let listing = load_listing::<R>(repo)?;
    Ok(detail(&listing, id))
}

/// Distinct non-empty project categories, in order of first appearance.
#[must_use]
pub fn categories(projects: &[Project]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for project in projects {
        let category = project.category.as_str();
        if !category.is_empty() && !seen.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            seen.push(category.to_string());
        }
    }
    seen
}

/// Projects in `category`, compared case-insensitively.
///
/// [`ALL_CATEGORIES`] keeps every project.
#[must_use]
pub fn filter_by_category(projects: Vec<Project>, category: &str) -> Vec<Project> {
    if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
        return projects;
    }
    projects
        .into_iter()
        .filter(|p| p.category.eq_ignore_ascii_case(category))
        .collect()
}

/// Messages for the admin inbox: unread first, then newest first.
///
/// Messages whose date doesn't parse sort after dated ones in their group.
#[must_use]
pub fn inbox(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by_key(|m| (m.read, Reverse(m.received_at()), Reverse(m.id)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeysConfig;
    use crate::model::Testimonial;
    use crate::store::MemoryStore;

    fn projects(orders: &[Option<i64>]) -> Vec<Project> {
        orders
            .iter()
            .enumerate()
            .map(|(i, order)| {
                let mut p = Project::new(i as i64 + 1, format!("P{}", i + 1), "Web");
                p.order = *order;
                p
            })
            .collect()
    }

    #[test]
    fn test_ordered_missing_last() {
        let listing = ordered(projects(&[Some(2), None, Some(0)]));
        let orders: Vec<Option<i64>> = listing.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![Some(0), Some(2), None]);
    }

    #[test]
    fn test_detail_wraps_at_both_ends() {
        let listing = projects(&[Some(0), Some(1), Some(2)]);

        let Detail::Found { prev, next, .. } = detail(&listing, 1) else {
            panic!("expected found");
        };
        assert_eq!(prev.id, 3);
        assert_eq!(next.id, 2);

        let Detail::Found { prev, next, .. } = detail(&listing, 3) else {
            panic!("expected found");
        };
        assert_eq!(prev.id, 2);
        assert_eq!(next.id, 1);
    }

    #[test]
    fn test_detail_single_record_is_own_neighbour() {
        let listing = projects(&[None]);
        let Detail::Found { prev, next, .. } = detail(&listing, 1) else {
            panic!("expected found");
        };
        assert_eq!(prev.id, 1);
        assert_eq!(next.id, 1);
    }

    #[test]
    fn test_detail_not_found() {
        let listing = projects(&[None]);
        let view = detail(&listing, 99);
        assert_eq!(view, Detail::NotFound { id: 99 });
        assert!(view.record().is_none());

        let empty: Vec<Project> = Vec::new();
        assert!(!detail(&empty, 1).is_found());
    }

    #[test]
    fn test_load_detail_uses_display_order() {
        let repo = Repository::new(Box::new(MemoryStore::new()), KeysConfig::default());
        let mut a = Testimonial::new(1, "Great", "Ada");
        a.order = Some(1);
        let mut b = Testimonial::new(2, "Superb", "Bob");
        b.order = Some(0);
        repo.save(&[a, b]).unwrap();

        let view = load_detail::<Testimonial>(&repo, 2).unwrap();
        let Detail::Found { next, .. } = view else {
            panic!("expected found");
        };
        assert_eq!(next.id, 1);
        assert_eq!(load_listing::<Testimonial>(&repo).unwrap()[0].id, 2);
    }

    #[test]
    fn test_categories_and_filter() {
        let mut list = projects(&[None, None, None]);
        list[1].category = "Print".to_string();
        list[2].category = "web".to_string();

        assert_eq!(categories(&list), vec!["Web", "Print"]);
        assert_eq!(filter_by_category(list.clone(), "all").len(), 3);
        assert_eq!(filter_by_category(list.clone(), "WEB").len(), 2);
        assert!(filter_by_category(list, "Motion").is_empty());
    }

    #[test]
    fn test_inbox_unread_first_newest_first() {
        let mut old_unread = Message::new(1, "A", "a@example.com", "old");
        old_unread.date = "2024-01-01T10:00:00.000Z".to_string();
        let mut new_unread = Message::new(2, "B", "b@example.com", "new");
        new_unread.date = "2024-03-01T10:00:00.000Z".to_string();
        let mut new_read = Message::new(3, "C", "c@example.com", "read");
        new_read.date = "2024-06-01T10:00:00.000Z".to_string();
        new_read.read = true;
        let mut undated = Message::new(4, "D", "d@example.com", "??");
        undated.date = "someday".to_string();

        let ids: Vec<i64> = inbox(vec![new_read, undated, old_unread, new_unread])
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 4, 3]);
    }
}
