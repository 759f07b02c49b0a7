//! # Cursor pagination
//!
//! List operations run over windowed upstream queries. The paginator
//! turns a page request into an absolute [`Window`] with one extra probe
//! row, then folds the fetched rows into a connection: edges with
//! per-row cursors, page flags, and the source-reported total count.

use serde::Serialize;

use crate::adapter::Window;
use crate::cursor::Cursor;
use crate::model::EntityRecord;

/// Paging flags and boundary cursors for one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// One row of a connection, paired with the cursor that resumes after it.
#[derive(Debug, Clone, Serialize)]
pub struct Edge<E> {
    pub cursor: String,
    pub node: E,
}

/// A page of reconciled records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<E> {
    pub edges: Vec<Edge<E>>,
    pub page_info: PageInfo,
    pub total_count: u64,
}

/// Stateless window and connection assembly.
pub struct Paginator;

impl Paginator {
    /// The upstream window for a page request: resume one past the cursor
    /// position (or from the start) and over-fetch a single probe row.
    pub fn window(page_size: u64, after: Option<&Cursor>) -> Window {
        let offset = match after {
            Some(cursor) => cursor.position + 1,
            None => 0,
        };
        Window::new(offset, page_size + 1)
    }

    /// Assembles a connection from rows fetched through [`Paginator::window`].
    ///
    /// If the probe row came back it is dropped and `has_next_page` is
    /// set; the probe only proves a next row existed at fetch time, so
    /// `total_count` can drift between pages while the upstream sequence
    /// changes underneath.
    pub fn paginate<E: EntityRecord>(
        page_size: u64,
        after: Option<&Cursor>,
        mut records: Vec<E>,
        total_count: u64,
    ) -> Connection<E> {
        let has_next_page = records.len() as u64 > page_size;
        if has_next_page {
            records.truncate(page_size as usize);
        }

        let base = after.map(|cursor| cursor.position + 1).unwrap_or(0);
        let edges: Vec<Edge<E>> = records
            .into_iter()
            .enumerate()
            .map(|(index, node)| Edge {
                cursor: Cursor::new(node.id().clone(), base + index as u64).encode(),
                node,
            })
            .collect();

        let page_info = PageInfo {
            has_next_page,
            has_previous_page: after.is_some(),
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };

        Connection {
            edges,
            page_info,
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::encode_id;
    use crate::model::{Program, Team, TeamKey};

    fn teams(numbers: &[u32]) -> Vec<Team> {
        numbers
            .iter()
            .map(|&n| {
                let key = TeamKey::new(Program::Frc, n);
                Team::new(encode_id(&key).unwrap(), Program::Frc, n)
            })
            .collect()
    }

    #[test]
    fn first_page_window_starts_at_zero_with_probe() {
        let window = Paginator::window(10, None);
        assert_eq!(window, Window::new(0, 11));
    }

    #[test]
    fn resumed_window_starts_past_the_cursor() {
        let id = encode_id(&TeamKey::new(Program::Frc, 1)).unwrap();
        let cursor = Cursor::new(id, 9);
        let window = Paginator::window(10, Some(&cursor));
        assert_eq!(window, Window::new(10, 11));
    }

    #[test]
    fn probe_row_is_dropped_and_flags_next_page() {
        let rows = teams(&[1, 2, 3, 4]);
        let connection = Paginator::paginate(3, None, rows, 40);
        assert_eq!(connection.edges.len(), 3);
        assert!(connection.page_info.has_next_page);
        assert!(!connection.page_info.has_previous_page);
        assert_eq!(connection.total_count, 40);
    }

    #[test]
    fn short_page_has_no_next() {
        let rows = teams(&[1, 2]);
        let connection = Paginator::paginate(3, None, rows, 2);
        assert_eq!(connection.edges.len(), 2);
        assert!(!connection.page_info.has_next_page);
    }

    #[test]
    fn positions_continue_from_the_cursor() {
        let id = encode_id(&TeamKey::new(Program::Frc, 100)).unwrap();
        let after = Cursor::new(id, 4);
        let rows = teams(&[5, 6, 7]);
        let connection = Paginator::paginate(3, Some(&after), rows, 8);
        assert!(connection.page_info.has_previous_page);

        let first = Cursor::decode(&connection.edges[0].cursor).unwrap();
        let last = Cursor::decode(&connection.edges[2].cursor).unwrap();
        assert_eq!(first.position, 5);
        assert_eq!(last.position, 7);
        assert_eq!(
            connection.page_info.end_cursor.as_deref(),
            Some(connection.edges[2].cursor.as_str())
        );
    }

    #[test]
    fn empty_sequence_yields_empty_connection() {
        let connection = Paginator::paginate(5, None, teams(&[]), 0);
        assert!(connection.edges.is_empty());
        assert_eq!(connection.page_info.start_cursor, None);
        assert_eq!(connection.page_info.end_cursor, None);
        assert!(!connection.page_info.has_next_page);
    }
}
