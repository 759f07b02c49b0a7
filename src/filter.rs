//! Filter and ordering descriptors for list queries.
//!
//! The core only carries these shapes; each source adapter translates
//! them into its native query syntax.

use serde::{Deserialize, Serialize};

use crate::model::{EventType, MatchLevel, Program, Side};

/// Sort direction for an order descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

/// A single order descriptor: field plus direction.
///
/// Adapters apply descriptors in the given order and must fall back to a
/// stable natural order as the final tiebreaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F> Order<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Filter shape for team list queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamFilter {
    pub program: Option<Program>,
    pub country: Option<String>,
    pub state_prov: Option<String>,
    pub city: Option<String>,
}

/// Sortable fields for team list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamOrderField {
    Number,
    RookieYear,
    Country,
}

/// Filter shape for event list queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    pub season: Option<i32>,
    pub program: Option<Program>,
    pub event_type: Option<EventType>,
    pub country_code: Option<String>,
}

/// Sortable fields for event list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOrderField {
    Season,
    Code,
    Name,
    DateStart,
}

/// Filter shape for match list queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub level: Option<MatchLevel>,
    pub winner: Option<Side>,
}

/// Sortable fields for match list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOrderField {
    Level,
    Number,
    SetNumber,
    ActualStartTime,
}

/// Filter shape for season list queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonFilter {
    pub program: Option<Program>,
    pub start_year: Option<i32>,
}

/// Sortable fields for season list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonOrderField {
    StartYear,
    Name,
}

/// Filter shape for country list queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryFilter {
    pub name: Option<String>,
}

/// Sortable fields for country list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountryOrderField {
    Name,
    Code,
}
