//! # Scoutlink
//!
//! A reconciling data-access layer for robotics-competition data.
//!
//! Scoutlink answers graph-style queries about teams, events, matches,
//! seasons, and countries by merging records from three source families:
//! an authoritative full-text search index, per-program partner result
//! feeds, and a local override store. It owns three pieces of real
//! machinery: a reversible opaque-identifier codec, a field-precedence
//! reconciliation engine with null-fallback, and cursor pagination over
//! windowed upstream queries. Transport, query-language wiring, and the
//! auth subsystem stay outside, behind the [`adapter::SourceAdapter`]
//! seam.

pub mod adapter;
pub mod auth;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod ident;
pub mod merge;
pub mod model;
pub mod paginate;
pub mod repository;
pub mod test_support;

// Re-export main types for convenience
pub use adapter::{AdapterError, Hits, SourceAdapter, Window};
pub use auth::AuthContext;
pub use config::AggregatorConfig;
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use filter::{Direction, Order};
pub use ident::{classify_id, decode_id, encode_id, IdClass, NaturalKey};
pub use merge::{merge_field, merge_many, merge_one, Merge};
pub use model::{
    Country, EntityKind, EntityRecord, Event, Field, Match, OpaqueId, Program, Season, Team,
};
pub use paginate::{Connection, Edge, PageInfo, Paginator};
pub use repository::{Node, Repositories, UpstreamSet};

/// Main API for the aggregation core.
///
/// Owns the per-kind repositories and the generic node dispatch; callers
/// construct it once from a configuration and a set of upstream
/// adapters, then share it across requests.
pub struct Scoutlink {
    repos: Repositories,
}

impl Scoutlink {
    /// Create a new Scoutlink instance over the given upstreams.
    pub fn new(config: &AggregatorConfig, upstreams: UpstreamSet) -> Self {
        Self {
            repos: Repositories::new(config, upstreams),
        }
    }

    pub fn teams(&self) -> &repository::TeamRepository {
        &self.repos.teams
    }

    pub fn events(&self) -> &repository::EventRepository {
        &self.repos.events
    }

    pub fn matches(&self) -> &repository::MatchRepository {
        &self.repos.matches
    }

    pub fn seasons(&self) -> &repository::SeasonRepository {
        &self.repos.seasons
    }

    pub fn countries(&self) -> &repository::CountryRepository {
        &self.repos.countries
    }

    /// Resolves any opaque id to its reconciled record.
    pub async fn node(&self, id: &OpaqueId) -> Result<Node> {
        self.repos.node(id).await
    }
}
