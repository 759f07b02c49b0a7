//! In-memory source adapters and fixture builders for tests.
//!
//! `MemoryAdapter` serves records in insertion order, which doubles as
//! the stable natural order the pagination contract relies on. Failure
//! injection is a budget of upcoming calls that answer with a transport
//! error before the adapter recovers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::adapter::{AdapterError, Hits, SourceAdapter, Window};
use crate::config::AggregatorConfig;
use crate::filter::{CountryFilter, EventFilter, MatchFilter, Order, SeasonFilter, TeamFilter};
use crate::ident::encode_id;
use crate::model::{
    Country, CountryKey, EntityRecord, Event, EventKey, Match, MatchKey, MatchLevel, OpaqueId,
    Program, Season, SeasonKey, Team, TeamKey,
};
use crate::repository::UpstreamSet;
use crate::Scoutlink;

pub struct MemoryAdapter<E: EntityRecord> {
    name: &'static str,
    records: RwLock<Vec<E>>,
    matches: fn(&E::Filter, &E) -> bool,
    calls: AtomicU64,
    fail_budget: AtomicU64,
}

impl<E: EntityRecord> MemoryAdapter<E> {
    pub fn new(name: &'static str, matches: fn(&E::Filter, &E) -> bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            records: RwLock::new(Vec::new()),
            matches,
            calls: AtomicU64::new(0),
            fail_budget: AtomicU64::new(0),
        })
    }

    pub fn push(&self, record: E) {
        self.records.write().push(record);
    }

    pub fn extend(&self, records: impl IntoIterator<Item = E>) {
        self.records.write().extend(records);
    }

    /// The next `budget` calls answer with a transport error.
    pub fn set_fail_budget(&self, budget: u64) {
        self.fail_budget.store(budget, Ordering::SeqCst);
    }

    /// Total adapter calls observed, including failed ones.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) -> Result<(), AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .fail_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            Err(AdapterError::transport(format!(
                "{} injected failure",
                self.name
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<E: EntityRecord> SourceAdapter<E> for MemoryAdapter<E> {
    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn find_one(&self, key: &E::Key) -> Result<Option<E>, AdapterError> {
        self.tick()?;
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| record.natural_key() == *key)
            .cloned())
    }

    // Order descriptors are accepted and unapplied: the in-memory
    // sequence already is its stable natural order.
    async fn find_many(
        &self,
        window: Window,
        filter: &E::Filter,
        _order: &[Order<E::OrderField>],
    ) -> Result<Hits<E>, AdapterError> {
        self.tick()?;
        let matched: Vec<E> = self
            .records
            .read()
            .iter()
            .filter(|record| (self.matches)(filter, record))
            .cloned()
            .collect();
        let total_count = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Ok(Hits::new(page, total_count))
    }
}

pub fn team_matches(filter: &TeamFilter, team: &Team) -> bool {
    filter.program.map_or(true, |p| team.program == p)
        && opt_text(&filter.country, team.country.value())
        && opt_text(&filter.state_prov, team.state_prov.value())
        && opt_text(&filter.city, team.city.value())
}

pub fn event_matches(filter: &EventFilter, event: &Event) -> bool {
    filter.season.map_or(true, |s| event.season == s)
        && filter
            .program
            .map_or(true, |p| event.program.value() == Some(&p))
        && filter
            .event_type
            .map_or(true, |t| event.event_type.value() == Some(&t))
        && opt_text(&filter.country_code, event.country_code.value())
}

pub fn match_matches(filter: &MatchFilter, m: &Match) -> bool {
    filter.level.map_or(true, |l| m.level == l)
        && filter.winner.map_or(true, |w| m.winner.value() == Some(&w))
}

pub fn season_matches(filter: &SeasonFilter, season: &Season) -> bool {
    filter
        .program
        .map_or(true, |p| season.program.value() == Some(&p))
        && filter
            .start_year
            .map_or(true, |y| season.start_year.value() == Some(&y))
}

pub fn country_matches(filter: &CountryFilter, country: &Country) -> bool {
    opt_text(&filter.name, country.name.value())
}

fn opt_text(wanted: &Option<String>, actual: Option<&String>) -> bool {
    match wanted {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}

pub fn team_id(program: Program, number: u32) -> OpaqueId {
    encode_id(&TeamKey::new(program, number)).expect("valid team key")
}

pub fn team_fixture(program: Program, number: u32) -> Team {
    Team::new(team_id(program, number), program, number)
}

pub fn event_id(season: i32, code: &str) -> OpaqueId {
    encode_id(&EventKey::new(season, code)).expect("valid event key")
}

pub fn event_fixture(season: i32, code: &str) -> Event {
    Event::new(event_id(season, code), season, code)
}

pub fn match_id(event: &OpaqueId, level: MatchLevel, number: u32, set_number: u32) -> OpaqueId {
    encode_id(&MatchKey::new(event.clone(), level, number, set_number)).expect("valid match key")
}

pub fn match_fixture(event: &OpaqueId, level: MatchLevel, number: u32, set_number: u32) -> Match {
    Match::new(
        match_id(event, level, number, set_number),
        event.clone(),
        level,
        number,
        set_number,
    )
}

pub fn season_id(source_id: i64) -> OpaqueId {
    encode_id(&SeasonKey::new(source_id)).expect("valid season key")
}

pub fn season_fixture(source_id: i64) -> Season {
    Season::new(season_id(source_id), source_id)
}

pub fn country_id(code: &str) -> OpaqueId {
    encode_id(&CountryKey::new(code)).expect("valid country key")
}

pub fn country_fixture(code: &str) -> Country {
    Country::new(country_id(code), code)
}

/// Every upstream adapter as a concrete `MemoryAdapter`, so tests can
/// seed records and inject failures per source, plus builders for the
/// facade wired over them.
pub struct TestUpstreams {
    pub team_index: Arc<MemoryAdapter<Team>>,
    pub team_partner_a: Arc<MemoryAdapter<Team>>,
    pub team_partner_b: Arc<MemoryAdapter<Team>>,
    pub team_local: Arc<MemoryAdapter<Team>>,

    pub event_index: Arc<MemoryAdapter<Event>>,
    pub event_partner_a: Arc<MemoryAdapter<Event>>,
    pub event_partner_b: Arc<MemoryAdapter<Event>>,
    pub event_local: Arc<MemoryAdapter<Event>>,

    pub match_index: Arc<MemoryAdapter<Match>>,
    pub match_partner_a: Arc<MemoryAdapter<Match>>,
    pub match_partner_b: Arc<MemoryAdapter<Match>>,
    pub match_local: Arc<MemoryAdapter<Match>>,

    pub season_index: Arc<MemoryAdapter<Season>>,
    pub season_local: Arc<MemoryAdapter<Season>>,

    pub country_index: Arc<MemoryAdapter<Country>>,
    pub country_local: Arc<MemoryAdapter<Country>>,
}

impl TestUpstreams {
    pub fn new() -> Self {
        Self {
            team_index: MemoryAdapter::new("search-index", team_matches),
            team_partner_a: MemoryAdapter::new("partner-a", team_matches),
            team_partner_b: MemoryAdapter::new("partner-b", team_matches),
            team_local: MemoryAdapter::new("local-store", team_matches),

            event_index: MemoryAdapter::new("search-index", event_matches),
            event_partner_a: MemoryAdapter::new("partner-a", event_matches),
            event_partner_b: MemoryAdapter::new("partner-b", event_matches),
            event_local: MemoryAdapter::new("local-store", event_matches),

            match_index: MemoryAdapter::new("search-index", match_matches),
            match_partner_a: MemoryAdapter::new("partner-a", match_matches),
            match_partner_b: MemoryAdapter::new("partner-b", match_matches),
            match_local: MemoryAdapter::new("local-store", match_matches),

            season_index: MemoryAdapter::new("search-index", season_matches),
            season_local: MemoryAdapter::new("local-store", season_matches),

            country_index: MemoryAdapter::new("search-index", country_matches),
            country_local: MemoryAdapter::new("local-store", country_matches),
        }
    }

    pub fn upstream_set(&self) -> UpstreamSet {
        UpstreamSet {
            team_index: self.team_index.clone(),
            team_partner_a: self.team_partner_a.clone(),
            team_partner_b: self.team_partner_b.clone(),
            team_local: self.team_local.clone(),

            event_index: self.event_index.clone(),
            event_partner_a: self.event_partner_a.clone(),
            event_partner_b: self.event_partner_b.clone(),
            event_local: self.event_local.clone(),

            match_index: self.match_index.clone(),
            match_partner_a: self.match_partner_a.clone(),
            match_partner_b: self.match_partner_b.clone(),
            match_local: self.match_local.clone(),

            season_index: self.season_index.clone(),
            season_local: self.season_local.clone(),

            country_index: self.country_index.clone(),
            country_local: self.country_local.clone(),
        }
    }

    pub fn scoutlink(&self) -> Scoutlink {
        self.scoutlink_with(&AggregatorConfig::default())
    }

    pub fn scoutlink_with(&self, config: &AggregatorConfig) -> Scoutlink {
        Scoutlink::new(config, self.upstream_set())
    }
}

impl Default for TestUpstreams {
    fn default() -> Self {
        Self::new()
    }
}
