//! # Repository orchestration
//!
//! One repository per entity kind composes the codec, the reconciliation
//! engine, and the paginator over the upstream adapters. By-id lookups
//! fan out to every source serving the kind, join the independent reads,
//! and reconcile in ascending precedence. List queries delegate filter
//! and order to the search index, over-fetch one probe row, and amend
//! each hit from the local override store.
//!
//! Failure policy: the search index is record-defining, so its errors
//! surface as [`Error::UpstreamUnavailable`] after the configured
//! retries. Partner and override reads only enrich records the index
//! already found; their failures degrade to absent fields with a
//! warning.

mod country;
mod event;
mod match_;
mod season;
mod team;

pub use country::CountryRepository;
pub use event::EventRepository;
pub use match_::MatchRepository;
pub use season::SeasonRepository;
pub use team::TeamRepository;

use std::sync::Arc;

use futures::future::join_all;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::adapter::{AdapterError, SourceAdapter};
use crate::config::AggregatorConfig;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::filter::Order;
use crate::ident::{classify_id, decode_id, IdClass};
use crate::merge::{merge_many, merge_one, Merge};
use crate::model::{
    Country, EntityKind, EntityRecord, Event, Field, Match, OpaqueId, Role, RoleKey, Season, Team,
    User,
};
use crate::paginate::{Connection, Paginator};

pub(crate) const SEARCH_INDEX: &str = "search-index";
pub(crate) const PARTNER_A: &str = "partner-a";
pub(crate) const PARTNER_B: &str = "partner-b";
pub(crate) const LOCAL_STORE: &str = "local-store";

/// The full set of upstream adapters the repositories compose over.
///
/// The search index and the local store serve every kind; the partner
/// feeds serve teams, events, and matches for their program.
pub struct UpstreamSet {
    pub team_index: Arc<dyn SourceAdapter<Team>>,
    pub team_partner_a: Arc<dyn SourceAdapter<Team>>,
    pub team_partner_b: Arc<dyn SourceAdapter<Team>>,
    pub team_local: Arc<dyn SourceAdapter<Team>>,

    pub event_index: Arc<dyn SourceAdapter<Event>>,
    pub event_partner_a: Arc<dyn SourceAdapter<Event>>,
    pub event_partner_b: Arc<dyn SourceAdapter<Event>>,
    pub event_local: Arc<dyn SourceAdapter<Event>>,

    pub match_index: Arc<dyn SourceAdapter<Match>>,
    pub match_partner_a: Arc<dyn SourceAdapter<Match>>,
    pub match_partner_b: Arc<dyn SourceAdapter<Match>>,
    pub match_local: Arc<dyn SourceAdapter<Match>>,

    pub season_index: Arc<dyn SourceAdapter<Season>>,
    pub season_local: Arc<dyn SourceAdapter<Season>>,

    pub country_index: Arc<dyn SourceAdapter<Country>>,
    pub country_local: Arc<dyn SourceAdapter<Country>>,
}

/// One reconciled record of any kind, as resolved by [`Repositories::node`].
#[derive(Debug, Clone)]
pub enum Node {
    Team(Team),
    Event(Event),
    Match(Match),
    Season(Season),
    Country(Country),
    User(User),
    Role(Role),
}

/// Composition root: one repository per entity kind plus the generic
/// node dispatch.
pub struct Repositories {
    pub teams: TeamRepository,
    pub events: EventRepository,
    pub matches: MatchRepository,
    pub seasons: SeasonRepository,
    pub countries: CountryRepository,
}

impl Repositories {
    pub fn new(config: &AggregatorConfig, upstreams: UpstreamSet) -> Self {
        Self {
            teams: TeamRepository::new(
                config,
                upstreams.team_index,
                upstreams.team_partner_a,
                upstreams.team_partner_b,
                upstreams.team_local,
            ),
            events: EventRepository::new(
                config,
                upstreams.event_index.clone(),
                upstreams.event_partner_a,
                upstreams.event_partner_b,
                upstreams.event_local,
            ),
            matches: MatchRepository::new(
                config,
                upstreams.match_index,
                upstreams.match_partner_a,
                upstreams.match_partner_b,
                upstreams.match_local,
                upstreams.event_index,
            ),
            seasons: SeasonRepository::new(
                config,
                upstreams.season_index,
                upstreams.season_local,
            ),
            countries: CountryRepository::new(
                config,
                upstreams.country_index,
                upstreams.country_local,
            ),
        }
    }

    /// Resolves any opaque id to its reconciled record.
    ///
    /// A well-formed UUID is a user id and never reaches the sources;
    /// role ids decode to a shell record, since the auth subsystem owns
    /// role data. Every other kind dispatches to its repository.
    pub async fn node(&self, id: &OpaqueId) -> Result<Node> {
        match classify_id(id)? {
            IdClass::User(uuid) => Ok(Node::User(User {
                id: id.clone(),
                uuid,
                username: Field::Absent,
            })),
            IdClass::Entity(kind) => match kind {
                EntityKind::Team => Ok(Node::Team(self.teams.get(id).await?)),
                EntityKind::Event => Ok(Node::Event(self.events.get(id).await?)),
                EntityKind::Match => Ok(Node::Match(self.matches.get(id).await?)),
                EntityKind::Season => Ok(Node::Season(self.seasons.get(id).await?)),
                EntityKind::Country => Ok(Node::Country(self.countries.get(id).await?)),
                EntityKind::Role => {
                    let key: RoleKey = decode_id(id)?;
                    Ok(Node::Role(Role {
                        id: id.clone(),
                        name: key.name,
                    }))
                }
                EntityKind::User => Err(Error::invalid_identifier(
                    "user ids are bare UUIDs, not tagged identifiers",
                )),
            },
        }
    }
}

pub(crate) async fn find_one_with_retry<E: EntityRecord>(
    adapter: &dyn SourceAdapter<E>,
    key: &E::Key,
    retries: u32,
) -> std::result::Result<Option<E>, AdapterError> {
    let mut attempt = 0;
    loop {
        match adapter.find_one(key).await {
            Ok(found) => return Ok(found),
            Err(err) if attempt < retries => {
                attempt += 1;
                debug!(source = adapter.source_name(), attempt, %err, "retrying primary lookup");
            }
            Err(err) => return Err(err),
        }
    }
}

/// Collapses a secondary-source outcome: errors become absent, logged.
pub(crate) fn degrade<E>(
    source: &'static str,
    outcome: std::result::Result<Option<E>, AdapterError>,
) -> Option<E> {
    match outcome {
        Ok(found) => found,
        Err(err) => {
            warn!(source, %err, "secondary source degraded to absent");
            None
        }
    }
}

/// Reconciles present source layers, lowest precedence first. `None`
/// means every source reported the record absent.
pub(crate) fn reconcile_layers<E: Merge>(layers: Vec<E>) -> Option<E> {
    let mut layers = layers.into_iter();
    let base = layers.next()?;
    Some(merge_one(base, layers))
}

/// Looks up the local override for every hit of a list window, keyed by
/// natural key. Lookups run concurrently; failures degrade per hit.
pub(crate) async fn fetch_overrides<E: EntityRecord>(
    local: &dyn SourceAdapter<E>,
    records: &[E],
) -> HashMap<E::Key, E> {
    let keys: Vec<E::Key> = records.iter().map(|record| record.natural_key()).collect();
    let lookups = keys.iter().map(|key| local.find_one(key));
    let outcomes = join_all(lookups).await;

    let mut overrides = HashMap::with_capacity(records.len());
    for (record, outcome) in records.iter().zip(outcomes) {
        if let Some(overlay) = degrade(LOCAL_STORE, outcome) {
            overrides.insert(record.natural_key(), overlay);
        }
    }
    overrides
}

/// The shared list flow: decode the cursor, over-fetch one window from
/// the search index, amend each hit from the local store, paginate.
pub(crate) async fn list_reconciled<E>(
    primary: &dyn SourceAdapter<E>,
    local: &dyn SourceAdapter<E>,
    filter: &E::Filter,
    order: &[Order<E::OrderField>],
    page_size: u64,
    after: Option<&str>,
) -> Result<Connection<E>>
where
    E: EntityRecord + Merge,
{
    let after = after.map(Cursor::decode).transpose()?;
    let window = Paginator::window(page_size, after.as_ref());
    debug!(kind = %E::KIND, offset = window.offset, limit = window.limit, "list window");

    let hits = primary
        .find_many(window, filter, order)
        .await
        .map_err(|err| Error::upstream(SEARCH_INDEX, err))?;
    let overrides = fetch_overrides(local, &hits.records).await;
    let merged = merge_many(hits.records, overrides);

    Ok(Paginator::paginate(
        page_size,
        after.as_ref(),
        merged,
        hits.total_count,
    ))
}
