//! # Data Model
//!
//! Entity kinds, programs, natural keys, and reconciled record types for
//! the aggregation core, plus the [`Field`] tri-state that keeps a field
//! absent from a source payload distinct from an explicit null.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::filter::{
    CountryFilter, CountryOrderField, EventFilter, EventOrderField, MatchFilter, MatchOrderField,
    SeasonFilter, SeasonOrderField, TeamFilter, TeamOrderField,
};

/// The closed set of entity kinds the aggregation core serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Team,
    Event,
    Match,
    Season,
    Country,
    User,
    Role,
}

impl EntityKind {
    /// Kind tag used as the first component of an opaque identifier.
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Team => "team",
            EntityKind::Event => "event",
            EntityKind::Match => "match",
            EntityKind::Season => "season",
            EntityKind::Country => "country",
            EntityKind::User => "user",
            EntityKind::Role => "role",
        }
    }

    /// Resolve a kind tag found in a decoded identifier.
    ///
    /// `"user"` is intentionally not recognized: user ids are bare UUIDs
    /// minted elsewhere, and the codec never produces a tagged form for
    /// them.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "team" => Some(EntityKind::Team),
            "event" => Some(EntityKind::Event),
            "match" => Some(EntityKind::Match),
            "season" => Some(EntityKind::Season),
            "country" => Some(EntityKind::Country),
            "role" => Some(EntityKind::Role),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Competition programs served by the upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Program {
    Jfll,
    Fll,
    Ftc,
    Frc,
}

impl Program {
    /// Canonical program code as it appears in identifiers and payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Program::Jfll => "JFLL",
            Program::Fll => "FLL",
            Program::Ftc => "FTC",
            Program::Frc => "FRC",
        }
    }

    /// Parse a canonical program code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "JFLL" => Some(Program::Jfll),
            "FLL" => Some(Program::Fll),
            "FTC" => Some(Program::Ftc),
            "FRC" => Some(Program::Frc),
            _ => None,
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tournament levels in bracket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    Qualification,
    EighthFinal,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl MatchLevel {
    /// Short level code used in match identifiers.
    pub fn code(&self) -> &'static str {
        match self {
            MatchLevel::Qualification => "qm",
            MatchLevel::EighthFinal => "ef",
            MatchLevel::QuarterFinal => "qf",
            MatchLevel::SemiFinal => "sf",
            MatchLevel::Final => "f",
        }
    }

    /// Parse a short level code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "qm" => Some(MatchLevel::Qualification),
            "ef" => Some(MatchLevel::EighthFinal),
            "qf" => Some(MatchLevel::QuarterFinal),
            "sf" => Some(MatchLevel::SemiFinal),
            "f" => Some(MatchLevel::Final),
            _ => None,
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Event classifications reported by the upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Regional,
    DistrictEvent,
    DistrictChampionship,
    DistrictChampionshipDivision,
    ChampionshipDivision,
    Championship,
    Meet,
    QualifyingEvent,
    SuperRegional,
    OffSeason,
    Kickoff,
    Scrimmage,
    Workshop,
}

/// Alliance sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Red,
    Blue,
}

/// A reversible, URL-safe identifier minted by the id codec.
///
/// The text is base64url without padding; its payload embeds the entity
/// kind and natural key, so no id mapping state is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueId(pub String);

impl OpaqueId {
    /// Wrap an already-encoded identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tri-state for a reconciled field.
///
/// Reconciliation treats a key missing from a source payload differently
/// from a key present with an explicit null, so `Option` is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// The key was missing from the source payload.
    Absent,
    /// The key was present with an explicit null.
    Null,
    /// The key was present with a value.
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn has_value(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    /// The carried value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }

    /// Consume the field, keeping only a carried value.
    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(value) => serializer.serialize_some(value),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Value(value),
            None => Field::Null,
        })
    }
}

/// Natural key for a team: program plus team number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamKey {
    pub program: Program,
    pub number: u32,
}

impl TeamKey {
    pub fn new(program: Program, number: u32) -> Self {
        Self { program, number }
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.program, self.number)
    }
}

/// Natural key for an event: season year plus the code unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub season: i32,
    pub code: String,
}

impl EventKey {
    pub fn new(season: i32, code: impl Into<String>) -> Self {
        Self {
            season,
            code: code.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.season, self.code)
    }
}

/// Natural key for a match within its parent event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    /// Opaque id of the parent event.
    pub event: OpaqueId,
    pub level: MatchLevel,
    pub number: u32,
    pub set_number: u32,
}

impl MatchKey {
    pub fn new(event: OpaqueId, level: MatchLevel, number: u32, set_number: u32) -> Self {
        Self {
            event,
            level,
            number,
            set_number,
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.event, self.level, self.number, self.set_number
        )
    }
}

/// Natural key for a season: the search index's internal document id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonKey {
    pub source_id: i64,
}

impl SeasonKey {
    pub fn new(source_id: i64) -> Self {
        Self { source_id }
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source_id)
    }
}

/// Natural key for a country: its ISO code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryKey {
    pub iso_code: String,
}

impl CountryKey {
    pub fn new(iso_code: impl Into<String>) -> Self {
        Self {
            iso_code: iso_code.into(),
        }
    }
}

impl fmt::Display for CountryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iso_code)
    }
}

/// Natural key for a role: its unique name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleKey {
    pub name: String,
}

impl RoleKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Capability shared by the record types the aggregation core reconciles.
pub trait EntityRecord: Clone + Send + Sync + 'static {
    /// Natural key uniquely identifying the record upstream.
    type Key: Clone + Eq + Hash + Send + Sync + 'static;
    /// Filter shape accepted by list queries.
    type Filter: Send + Sync;
    /// Sortable fields for list queries.
    type OrderField: Copy + Send + Sync;

    const KIND: EntityKind;

    fn id(&self) -> &OpaqueId;
    fn natural_key(&self) -> Self::Key;
}

/// A reconciled team record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: OpaqueId,
    pub program: Program,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name_short: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name_full: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub school_name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub city: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub state_prov: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub country: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub rookie_year: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub robot_name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub district_code: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub website: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub home_cmp: Field<String>,
}

impl Team {
    /// A team record carrying only its identity; reconciled fields start
    /// absent.
    pub fn new(id: OpaqueId, program: Program, number: u32) -> Self {
        Self {
            id,
            program,
            number,
            name_short: Field::Absent,
            name_full: Field::Absent,
            school_name: Field::Absent,
            city: Field::Absent,
            state_prov: Field::Absent,
            country: Field::Absent,
            rookie_year: Field::Absent,
            robot_name: Field::Absent,
            district_code: Field::Absent,
            website: Field::Absent,
            home_cmp: Field::Absent,
        }
    }
}

impl EntityRecord for Team {
    type Key = TeamKey;
    type Filter = TeamFilter;
    type OrderField = TeamOrderField;

    const KIND: EntityKind = EntityKind::Team;

    fn id(&self) -> &OpaqueId {
        &self.id
    }

    fn natural_key(&self) -> TeamKey {
        TeamKey::new(self.program, self.number)
    }
}

/// A reconciled event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: OpaqueId,
    pub season: i32,
    pub code: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub program: Field<Program>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub event_type: Field<EventType>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub address: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub venue: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub city: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub state_prov: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub country_code: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub timezone: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub website: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub date_start: Field<Date>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub date_end: Field<Date>,
    /// Sub-division events reported by the partner feed.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub division_ids: Field<Vec<OpaqueId>>,
}

impl Event {
    /// An event record carrying only its identity; reconciled fields
    /// start absent.
    pub fn new(id: OpaqueId, season: i32, code: impl Into<String>) -> Self {
        Self {
            id,
            season,
            code: code.into(),
            program: Field::Absent,
            name: Field::Absent,
            event_type: Field::Absent,
            address: Field::Absent,
            venue: Field::Absent,
            city: Field::Absent,
            state_prov: Field::Absent,
            country_code: Field::Absent,
            timezone: Field::Absent,
            website: Field::Absent,
            date_start: Field::Absent,
            date_end: Field::Absent,
            division_ids: Field::Absent,
        }
    }
}

impl EntityRecord for Event {
    type Key = EventKey;
    type Filter = EventFilter;
    type OrderField = EventOrderField;

    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &OpaqueId {
        &self.id
    }

    fn natural_key(&self) -> EventKey {
        EventKey::new(self.season, self.code.clone())
    }
}

/// Per-alliance score breakdown for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub auto: i32,
    pub teleop: i32,
    pub foul: i32,
    pub end: i32,
    pub total: i32,
}

/// A reconciled match record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: OpaqueId,
    /// Opaque id of the parent event.
    pub event: OpaqueId,
    pub level: MatchLevel,
    pub number: u32,
    pub set_number: u32,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub actual_start_time: Field<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub post_result_time: Field<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub winner: Field<Side>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub red: Field<ScoreBreakdown>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub blue: Field<ScoreBreakdown>,
}

impl Match {
    /// A match record carrying only its identity; reconciled fields start
    /// absent.
    pub fn new(
        id: OpaqueId,
        event: OpaqueId,
        level: MatchLevel,
        number: u32,
        set_number: u32,
    ) -> Self {
        Self {
            id,
            event,
            level,
            number,
            set_number,
            description: Field::Absent,
            actual_start_time: Field::Absent,
            post_result_time: Field::Absent,
            winner: Field::Absent,
            red: Field::Absent,
            blue: Field::Absent,
        }
    }
}

impl EntityRecord for Match {
    type Key = MatchKey;
    type Filter = MatchFilter;
    type OrderField = MatchOrderField;

    const KIND: EntityKind = EntityKind::Match;

    fn id(&self) -> &OpaqueId {
        &self.id
    }

    fn natural_key(&self) -> MatchKey {
        MatchKey::new(self.event.clone(), self.level, self.number, self.set_number)
    }
}

/// A reconciled season record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: OpaqueId,
    pub source_id: i64,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub program: Field<Program>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub start_year: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
}

impl Season {
    /// A season record carrying only its identity; reconciled fields
    /// start absent.
    pub fn new(id: OpaqueId, source_id: i64) -> Self {
        Self {
            id,
            source_id,
            program: Field::Absent,
            start_year: Field::Absent,
            name: Field::Absent,
            description: Field::Absent,
        }
    }
}

impl EntityRecord for Season {
    type Key = SeasonKey;
    type Filter = SeasonFilter;
    type OrderField = SeasonOrderField;

    const KIND: EntityKind = EntityKind::Season;

    fn id(&self) -> &OpaqueId {
        &self.id
    }

    fn natural_key(&self) -> SeasonKey {
        SeasonKey::new(self.source_id)
    }
}

/// A reconciled country record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: OpaqueId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
}

impl Country {
    /// A country record carrying only its identity; the name starts
    /// absent.
    pub fn new(id: OpaqueId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: Field::Absent,
        }
    }
}

impl EntityRecord for Country {
    type Key = CountryKey;
    type Filter = CountryFilter;
    type OrderField = CountryOrderField;

    const KIND: EntityKind = EntityKind::Country;

    fn id(&self) -> &OpaqueId {
        &self.id
    }

    fn natural_key(&self) -> CountryKey {
        CountryKey::new(self.code.clone())
    }
}

/// An auth-subsystem user, recognized by structure but never resolved
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: OpaqueId,
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
}

/// An auth-subsystem role, recognized by tag but never resolved here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: OpaqueId,
    pub name: String,
}
