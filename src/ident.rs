//! # Opaque identifier codec
//!
//! Every record exposed by the core carries an opaque, URL-safe identifier
//! that round-trips losslessly to the record's natural key. The encoded
//! form is `base64url_no_pad("<kind-tag>:<component>...")`, with components
//! joined by `:`. The delimiter sits outside the base64url alphabet, so an
//! already-encoded id can itself appear as a component (match ids embed
//! their parent event id this way) without any escaping.
//!
//! User identifiers are the one exception: they are bare UUIDs minted by
//! the account system, never by this codec. [`classify_id`] recognizes
//! them structurally before attempting base64 decode, because a 36-char
//! UUID string is also valid base64url text and would otherwise fall
//! through to a confusing decode error.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{
    CountryKey, EntityKind, EventKey, MatchKey, MatchLevel, OpaqueId, Program, RoleKey, SeasonKey,
    TeamKey,
};

/// A natural key that can be packed into and unpacked from an opaque id.
///
/// Implementations write their components in a fixed order and must accept
/// exactly that shape back. Component strings must not contain `:`.
pub trait NaturalKey: Sized {
    /// The entity kind tag leading every encoded id of this type.
    const KIND: EntityKind;

    /// Appends the key's components to `out`.
    fn write_components(&self, out: &mut Vec<String>);

    /// Rebuilds the key from decoded components, in the order written.
    fn from_components(parts: &[&str]) -> Result<Self>;
}

/// Encodes a natural key into its opaque identifier.
///
/// Rejects any string component containing the `:` delimiter; an
/// ambiguous encoding is never produced.
pub fn encode_id<K: NaturalKey>(key: &K) -> Result<OpaqueId> {
    let mut parts = vec![K::KIND.tag().to_string()];
    key.write_components(&mut parts);
    for part in &parts[1..] {
        if part.contains(':') {
            return Err(Error::invalid_identifier(format!(
                "{} key component {part:?} contains the delimiter",
                K::KIND
            )));
        }
    }
    Ok(OpaqueId::new(URL_SAFE_NO_PAD.encode(parts.join(":"))))
}

/// Decodes an opaque identifier back into the expected natural key.
///
/// Fails with [`Error::InvalidIdentifier`] when the text is not valid
/// base64url, the payload is not UTF-8, the kind tag does not match `K`,
/// or the component shape is wrong.
pub fn decode_id<K: NaturalKey>(id: &OpaqueId) -> Result<K> {
    let payload = decode_payload(id.as_str())?;
    let parts: Vec<&str> = payload.split(':').collect();
    let (tag, rest) = parts
        .split_first()
        .ok_or_else(|| Error::invalid_identifier("empty identifier payload"))?;
    if *tag != K::KIND.tag() {
        return Err(Error::invalid_identifier(format!(
            "expected {} identifier, found tag {tag:?}",
            K::KIND
        )));
    }
    K::from_components(rest)
}

/// What an identifier turned out to be, without committing to a full decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdClass {
    /// A codec-minted id for the given entity kind.
    Entity(EntityKind),
    /// A bare UUID, i.e. a user id minted by the account system.
    User(Uuid),
}

/// Classifies an opaque identifier by shape.
///
/// UUIDs are checked first: they are structurally unambiguous, whereas the
/// base64url alphabet happens to admit the hyphenated UUID text form.
pub fn classify_id(id: &OpaqueId) -> Result<IdClass> {
    if let Ok(uuid) = Uuid::try_parse(id.as_str()) {
        return Ok(IdClass::User(uuid));
    }
    let payload = decode_payload(id.as_str())?;
    let tag = payload.split(':').next().unwrap_or("");
    let kind = EntityKind::from_tag(tag)
        .ok_or_else(|| Error::invalid_identifier(format!("unknown entity tag {tag:?}")))?;
    Ok(IdClass::Entity(kind))
}

pub(crate) fn decode_payload(text: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| Error::invalid_identifier(format!("not base64url: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| Error::invalid_identifier("identifier payload is not UTF-8"))
}

pub(crate) fn expect_len(parts: &[&str], want: usize, what: &str) -> Result<()> {
    if parts.len() == want {
        Ok(())
    } else {
        Err(Error::invalid_identifier(format!(
            "{what} identifier needs {want} components, found {}",
            parts.len()
        )))
    }
}

pub(crate) fn parse_int<T: std::str::FromStr>(text: &str, what: &str) -> Result<T> {
    text.parse()
        .map_err(|_| Error::invalid_identifier(format!("{what} component {text:?} is not numeric")))
}

fn nonempty(text: &str, what: &str) -> Result<String> {
    if text.is_empty() {
        return Err(Error::invalid_identifier(format!(
            "{what} component must not be empty"
        )));
    }
    Ok(text.to_string())
}

impl NaturalKey for TeamKey {
    const KIND: EntityKind = EntityKind::Team;

    fn write_components(&self, out: &mut Vec<String>) {
        out.push(self.program.code().to_string());
        out.push(self.number.to_string());
    }

    fn from_components(parts: &[&str]) -> Result<Self> {
        expect_len(parts, 2, "team")?;
        let program = Program::from_code(parts[0])
            .ok_or_else(|| Error::invalid_identifier(format!("unknown program {:?}", parts[0])))?;
        let number: u32 = parse_int(parts[1], "team number")?;
        if number == 0 {
            return Err(Error::invalid_identifier("team number must be positive"));
        }
        Ok(TeamKey::new(program, number))
    }
}

impl NaturalKey for EventKey {
    const KIND: EntityKind = EntityKind::Event;

    fn write_components(&self, out: &mut Vec<String>) {
        out.push(self.season.to_string());
        out.push(self.code.clone());
    }

    fn from_components(parts: &[&str]) -> Result<Self> {
        expect_len(parts, 2, "event")?;
        let season: i32 = parse_int(parts[0], "event season")?;
        let code = nonempty(parts[1], "event code")?;
        Ok(EventKey::new(season, code))
    }
}

impl NaturalKey for MatchKey {
    const KIND: EntityKind = EntityKind::Match;

    fn write_components(&self, out: &mut Vec<String>) {
        out.push(self.event.as_str().to_string());
        out.push(self.level.code().to_string());
        out.push(self.number.to_string());
        out.push(self.set_number.to_string());
    }

    fn from_components(parts: &[&str]) -> Result<Self> {
        expect_len(parts, 4, "match")?;
        let event = OpaqueId::new(nonempty(parts[0], "match event")?);
        let level = MatchLevel::from_code(parts[1]).ok_or_else(|| {
            Error::invalid_identifier(format!("unknown match level {:?}", parts[1]))
        })?;
        let number: u32 = parse_int(parts[2], "match number")?;
        let set_number: u32 = parse_int(parts[3], "match set number")?;
        Ok(MatchKey::new(event, level, number, set_number))
    }
}

impl NaturalKey for SeasonKey {
    const KIND: EntityKind = EntityKind::Season;

    fn write_components(&self, out: &mut Vec<String>) {
        out.push(self.source_id.to_string());
    }

    fn from_components(parts: &[&str]) -> Result<Self> {
        expect_len(parts, 1, "season")?;
        let source_id: i64 = parse_int(parts[0], "season source id")?;
        Ok(SeasonKey::new(source_id))
    }
}

impl NaturalKey for CountryKey {
    const KIND: EntityKind = EntityKind::Country;

    fn write_components(&self, out: &mut Vec<String>) {
        out.push(self.iso_code.clone());
    }

    fn from_components(parts: &[&str]) -> Result<Self> {
        expect_len(parts, 1, "country")?;
        Ok(CountryKey::new(nonempty(parts[0], "country code")?))
    }
}

impl NaturalKey for RoleKey {
    const KIND: EntityKind = EntityKind::Role;

    fn write_components(&self, out: &mut Vec<String>) {
        out.push(self.name.clone());
    }

    fn from_components(parts: &[&str]) -> Result<Self> {
        expect_len(parts, 1, "role")?;
        Ok(RoleKey::new(nonempty(parts[0], "role name")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_key_round_trips() {
        let key = TeamKey::new(Program::Frc, 254);
        let id = encode_id(&key).unwrap();
        assert_eq!(decode_id::<TeamKey>(&id).unwrap(), key);
    }

    #[test]
    fn event_key_round_trips() {
        let key = EventKey::new(2024, "CASJ".to_string());
        let id = encode_id(&key).unwrap();
        assert_eq!(decode_id::<EventKey>(&id).unwrap(), key);
    }

    #[test]
    fn match_key_embeds_event_id() {
        let event_id = encode_id(&EventKey::new(2024, "CASJ".to_string())).unwrap();
        let key = MatchKey::new(event_id.clone(), MatchLevel::Qualification, 12, 1);
        let id = encode_id(&key).unwrap();
        let decoded = decode_id::<MatchKey>(&id).unwrap();
        assert_eq!(decoded.event, event_id);
        assert_eq!(decoded.number, 12);
        // The embedded id survives a second round trip intact.
        assert_eq!(
            decode_id::<EventKey>(&decoded.event).unwrap(),
            EventKey::new(2024, "CASJ".to_string())
        );
    }

    #[test]
    fn season_and_country_round_trip() {
        let season = SeasonKey::new(190);
        assert_eq!(
            decode_id::<SeasonKey>(&encode_id(&season).unwrap()).unwrap(),
            season
        );
        let country = CountryKey::new("US".to_string());
        assert_eq!(
            decode_id::<CountryKey>(&encode_id(&country).unwrap()).unwrap(),
            country
        );
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let id = encode_id(&TeamKey::new(Program::Ftc, 11115)).unwrap();
        let err = decode_id::<EventKey>(&id).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn delimiter_in_component_is_rejected() {
        let key = EventKey::new(2024, "CA:SJ".to_string());
        assert!(encode_id(&key).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in ["not base64 at all!!", "", "AAAA"] {
            assert!(decode_id::<TeamKey>(&OpaqueId::new(bad)).is_err());
        }
    }

    #[test]
    fn zero_team_number_is_rejected() {
        let id = OpaqueId::new(URL_SAFE_NO_PAD.encode("team:FRC:0"));
        assert!(decode_id::<TeamKey>(&id).is_err());
    }

    #[test]
    fn classify_prefers_uuid_shape() {
        let uuid = Uuid::try_parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let class = classify_id(&OpaqueId::new(uuid.to_string())).unwrap();
        assert_eq!(class, IdClass::User(uuid));
    }

    #[test]
    fn classify_recognizes_entity_tags() {
        let id = encode_id(&EventKey::new(2023, "TXHOU".to_string())).unwrap();
        assert_eq!(classify_id(&id).unwrap(), IdClass::Entity(EntityKind::Event));
    }

    #[test]
    fn classify_rejects_user_tagged_payloads() {
        // "user" is not a codec tag; user ids are bare UUIDs only.
        let id = OpaqueId::new(URL_SAFE_NO_PAD.encode("user:whoever"));
        assert!(classify_id(&id).is_err());
    }
}
