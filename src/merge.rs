//! # Field-precedence reconciliation
//!
//! Records for the same natural key can arrive from up to three sources.
//! Precedence is a fixed total order: search index, then the partner
//! result feed, then local overrides. [`merge_field`] applies one overlay
//! field at a time with null-fallback semantics: an explicit null in a
//! higher-precedence source only stands when no lower source supplied a
//! value, so a partial override never erases data it did not mean to
//! touch.
//!
//! Identity fields (the id and the natural-key components) never merge;
//! they are fixed at record construction.

use hashbrown::HashMap;

use crate::model::{Country, EntityRecord, Event, Field, Match, Season, Team};

/// Applies a higher-precedence overlay onto one field.
///
/// An overlay value always wins. An overlay null falls back to the base
/// value when one exists and otherwise stands as null. An absent overlay
/// leaves the base untouched.
pub fn merge_field<T>(base: Field<T>, overlay: Field<T>) -> Field<T> {
    match overlay {
        Field::Value(v) => Field::Value(v),
        Field::Null => match base {
            Field::Value(v) => Field::Value(v),
            _ => Field::Null,
        },
        Field::Absent => base,
    }
}

/// A record whose non-identity fields can absorb a higher-precedence
/// overlay of the same entity.
pub trait Merge {
    fn absorb(&mut self, overlay: Self);
}

/// Reconciles one record from its source layers, lowest precedence first.
pub fn merge_one<E: Merge>(base: E, overlays: impl IntoIterator<Item = E>) -> E {
    let mut merged = base;
    for overlay in overlays {
        merged.absorb(overlay);
    }
    merged
}

/// Reconciles an ordered page of primary records against an override map
/// keyed by natural key.
///
/// The primary ordering is preserved; override records without a primary
/// counterpart are dropped, since only the primary source defines
/// membership of a list result.
pub fn merge_many<E>(primary: Vec<E>, mut overrides: HashMap<E::Key, E>) -> Vec<E>
where
    E: EntityRecord + Merge,
{
    primary
        .into_iter()
        .map(|mut record| {
            let key = record.natural_key();
            if let Some(overlay) = overrides.remove(&key) {
                record.absorb(overlay);
            }
            record
        })
        .collect()
}

macro_rules! absorb_fields {
    ($base:ident, $overlay:ident, $($field:ident),+ $(,)?) => {
        $(
            $base.$field = merge_field(std::mem::take(&mut $base.$field), $overlay.$field);
        )+
    };
}

impl Merge for Team {
    fn absorb(&mut self, overlay: Self) {
        absorb_fields!(
            self,
            overlay,
            name_short,
            name_full,
            school_name,
            city,
            state_prov,
            country,
            rookie_year,
            robot_name,
            district_code,
            website,
            home_cmp,
        );
    }
}

impl Merge for Event {
    fn absorb(&mut self, overlay: Self) {
        absorb_fields!(
            self,
            overlay,
            program,
            name,
            event_type,
            address,
            venue,
            city,
            state_prov,
            country_code,
            timezone,
            website,
            date_start,
            date_end,
            division_ids,
        );
    }
}

impl Merge for Match {
    fn absorb(&mut self, overlay: Self) {
        absorb_fields!(
            self,
            overlay,
            description,
            actual_start_time,
            post_result_time,
            winner,
            red,
            blue,
        );
    }
}

impl Merge for Season {
    fn absorb(&mut self, overlay: Self) {
        absorb_fields!(self, overlay, program, start_year, name, description);
    }
}

impl Merge for Country {
    fn absorb(&mut self, overlay: Self) {
        absorb_fields!(self, overlay, name);
    }
}
