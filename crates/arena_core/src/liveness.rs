//! Heuristics for spotting dead characters in a roster.

use std::fmt;

use serde_json::Value;

use crate::number::{is_truthy, value_as_f64};
use crate::record::Record;

const DEAD_FLAG_KEYS: [&str; 2] = ["isDead", "dead"];
const HIT_POINT_KEYS: [&str; 5] = ["hp", "HP", "currentHp", "curHp", "currentHP"];
const DEAD_GLADIATOR_STATE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Flagged(&'static str),
    DeathDate,
    State,
    GladiatorState,
    HitPoints(&'static str),
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Flagged(key) => write!(f, "{key} flag set"),
            Self::DeathDate => f.write_str("deathDate set"),
            Self::State => f.write_str("state is dead"),
            Self::GladiatorState => f.write_str("gladiatorState >= 5"),
            Self::HitPoints(key) => write!(f, "{key} <= 0"),
        }
    }
}

/// Returns true if `value` is a record that looks dead. Non-map values are
/// never dead.
pub fn is_dead(value: &Value) -> bool {
    value.as_object().is_some_and(is_dead_record)
}

pub fn is_dead_record(record: &Record) -> bool {
    death_cause(record).is_some()
}

/// First matching death condition, checked in a fixed order.
pub fn death_cause(record: &Record) -> Option<DeathCause> {
    for key in DEAD_FLAG_KEYS {
        if record.get(key).is_some_and(is_truthy) {
            return Some(DeathCause::Flagged(key));
        }
    }

    if number(record, "deathDate").is_some_and(|d| d > 0.0) {
        return Some(DeathCause::DeathDate);
    }

    if record
        .get("state")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("dead"))
    {
        return Some(DeathCause::State);
    }

    if number(record, "gladiatorState").is_some_and(|s| s >= DEAD_GLADIATOR_STATE) {
        return Some(DeathCause::GladiatorState);
    }

    HIT_POINT_KEYS
        .into_iter()
        .find(|key| number(record, key).is_some_and(|hp| hp <= 0.0))
        .map(DeathCause::HitPoints)
}

fn number(record: &Record, key: &str) -> Option<f64> {
    record.get(key).and_then(value_as_f64)
}
