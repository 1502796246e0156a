use std::fmt;

use serde_json::{Map, Value};

use crate::number::{value_as_exact_int, value_as_int};

pub type Record = Map<String, Value>;

pub const KEY_ID: &str = "id";
pub const KEY_UNIT_ID: &str = "unitId";
pub const KEY_TEAM: &str = "team";
pub const KEY_NAME: &str = "unitname";
pub const KEY_LEVEL: &str = "level";
pub const KEY_POTENTIAL_POINT: &str = "potentialPoint";
pub const KEY_SKILL_POINT: &str = "skillPoint";
pub const KEY_LIVING_SKILL_POINT: &str = "livingSkillPoint";

/// Numeric record fields the editor knows how to bulk-edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Level,
    PotentialPoint,
    SkillPoint,
    LivingSkillPoint,
    Strength,
    Endurance,
    Agility,
    Precision,
    Intelligence,
    Willpower,
}

impl EditableField {
    pub const ALL: [EditableField; 10] = [
        Self::Level,
        Self::PotentialPoint,
        Self::SkillPoint,
        Self::LivingSkillPoint,
        Self::Strength,
        Self::Endurance,
        Self::Agility,
        Self::Precision,
        Self::Intelligence,
        Self::Willpower,
    ];

    pub const BASE_STATS: [EditableField; 6] = [
        Self::Strength,
        Self::Endurance,
        Self::Agility,
        Self::Precision,
        Self::Intelligence,
        Self::Willpower,
    ];

    /// Key of this field inside a record map.
    pub fn key(&self) -> &'static str {
        match *self {
            Self::Level => KEY_LEVEL,
            Self::PotentialPoint => KEY_POTENTIAL_POINT,
            Self::SkillPoint => KEY_SKILL_POINT,
            Self::LivingSkillPoint => KEY_LIVING_SKILL_POINT,
            Self::Strength => "BSstrength",
            Self::Endurance => "BSendurance",
            Self::Agility => "BSagility",
            Self::Precision => "BSprecision",
            Self::Intelligence => "BSintelligence",
            Self::Willpower => "BSwillpower",
        }
    }

}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Integer value of `key`, with absent, null and non-numeric values read as 0.
pub fn int_field(record: &Record, key: &str) -> i64 {
    opt_int_field(record, key).unwrap_or(0)
}

pub fn opt_int_field(record: &Record, key: &str) -> Option<i64> {
    record.get(key).and_then(value_as_int)
}

/// Display name of a record; missing, null and falsy names become "".
pub fn name_of(record: &Record) -> String {
    match record.get(KEY_NAME) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Team id of a record; fractional or non-numeric teams are no team at all.
pub fn team_of(record: &Record) -> Option<i64> {
    record.get(KEY_TEAM).and_then(value_as_exact_int)
}

pub fn level_of(record: &Record) -> i64 {
    int_field(record, KEY_LEVEL)
}
