use std::path::PathBuf;

use serde::Serialize;

use crate::record::{
    self, EditableField, KEY_ID, KEY_LIVING_SKILL_POINT, KEY_POTENTIAL_POINT, KEY_SKILL_POINT,
    KEY_UNIT_ID, Record,
};

pub const DEFAULT_FILENAME: &str = "sav.dat";
pub const DEFAULT_GOLD_KEY: &str = "wealth";
pub const DEFAULT_REPUTATION_KEY: &str = "reputation";
pub const DEFAULT_PLAYER_TEAM: i64 = 0;

/// What happens to dead records when a save is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadRecordPolicy {
    /// Drop them from the document; the next save no longer contains them.
    #[default]
    Prune,
    /// Keep them in the document but hide them from the roster.
    Retain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub gold_key: String,
    pub reputation_key: String,
    /// Team id treated as the player's roster. Observed in sample saves, not
    /// documented by the game.
    pub player_team: i64,
    pub dead_records: DeadRecordPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            gold_key: DEFAULT_GOLD_KEY.to_string(),
            reputation_key: DEFAULT_REPUTATION_KEY.to_string(),
            player_team: DEFAULT_PLAYER_TEAM,
            dead_records: DeadRecordPolicy::default(),
        }
    }
}

/// Serializes under the record's own `BS*` key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BaseStats {
    #[serde(rename = "BSstrength")]
    pub strength: i64,
    #[serde(rename = "BSendurance")]
    pub endurance: i64,
    #[serde(rename = "BSagility")]
    pub agility: i64,
    #[serde(rename = "BSprecision")]
    pub precision: i64,
    #[serde(rename = "BSintelligence")]
    pub intelligence: i64,
    #[serde(rename = "BSwillpower")]
    pub willpower: i64,
}

impl BaseStats {
    pub fn from_record(record: &Record) -> Self {
        let stat = |field: EditableField| record::int_field(record, field.key());
        Self {
            strength: stat(EditableField::Strength),
            endurance: stat(EditableField::Endurance),
            agility: stat(EditableField::Agility),
            precision: stat(EditableField::Precision),
            intelligence: stat(EditableField::Intelligence),
            willpower: stat(EditableField::Willpower),
        }
    }
}

/// Typed view of one roster record. Numeric fields read as 0 when absent.
///
/// Serializes as a flat row keyed like the save itself (`unitId`,
/// `unitname`, `BSstrength`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub index: usize,
    pub id: Option<i64>,
    pub unit_id: Option<i64>,
    pub team: Option<i64>,
    #[serde(rename = "unitname")]
    pub name: String,
    pub level: i64,
    pub potential_point: i64,
    pub skill_point: i64,
    pub living_skill_point: i64,
    #[serde(flatten)]
    pub base_stats: BaseStats,
}

impl RecordSummary {
    pub fn from_record(index: usize, record: &Record) -> Self {
        Self {
            index,
            id: record::opt_int_field(record, KEY_ID),
            unit_id: record::opt_int_field(record, KEY_UNIT_ID),
            team: record::team_of(record),
            name: record::name_of(record),
            level: record::level_of(record),
            potential_point: record::int_field(record, KEY_POTENTIAL_POINT),
            skill_point: record::int_field(record, KEY_SKILL_POINT),
            living_skill_point: record::int_field(record, KEY_LIVING_SKILL_POINT),
            base_stats: BaseStats::from_record(record),
        }
    }

    pub fn field(&self, field: EditableField) -> i64 {
        match field {
            EditableField::Level => self.level,
            EditableField::PotentialPoint => self.potential_point,
            EditableField::SkillPoint => self.skill_point,
            EditableField::LivingSkillPoint => self.living_skill_point,
            EditableField::Strength => self.base_stats.strength,
            EditableField::Endurance => self.base_stats.endurance,
            EditableField::Agility => self.base_stats.agility,
            EditableField::Precision => self.base_stats.precision,
            EditableField::Intelligence => self.base_stats.intelligence,
            EditableField::Willpower => self.base_stats.willpower,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Destination; `None` writes back to the path the save was loaded from.
    pub path: Option<PathBuf>,
    pub make_backup: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            path: None,
            make_backup: true,
        }
    }
}

impl SaveOptions {
    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn without_backup(mut self) -> Self {
        self.make_backup = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub destination: PathBuf,
    pub backup: Option<PathBuf>,
}
