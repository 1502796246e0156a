//! Filtering and ordering of roster rows.

use std::cmp::Ordering;

use serde_json::Value;

use crate::number::{parse_int, value_as_exact_int};
use crate::record::{self, Record};

/// Roster filter and ordering criteria. The default matches every record and
/// uses the default ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterQuery {
    pub team: Option<i64>,
    /// Case-insensitive substring of the record name.
    pub name_contains: Option<String>,
    pub min_level: i64,
    pub underscore_only: bool,
    pub sort: Option<SortSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            descending: false,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            descending: true,
        }
    }
}

/// Column sort state: asking for the same key again flips the direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    current: Option<SortSpec>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, key: &str) -> &SortSpec {
        match &mut self.current {
            Some(spec) if spec.key == key => spec.descending = !spec.descending,
            current => *current = Some(SortSpec::ascending(key)),
        }
        self.current.get_or_insert_with(|| SortSpec::ascending(key))
    }

    pub fn spec(&self) -> Option<&SortSpec> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Sort key of a single field. Numbers order before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Number(i64),
    Text(String),
}

impl SortValue {
    /// Orders two values in the given direction. Numbers stay ahead of text
    /// either way; only the order inside each kind is reversed.
    pub fn cmp_directed(&self, other: &Self, descending: bool) -> Ordering {
        let ord = self.cmp(other);
        match (self, other) {
            (Self::Number(_), Self::Number(_)) | (Self::Text(_), Self::Text(_)) if descending => {
                ord.reverse()
            }
            _ => ord,
        }
    }
}

pub fn sort_value(record: &Record, key: &str) -> SortValue {
    match record.get(key) {
        None | Some(Value::Null) => SortValue::Text(String::new()),
        Some(Value::String(s)) => match parse_int(s) {
            Some(n) => SortValue::Number(n),
            None => SortValue::Text(s.clone()),
        },
        Some(other) => match value_as_exact_int(other) {
            Some(n) => SortValue::Number(n),
            None => SortValue::Text(other.to_string()),
        },
    }
}

impl RosterQuery {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(team) = self.team {
            if record::team_of(record) != Some(team) {
                return false;
            }
        }

        let name = record::name_of(record);
        if self.underscore_only && !name.contains('_') {
            return false;
        }
        if let Some(needle) = self.name_contains.as_deref() {
            let needle = needle.trim().to_lowercase();
            if !needle.is_empty() && !name.to_lowercase().contains(&needle) {
                return false;
            }
        }

        record::level_of(record) >= self.min_level
    }

    /// Whether `name` matched a non-empty search needle, for highlighting.
    pub fn name_hit(&self, name: &str) -> bool {
        self.name_contains
            .as_deref()
            .map(|needle| needle.trim().to_lowercase())
            .filter(|needle| !needle.is_empty())
            .is_some_and(|needle| name.to_lowercase().contains(&needle))
    }

    /// Filters and orders `rows`, keeping each row's original index.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<(usize, &'a Record)>
    where
        I: IntoIterator<Item = (usize, &'a Record)>,
    {
        let mut out: Vec<(usize, &'a Record)> = rows
            .into_iter()
            .filter(|(_, record)| self.matches(record))
            .collect();

        match &self.sort {
            Some(spec) => out.sort_by(|(_, a), (_, b)| {
                sort_value(a, &spec.key).cmp_directed(&sort_value(b, &spec.key), spec.descending)
            }),
            None => out.sort_by(|(_, a), (_, b)| default_order(a, b)),
        }
        out
    }
}

/// Team ascending, then level descending, then name ascending.
pub fn default_order(a: &Record, b: &Record) -> Ordering {
    let team = |r: &Record| record::team_of(r).unwrap_or(0);
    team(a)
        .cmp(&team(b))
        .then_with(|| record::level_of(b).cmp(&record::level_of(a)))
        .then_with(|| record::name_of(a).cmp(&record::name_of(b)))
}
