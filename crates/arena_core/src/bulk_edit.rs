//! Bulk numeric edits across a selection of roster records.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::liveness;
use crate::number::parse_int;
use crate::record::{self, EditableField, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Add the requested value to the current one.
    #[default]
    Add,
    /// Replace the current value.
    Set,
}

/// A set of `(field, requested value)` pairs applied with one mode. Values are
/// kept as entered; blank values do not participate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkEdit {
    pub mode: EditMode,
    pub fields: Vec<(String, String)>,
}

impl BulkEdit {
    pub fn new(mode: EditMode) -> Self {
        Self {
            mode,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn with_field(self, field: EditableField, value: impl Into<String>) -> Self {
        self.with(field.key(), value)
    }

    fn participating(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .filter(|(_, value)| !value.trim().is_empty())
    }

    /// Participating fields whose value parses as an integer.
    fn parsed(&self) -> Result<Vec<(&str, i64)>, CoreError> {
        let mut considered = 0usize;
        let mut parsed = Vec::new();
        for (key, raw) in self.participating() {
            considered += 1;
            match parse_int(raw) {
                Some(v) => parsed.push((key, v)),
                None => log::debug!("skipping {key}: {raw:?} is not an integer"),
            }
        }

        if considered == 0 {
            return Err(CoreError::new(
                CoreErrorCode::Validation,
                "enter at least one field value to apply",
            ));
        }
        if parsed.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::Validation,
                "none of the supplied field values is an integer",
            ));
        }
        Ok(parsed)
    }
}

/// New value of a field under `mode`, never below zero.
pub fn edited_value(mode: EditMode, current: i64, requested: i64) -> i64 {
    match mode {
        EditMode::Add => current.saturating_add(requested).max(0),
        EditMode::Set => requested.max(0),
    }
}

/// Applies `edit` to the records at `targets` in place and returns how many
/// records were touched. Duplicate, out-of-range, non-map and dead targets
/// are ignored.
pub fn apply_bulk_edit(
    records: &mut [Value],
    targets: &[usize],
    edit: &BulkEdit,
) -> Result<usize, CoreError> {
    let fields = edit.parsed()?;
    let targets: BTreeSet<usize> = targets.iter().copied().collect();

    let mut count = 0;
    for index in targets {
        let Some(record) = records.get_mut(index).and_then(Value::as_object_mut) else {
            log::debug!("bulk edit target {index} is not a record, skipping");
            continue;
        };
        if liveness::is_dead_record(record) {
            log::debug!("bulk edit target {index} is dead, skipping");
            continue;
        }
        apply_to_record(record, &fields, edit.mode);
        count += 1;
    }

    log::debug!(
        "bulk edit ({:?}) of {} field(s) applied to {count} record(s)",
        edit.mode,
        fields.len()
    );
    Ok(count)
}

fn apply_to_record(record: &mut Record, fields: &[(&str, i64)], mode: EditMode) {
    for &(key, requested) in fields {
        let current = record::int_field(record, key);
        record.insert(
            key.to_string(),
            Value::from(edited_value(mode, current, requested)),
        );
    }
}
