use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde_json::{Map, Value};

use crate::backup;
use crate::bulk_edit::{self, BulkEdit};
use crate::liveness;
use crate::number::{coerce_int, value_as_int};
use crate::record::Record;
use crate::roster::RosterQuery;

use super::error::{CoreError, CoreErrorCode};
use super::types::{DeadRecordPolicy, RecordSummary, SaveOptions, SaveReport, StoreConfig};

const NPCS_KEY: &str = "npcs";

#[derive(Debug, Default, Clone)]
pub struct Engine {
    config: StoreConfig,
}

/// One loaded save document.
#[derive(Debug, Clone)]
pub struct Session {
    config: StoreConfig,
    path: Option<PathBuf>,
    document: Map<String, Value>,
    pruned_dead: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> Result<Session, CoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;

        let mut session = self.open_str(&text).map_err(|e| {
            CoreError::new(e.code, format!("{}: {}", path.display(), e.message))
        })?;
        session.path = Some(path.to_path_buf());

        log::info!(
            "loaded {} ({} roster records, {} dead pruned)",
            path.display(),
            session.roster().len(),
            session.pruned_dead
        );
        Ok(session)
    }

    /// Parses save text that has no backing file; saving it needs an
    /// explicit destination.
    pub fn open_str(&self, text: &str) -> Result<Session, CoreError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid JSON: {e}"))
        })?;
        let Value::Object(mut document) = value else {
            return Err(CoreError::new(
                CoreErrorCode::Parse,
                "save must be a single JSON object",
            ));
        };

        let mut pruned_dead = 0;
        match document.get_mut(NPCS_KEY) {
            Some(Value::Array(npcs)) => {
                if self.config.dead_records == DeadRecordPolicy::Prune {
                    let before = npcs.len();
                    npcs.retain(|npc| !liveness::is_dead(npc));
                    pruned_dead = before - npcs.len();
                }
            }
            _ => {
                document.insert(NPCS_KEY.to_string(), Value::Array(Vec::new()));
            }
        }

        Ok(Session {
            config: self.config.clone(),
            path: None,
            document,
            pruned_dead,
        })
    }
}

impl Session {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Number of dead records dropped while loading.
    pub fn pruned_dead(&self) -> usize {
        self.pruned_dead
    }

    /// Every entry of `npcs`, including non-map values (and dead records when
    /// they are retained).
    pub fn roster(&self) -> &[Value] {
        self.document
            .get(NPCS_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn roster_mut(&mut self) -> &mut [Value] {
        match self.document.get_mut(NPCS_KEY) {
            Some(Value::Array(items)) => items.as_mut_slice(),
            _ => &mut [],
        }
    }

    /// Live records as `(index, record)` pairs, optionally limited to one team.
    /// Indices are positions in [`Session::roster`].
    pub fn iter_roster(&self, team: Option<i64>) -> impl Iterator<Item = (usize, &Record)> {
        self.roster()
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.as_object().map(|record| (index, record)))
            .filter(|(_, record)| !liveness::is_dead_record(record))
            .filter(move |(_, record)| {
                team.is_none_or(|team| crate::record::team_of(record) == Some(team))
            })
    }

    pub fn player_roster(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.iter_roster(Some(self.config.player_team))
    }

    pub fn query(&self, query: &RosterQuery) -> Vec<(usize, &Record)> {
        query.apply(self.iter_roster(query.team))
    }

    pub fn summaries(&self, query: &RosterQuery) -> Vec<RecordSummary> {
        self.query(query)
            .into_iter()
            .map(|(index, record)| RecordSummary::from_record(index, record))
            .collect()
    }

    pub fn bulk_edit(&mut self, targets: &[usize], edit: &BulkEdit) -> Result<usize, CoreError> {
        bulk_edit::apply_bulk_edit(self.roster_mut(), targets, edit)
    }

    pub fn gold(&self) -> Option<i64> {
        self.scalar(&self.config.gold_key)
    }

    /// Stores `raw` as gold after lenient coercion and clamping at zero.
    pub fn set_gold(&mut self, raw: &str) -> i64 {
        let key = self.config.gold_key.clone();
        self.set_scalar(key, raw)
    }

    pub fn reputation(&self) -> Option<i64> {
        self.scalar(&self.config.reputation_key)
    }

    pub fn set_reputation(&mut self, raw: &str) -> i64 {
        let key = self.config.reputation_key.clone();
        self.set_scalar(key, raw)
    }

    fn scalar(&self, key: &str) -> Option<i64> {
        self.document.get(key).and_then(value_as_int)
    }

    fn set_scalar(&mut self, key: String, raw: &str) -> i64 {
        let value = coerce_int(raw).max(0);
        self.document.insert(key, Value::from(value));
        value
    }

    /// Compact JSON with non-ASCII text left unescaped.
    pub fn to_json_string(&self) -> Result<String, CoreError> {
        serde_json::to_string(&self.document).map_err(|e| {
            CoreError::new(CoreErrorCode::Io, format!("failed to serialize save: {e}"))
        })
    }

    pub fn save(&self, options: &SaveOptions) -> Result<SaveReport, CoreError> {
        self.save_at(options, Local::now().naive_local())
    }

    /// Like [`Session::save`], stamping any backup with `now`.
    pub fn save_at(
        &self,
        options: &SaveOptions,
        now: NaiveDateTime,
    ) -> Result<SaveReport, CoreError> {
        let destination = options
            .path
            .clone()
            .or_else(|| self.path.clone())
            .ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::State,
                    "no destination path: save was not loaded from a file",
                )
            })?;

        let json = self.to_json_string()?;

        let backup = if options.make_backup {
            match backup::write_backup(&destination, now) {
                Ok(backup) => backup,
                Err(e) => {
                    log::warn!("failed to create backup of {}: {e}", destination.display());
                    None
                }
            }
        } else {
            None
        };

        fs::write(&destination, json).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to write {}: {e}", destination.display()),
            )
        })?;

        log::info!("saved {}", destination.display());
        Ok(SaveReport {
            destination,
            backup,
        })
    }
}
