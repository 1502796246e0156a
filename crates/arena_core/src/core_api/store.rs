use std::path::Path;

use chrono::NaiveDateTime;

use crate::bulk_edit::BulkEdit;
use crate::record::Record;
use crate::roster::RosterQuery;

use super::engine::{Engine, Session};
use super::error::CoreError;
use super::types::{RecordSummary, SaveOptions, SaveReport, StoreConfig};

/// Editing front door for a presentation layer: holds at most one loaded
/// save and reports a `State` error for operations that need one.
#[derive(Debug, Default)]
pub struct SaveStore {
    engine: Engine,
    session: Option<Session>,
}

impl SaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            engine: Engine::with_config(config),
            session: None,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.engine.config()
    }

    /// Loads `path`, replacing the current save only on success.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&Session, CoreError> {
        let session = self.engine.open_path(path)?;
        Ok(&*self.session.insert(session))
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Result<&Session, CoreError> {
        self.session.as_ref().ok_or_else(CoreError::not_loaded)
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, CoreError> {
        self.session.as_mut().ok_or_else(CoreError::not_loaded)
    }

    pub fn save(&self, options: &SaveOptions) -> Result<SaveReport, CoreError> {
        self.session()?.save(options)
    }

    pub fn save_at(
        &self,
        options: &SaveOptions,
        now: NaiveDateTime,
    ) -> Result<SaveReport, CoreError> {
        self.session()?.save_at(options, now)
    }

    pub fn get_gold(&self) -> Result<Option<i64>, CoreError> {
        Ok(self.session()?.gold())
    }

    pub fn set_gold(&mut self, raw: &str) -> Result<i64, CoreError> {
        Ok(self.session_mut()?.set_gold(raw))
    }

    pub fn get_reputation(&self) -> Result<Option<i64>, CoreError> {
        Ok(self.session()?.reputation())
    }

    pub fn set_reputation(&mut self, raw: &str) -> Result<i64, CoreError> {
        Ok(self.session_mut()?.set_reputation(raw))
    }

    pub fn iter_roster(
        &self,
        team: Option<i64>,
    ) -> Result<impl Iterator<Item = (usize, &Record)>, CoreError> {
        Ok(self.session()?.iter_roster(team))
    }

    pub fn query(&self, query: &RosterQuery) -> Result<Vec<RecordSummary>, CoreError> {
        Ok(self.session()?.summaries(query))
    }

    pub fn bulk_edit(&mut self, targets: &[usize], edit: &BulkEdit) -> Result<usize, CoreError> {
        self.session_mut()?.bulk_edit(targets, edit)
    }
}
