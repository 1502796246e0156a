mod engine;
mod error;
mod store;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use store::SaveStore;
pub use types::{
    BaseStats, DEFAULT_FILENAME, DEFAULT_GOLD_KEY, DEFAULT_PLAYER_TEAM, DEFAULT_REPUTATION_KEY,
    DeadRecordPolicy, RecordSummary, SaveOptions, SaveReport, StoreConfig,
};
