pub mod backup;
pub mod bulk_edit;
pub mod core_api;
pub mod liveness;
pub mod number;
pub mod record;
pub mod roster;
