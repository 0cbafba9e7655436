// Library root: season record model, record stores, CSV import, and configuration.

pub mod config;
pub mod db;
pub mod import;
pub mod record;
pub mod store;

pub use record::SeasonRecord;
pub use store::{MemoryStore, StatStore, YearPushdown};
