pub mod calculations;
pub mod db;
pub mod engine;
pub mod models;

pub use calculations::ScenarioError;
pub use db::repository::{Dataset, SnapshotStore, StoreError};
pub use engine::{DerivedTables, EngineError, ForecastEngine, Snapshot, recalculate};
pub use models::*;
