//! CSV codec and snapshot persistence for forecast tables.

pub mod dir_store;
pub mod snapshot;
pub mod tables;

pub use dir_store::{DirectoryStore, DirectoryStoreFactory};
pub use snapshot::{
    DatasetError, LoadReport, LoadStatus, SaveReport, copy_datasets, decode_dataset,
    encode_dataset, load_snapshot, save_snapshot,
};
pub use tables::{CsvLoadError, CsvTable, read_table, write_table};
