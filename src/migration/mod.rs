//! Activation key reconciliation and asset partitioning.
//!
//! - `keys`: key records, directories and lookup by title
//! - `compat`: source/target key compatibility check
//! - `mapping`: source key → target key resolution
//! - `assets`: asset records and platform buckets
//! - `sink`: destinations for the bucketed lists
//! - `orchestrator`: the end-to-end run

pub mod assets;
pub mod compat;
pub mod keys;
pub mod mapping;
pub mod orchestrator;
pub mod sink;

pub use assets::{AssetRecord, Platform, TargetBuckets, fetch_assets};
pub use compat::{COMPARED_FIELDS, compare_keys, first_mismatch};
pub use keys::{KeyDirectory, KeyRecord, fetch_all_keys, find_by_title};
pub use mapping::{DeclaredMapping, KeyMapping, KeyMappingResolver};
pub use orchestrator::{Migration, MigrationReport, TargetSummary};
pub use sink::{JsonFileSink, MemorySink, OutputSink};
