//! ca-migrate - move Qualys cloud agents between subscriptions
//!
//! Enumerates the agents registered under activation keys in a source
//! subscription, decides which target activation key each agent moves to,
//! optionally checks that source and target keys are compatible, and writes
//! per-platform asset lists ready for re-installation under the target
//! subscription.
//!
//! ## Module Structure
//!
//! - `api`: Platform API seam and the Qualys QPS client
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and validation
//! - `error`: Error taxonomy shared by every phase of a run
//! - `migration`: Key reconciliation, asset fetching and partitioning

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod migration;
