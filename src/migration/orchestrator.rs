//! End-to-end migration run.
//!
//! Phases run strictly in order and the first failure aborts the run:
//!
//! 1. Build the source key directory (declared or fetched).
//! 2. When validation is requested, fetch the target directory and check key
//!    compatibility.
//! 3. Resolve the source id → target id mapping.
//! 4. Fetch each mapped source key's assets and merge them per target id.
//! 5. Partition every target's assets by platform.
//! 6. Hand each bucket to the output sink.

use log::info;

use super::assets::{AssetRecord, Platform, TargetBuckets, fetch_assets};
use super::keys::{KeyDirectory, fetch_all_keys};
use super::mapping::{KeyMapping, KeyMappingResolver};
use super::sink::OutputSink;
use crate::api::PlatformApi;
use crate::config::Config;
use crate::error::{MigrationError, Result};

/// Drives one migration run between a source and a target account.
///
/// All per-run state lives on the stack of [`Migration::run`]; a `Migration`
/// can be run any number of times.
pub struct Migration<'a> {
    source_api: &'a dyn PlatformApi,
    target_api: &'a dyn PlatformApi,
    validate_keys: bool,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub targets: Vec<TargetSummary>,
}

impl MigrationReport {
    pub fn total_assets(&self) -> usize {
        self.targets.iter().map(TargetSummary::total).sum()
    }
}

/// Per-target asset counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
    pub target_id: String,
    pub source_ids: Vec<String>,
    pub windows: usize,
    pub linux: usize,
    pub incompatible: usize,
}

impl TargetSummary {
    pub fn total(&self) -> usize {
        self.windows + self.linux + self.incompatible
    }
}

/// Assets accumulated for one target id, in fetch order.
struct Accumulated {
    target_id: String,
    source_ids: Vec<String>,
    assets: Vec<AssetRecord>,
}

impl<'a> Migration<'a> {
    pub fn new(source_api: &'a dyn PlatformApi, target_api: &'a dyn PlatformApi) -> Self {
        Self {
            source_api,
            target_api,
            validate_keys: false,
        }
    }

    /// Check source/target key compatibility before fetching any asset.
    pub fn validate_keys(mut self, validate: bool) -> Self {
        self.validate_keys = validate;
        self
    }

    pub fn run(&self, config: &Config, sink: &mut dyn OutputSink) -> Result<MigrationReport> {
        let declared = config.declared_mapping()?;

        let source = self.source_directory(config)?;
        let target = self.target_directory(config)?;

        let resolver = KeyMappingResolver::new(&source, &target, &declared);
        if self.validate_keys {
            info!("Starting activation key validation");
            resolver.validate()?;
        }
        let mapping = resolver.resolve()?;
        info!("Resolved {} source key(s) for migration", mapping.len());

        let accumulated = self.collect_assets(&mapping)?;
        write_buckets(accumulated, sink)
    }

    fn source_directory(&self, config: &Config) -> Result<KeyDirectory> {
        match config.declared_source_keys() {
            Some(keys) => {
                let directory = KeyDirectory::from_declared(keys.0.clone());
                if self.validate_keys {
                    info!("Getting source activation keys");
                    let records = fetch_all_keys(self.source_api)?;
                    Ok(directory.with_records(records))
                } else {
                    Ok(directory)
                }
            }
            None => {
                info!("No source keys configured, getting all activation keys from the source");
                Ok(KeyDirectory::fetch(self.source_api)?)
            }
        }
    }

    /// Target ids come from the live listing whenever validation runs or the
    /// configuration only names the keys; otherwise the declared ids are used.
    fn target_directory(&self, config: &Config) -> Result<KeyDirectory> {
        let declared_ids = config.target.keys.as_ref().and_then(|keys| keys.ids());
        let mut directory = match declared_ids {
            Some(ids) if !self.validate_keys => KeyDirectory::from_declared(ids.0.clone()),
            _ => {
                info!("Getting target activation keys");
                KeyDirectory::fetch(self.target_api)?
            }
        };
        directory.retain_titles(&config.target_key_names());
        Ok(directory)
    }

    fn collect_assets(&self, mapping: &KeyMapping) -> Result<Vec<Accumulated>> {
        let mut accumulated: Vec<Accumulated> = Vec::new();
        for (source_id, target_id) in mapping.iter() {
            info!("Getting assets for source activation key {}", source_id);
            let assets = fetch_assets(self.source_api, source_id)?;

            match accumulated
                .iter_mut()
                .find(|entry| entry.target_id == target_id)
            {
                Some(entry) => {
                    entry.source_ids.push(source_id.to_string());
                    entry.assets.extend(assets);
                }
                None => accumulated.push(Accumulated {
                    target_id: target_id.to_string(),
                    source_ids: vec![source_id.to_string()],
                    assets,
                }),
            }
        }
        Ok(accumulated)
    }
}

fn write_buckets(
    accumulated: Vec<Accumulated>,
    sink: &mut dyn OutputSink,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();
    for entry in accumulated {
        let buckets = TargetBuckets::partition(entry.assets);
        for platform in Platform::ALL {
            let label = platform.sink_label(&entry.target_id);
            sink.write(&label, buckets.get(platform))
                .map_err(|source| MigrationError::Output { label, source })?;
        }
        report.targets.push(TargetSummary {
            target_id: entry.target_id,
            source_ids: entry.source_ids,
            windows: buckets.windows.len(),
            linux: buckets.linux.len(),
            incompatible: buckets.incompatible.len(),
        });
    }
    Ok(report)
}
