//! Source key → target key resolution.

use log::{debug, info};

use super::compat::first_mismatch;
use super::keys::{KeyDirectory, KeyRecord};
use crate::error::{MigrationError, Result};

/// How source keys are paired with target keys, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredMapping {
    /// One target key. Every source key is checked against it; a non-empty
    /// `only` lists the source name → target name pairs that migrate,
    /// otherwise every source key moves to `target`.
    SingleTarget {
        target: String,
        only: Vec<(String, String)>,
    },
    /// Explicit source name → target name pairs, in declaration order.
    ByName(Vec<(String, String)>),
}

/// Validated source key id → target key id mapping.
///
/// Source ids are distinct; a source key absent from the mapping is not
/// migrated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMapping {
    pairs: Vec<(String, String)>,
}

impl KeyMapping {
    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(source, _)| source == source_id)
            .map(|(_, target)| target.as_str())
    }

    /// `(source id, target id)` pairs in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn insert(&mut self, source_id: &str, target_id: &str) {
        if let Some(existing) = self.get(source_id) {
            debug!(
                "Source key id {} is already mapped to {}, ignoring mapping to {}",
                source_id, existing, target_id
            );
            return;
        }
        self.pairs
            .push((source_id.to_string(), target_id.to_string()));
    }
}

/// Resolves a [`DeclaredMapping`] against the source and target directories.
pub struct KeyMappingResolver<'a> {
    source: &'a KeyDirectory,
    target: &'a KeyDirectory,
    declared: &'a DeclaredMapping,
}

impl<'a> KeyMappingResolver<'a> {
    pub fn new(
        source: &'a KeyDirectory,
        target: &'a KeyDirectory,
        declared: &'a DeclaredMapping,
    ) -> Self {
        Self {
            source,
            target,
            declared,
        }
    }

    /// Name pairs covered by the declared mapping.
    pub fn name_pairs(&self) -> Vec<(&'a str, &'a str)> {
        match self.declared {
            DeclaredMapping::SingleTarget { target, only } if only.is_empty() => self
                .source
                .titles()
                .map(move |source| (source, target.as_str()))
                .collect(),
            DeclaredMapping::SingleTarget { only: pairs, .. }
            | DeclaredMapping::ByName(pairs) => pairs
                .iter()
                .map(|(source, target)| (source.as_str(), target.as_str()))
                .collect(),
        }
    }

    /// Check that every referenced key exists and that each pair is compatible.
    ///
    /// With a single target key every source key is checked against it,
    /// including source keys the declaration leaves out of the migration.
    /// Needs the raw key records on both directories. Stops at the first
    /// failure; no mapping is produced from a partially valid declaration.
    pub fn validate(&self) -> Result<()> {
        match self.declared {
            DeclaredMapping::SingleTarget { target, .. } => {
                info!(
                    "Single target key detected, checking {} against all source keys",
                    target
                );
                let target_record = self.target_record(target)?;
                for source in self.source.titles() {
                    let source_record = self.source_record(source)?;
                    check_pair(source_record, target_record)?;
                }
            }
            DeclaredMapping::ByName(_) => {
                self.check_names()?;
                for (source, target) in self.name_pairs() {
                    let source_record = self.source_record(source)?;
                    let target_record = self.target_record(target)?;
                    check_pair(source_record, target_record)?;
                }
            }
        }
        Ok(())
    }

    /// Translate the name-based declaration into a source id → target id mapping.
    pub fn resolve(&self) -> Result<KeyMapping> {
        self.check_names()?;
        let mut mapping = KeyMapping::default();
        for (source, target) in self.name_pairs() {
            let source_id = self.source_id(source)?;
            let target_id = self.target_id(target)?;
            debug!(
                "Mapping source key {} ({}) to target key {} ({})",
                source, source_id, target, target_id
            );
            mapping.insert(source_id, target_id);
        }
        Ok(mapping)
    }

    fn check_names(&self) -> Result<()> {
        let pairs = self.name_pairs();
        for (source, _) in &pairs {
            self.source_id(source)?;
        }
        if let DeclaredMapping::SingleTarget { target, .. } = self.declared {
            self.target_id(target)?;
        }
        for (_, target) in &pairs {
            self.target_id(target)?;
        }
        Ok(())
    }

    fn source_id(&self, name: &str) -> Result<&'a str> {
        self.source
            .id_of(name)
            .ok_or_else(|| MigrationError::UnknownSourceKey {
                name: name.to_string(),
            })
    }

    fn target_id(&self, name: &str) -> Result<&'a str> {
        self.target
            .id_of(name)
            .ok_or_else(|| MigrationError::UnknownTargetKey {
                name: name.to_string(),
            })
    }

    fn source_record(&self, name: &str) -> Result<&'a KeyRecord> {
        self.source
            .find_record(name)
            .ok_or_else(|| MigrationError::UnknownSourceKey {
                name: name.to_string(),
            })
    }

    fn target_record(&self, name: &str) -> Result<&'a KeyRecord> {
        self.target
            .find_record(name)
            .ok_or_else(|| MigrationError::UnknownTargetKey {
                name: name.to_string(),
            })
    }
}

fn check_pair(source: &KeyRecord, target: &KeyRecord) -> Result<()> {
    match first_mismatch(source, target) {
        None => Ok(()),
        Some(field) => Err(MigrationError::KeyIncompatible {
            source_key: source.title.clone().unwrap_or_else(|| source.id.clone()),
            target_key: target.title.clone().unwrap_or_else(|| target.id.clone()),
            field,
        }),
    }
}
