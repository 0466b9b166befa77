//! Destinations for the per-platform asset lists.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::assets::AssetRecord;

/// Receives one asset list per (target key, platform) pair.
pub trait OutputSink {
    fn write(&mut self, label: &str, assets: &[AssetRecord]) -> io::Result<()>;
}

/// Writes each list to `<dir>/<label>.json` as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a list is written to. Labels must stay inside the output
    /// directory, so path separators are rejected.
    pub fn path_for(&self, label: &str) -> io::Result<PathBuf> {
        if label.is_empty() || label.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("list label {:?} is not a plain file name", label),
            ));
        }
        Ok(self.dir.join(format!("{}.json", label)))
    }

    /// Files written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl OutputSink for JsonFileSink {
    fn write(&mut self, label: &str, assets: &[AssetRecord]) -> io::Result<()> {
        let path = self.path_for(label)?;
        fs::create_dir_all(&self.dir)?;

        let content = serde_json::to_string_pretty(assets).map_err(io::Error::other)?;
        fs::write(&path, format!("{}\n", content))?;

        self.written.push(path);
        Ok(())
    }
}

/// Keeps every list in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub lists: Vec<(String, Vec<AssetRecord>)>,
}

impl MemorySink {
    pub fn get(&self, label: &str) -> Option<&[AssetRecord]> {
        self.lists
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, assets)| assets.as_slice())
    }

    pub fn labels(&self) -> Vec<&str> {
        self.lists.iter().map(|(label, _)| label.as_str()).collect()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, label: &str, assets: &[AssetRecord]) -> io::Result<()> {
        self.lists.push((label.to_string(), assets.to_vec()));
        Ok(())
    }
}
