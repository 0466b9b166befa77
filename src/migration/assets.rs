//! Asset records and platform partitioning.

use std::fmt;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::api::{PlatformApi, TransportError};

/// JSON pointers tried, in order, to find an asset's platform string.
const PLATFORM_POINTERS: &[&str] = &["/HostAsset/agentInfo/platform", "/agentInfo/platform"];

/// One endpoint's inventory entry.
///
/// `record` is the listing entry exactly as returned and is what gets written
/// out; `platform` is lifted from it for classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssetRecord {
    #[serde(skip)]
    pub platform: String,
    pub record: Value,
}

impl AssetRecord {
    pub fn new(platform: impl Into<String>, record: Value) -> Self {
        Self {
            platform: platform.into(),
            record,
        }
    }

    /// Wrap a listing entry, reading the agent platform when present.
    ///
    /// An entry without a platform string gets an empty one and is therefore
    /// classified as [`Platform::Incompatible`].
    pub fn from_listing(record: Value) -> Self {
        let platform = PLATFORM_POINTERS
            .iter()
            .find_map(|pointer| record.pointer(pointer).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        Self { platform, record }
    }
}

/// Retrieve every asset installed with `key_id`. A key without assets yields
/// an empty list.
pub fn fetch_assets(
    api: &dyn PlatformApi,
    key_id: &str,
) -> Result<Vec<AssetRecord>, TransportError> {
    let assets = api.fetch_assets_by_key(key_id)?;
    debug!("Fetched {} asset(s) for activation key {}", assets.len(), key_id);
    Ok(assets)
}

/// Output bucket for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Platform {
    Windows,
    Linux,
    Incompatible,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Incompatible];

    /// Case-sensitive substring test; the Linux pattern is tried first.
    pub fn classify(platform: &str) -> Self {
        if platform.contains("LINUX") {
            Platform::Linux
        } else if platform.contains("Windows") || platform.contains("WINDOWS") {
            Platform::Windows
        } else {
            Platform::Incompatible
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Windows => "WINDOWS",
            Platform::Linux => "LINUX",
            Platform::Incompatible => "INCOMPATIBLE",
        }
    }

    /// Output sink label for this bucket of `target_id`.
    pub fn sink_label(self, target_id: &str) -> String {
        format!("{}_{}", target_id, self.label())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One target key's assets split by platform, each in accumulation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetBuckets {
    pub windows: Vec<AssetRecord>,
    pub linux: Vec<AssetRecord>,
    pub incompatible: Vec<AssetRecord>,
}

impl TargetBuckets {
    pub fn partition(assets: Vec<AssetRecord>) -> Self {
        let mut buckets = Self::default();
        for asset in assets {
            match Platform::classify(&asset.platform) {
                Platform::Windows => buckets.windows.push(asset),
                Platform::Linux => buckets.linux.push(asset),
                Platform::Incompatible => buckets.incompatible.push(asset),
            }
        }
        buckets
    }

    pub fn get(&self, platform: Platform) -> &[AssetRecord] {
        match platform {
            Platform::Windows => &self.windows,
            Platform::Linux => &self.linux,
            Platform::Incompatible => &self.incompatible,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len() + self.linux.len() + self.incompatible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
