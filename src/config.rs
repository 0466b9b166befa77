use std::{
    collections::HashSet,
    fmt, fs,
    path::Path,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::error::{MigrationError, Result};
use crate::migration::DeclaredMapping;

pub const CONFIG_FILE_NAME: &str = "ca-migrate.json";

/// Migration configuration document.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub target: TargetConfig,
    /// Source key name → target key name.
    #[serde(default, skip_serializing_if = "KeyPairs::is_empty")]
    pub activation_key_map: KeyPairs,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    pub api_url: Option<String>,
    /// Source key name → id. When absent or empty, every key of the source
    /// subscription is in scope and fetched live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeyPairs>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TargetConfig {
    pub api_url: Option<String>,
    pub keys: Option<TargetKeys>,
}

/// Target keys are either declared with their ids or by name only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TargetKeys {
    Names(Vec<String>),
    Ids(KeyPairs),
}

impl TargetKeys {
    pub fn names(&self) -> Vec<&str> {
        match self {
            TargetKeys::Names(names) => names.iter().map(String::as_str).collect(),
            TargetKeys::Ids(pairs) => pairs.names().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TargetKeys::Names(names) => names.len(),
            TargetKeys::Ids(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared name → id pairs, or `None` when only names were given.
    pub fn ids(&self) -> Option<&KeyPairs> {
        match self {
            TargetKeys::Names(_) => None,
            TargetKeys::Ids(pairs) => Some(pairs),
        }
    }
}

/// A JSON object of string values, kept in declaration order.
///
/// Repeated keys are preserved so validation can reject them instead of one
/// silently overwriting the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPairs(pub Vec<(String, String)>);

impl KeyPairs {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn first_duplicate(&self) -> Option<&str> {
        first_duplicate(self.names())
    }
}

impl<'de> Deserialize<'de> for KeyPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = KeyPairs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping key names to strings")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<KeyPairs, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    pairs.push((name, value));
                }
                Ok(KeyPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

impl Serialize for KeyPairs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Config {
    /// Validate the document before any API client is created.
    ///
    /// Checks run in a fixed order and the first failure is reported.
    pub fn validate(&self) -> Result<()> {
        check_api_url(self.source.api_url.as_deref(), "source")?;
        check_api_url(self.target.api_url.as_deref(), "target")?;

        let target_keys = match &self.target.keys {
            None => {
                return Err(MigrationError::config(
                    "keys not specified in target configuration",
                ));
            }
            Some(keys) if keys.is_empty() => {
                return Err(MigrationError::config(
                    "keys is blank in target configuration",
                ));
            }
            Some(keys) => keys,
        };

        // Without a map there is no way to tell which agents go to which key.
        if target_keys.len() > 1 && self.activation_key_map.is_empty() {
            return Err(MigrationError::config(
                "multiple target keys specified but no activation_key_map supplied",
            ));
        }

        if let Some(name) = self.source.keys.as_ref().and_then(KeyPairs::first_duplicate) {
            return Err(duplicate_key("source keys", name));
        }
        if let Some(name) = first_duplicate(target_keys.names()) {
            return Err(duplicate_key("target keys", name));
        }
        if let Some(name) = self.activation_key_map.first_duplicate() {
            return Err(duplicate_key("activation_key_map", name));
        }

        // Target ids name the output files.
        if let Some((name, id)) = target_keys
            .ids()
            .and_then(|ids| ids.0.iter().find(|(_, id)| !is_file_name_safe(id)))
        {
            return Err(MigrationError::config(format!(
                "target key \"{}\" has id {:?}, which cannot be used as a file name",
                name, id
            )));
        }

        Ok(())
    }

    pub fn source_api_url(&self) -> &str {
        self.source.api_url.as_deref().unwrap_or_default()
    }

    pub fn target_api_url(&self) -> &str {
        self.target.api_url.as_deref().unwrap_or_default()
    }

    /// Source keys declared in configuration, if any.
    pub fn declared_source_keys(&self) -> Option<&KeyPairs> {
        self.source.keys.as_ref().filter(|keys| !keys.is_empty())
    }

    pub fn target_key_names(&self) -> Vec<&str> {
        self.target
            .keys
            .as_ref()
            .map(TargetKeys::names)
            .unwrap_or_default()
    }

    /// How source keys pair with target keys.
    ///
    /// The mode follows the number of target keys. With exactly one, every
    /// source key is checked against it and a non-empty `activation_key_map`
    /// only narrows which source keys migrate. With more than one, the map is
    /// required and is the whole mapping.
    pub fn declared_mapping(&self) -> Result<DeclaredMapping> {
        match self.target_key_names().as_slice() {
            [] => Err(MigrationError::config("keys not specified in target configuration")),
            [target] => Ok(DeclaredMapping::SingleTarget {
                target: target.to_string(),
                only: self.activation_key_map.0.clone(),
            }),
            _ if self.activation_key_map.is_empty() => Err(MigrationError::config(
                "multiple target keys specified but no activation_key_map supplied",
            )),
            _ => Ok(DeclaredMapping::ByName(self.activation_key_map.0.clone())),
        }
    }
}

fn check_api_url(url: Option<&str>, side: &str) -> Result<()> {
    match url {
        None => Err(MigrationError::config(format!(
            "api_url not specified in {} configuration",
            side
        ))),
        Some(url) if url.trim().is_empty() => Err(MigrationError::config(format!(
            "api_url is blank in {} configuration",
            side
        ))),
        Some(_) => Ok(()),
    }
}

fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}

fn is_file_name_safe(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\'])
}

fn duplicate_key(section: &str, name: &str) -> MigrationError {
    MigrationError::config(format!(
        "key name \"{}\" appears more than once in {}",
        name, section
    ))
}

/// Template written by `ca-migrate init`.
pub fn template_config_json() -> Result<String> {
    let config = Config {
        source: SourceConfig {
            api_url: Some("https://qualysapi.qualys.com".to_string()),
            keys: None,
        },
        target: TargetConfig {
            api_url: Some("https://qualysapi.qg2.apps.qualys.com".to_string()),
            keys: Some(TargetKeys::Ids(KeyPairs(vec![(
                "Target key title".to_string(),
                "00000000-0000-0000-0000-000000000000".to_string(),
            )]))),
        },
        activation_key_map: KeyPairs::default(),
    };
    serde_json::to_string_pretty(&config)
        .map_err(|err| MigrationError::config(format!("failed to generate template: {}", err)))
}

/// Read, parse and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|err| {
        MigrationError::config(format!(
            "could not read configuration file ({}): {}",
            path.display(),
            err
        ))
    })?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        MigrationError::config(format!(
            "failed to parse configuration file ({}): {}",
            path.display(),
            err
        ))
    })?;
    config.validate()?;
    Ok(config)
}
