//! Activation key records and per-account key directories.

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::api::{PlatformApi, TransportError};

/// Wire name of the key token agents are installed with.
const ACTIVATION_KEY_FIELD: &str = "activationKey";
const TITLE_FIELD: &str = "title";

/// One activation key as listed by the platform.
///
/// `attributes` holds every other field of the listing (modules, flags, ...)
/// and is only read by the compatibility check.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRecord {
    pub id: String,
    pub title: Option<String>,
    pub attributes: Map<String, Value>,
}

impl KeyRecord {
    pub fn new(id: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            id: id.into(),
            title: title.map(str::to_string),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Build a record from the fields of one listed key.
    ///
    /// Returns `None` when the listing carries no activation key token.
    pub fn from_fields(mut fields: Map<String, Value>) -> Option<Self> {
        let id = match fields.remove(ACTIVATION_KEY_FIELD)? {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        let title = match fields.remove(TITLE_FIELD) {
            Some(Value::String(title)) => Some(title),
            _ => None,
        };
        Some(Self {
            id,
            title,
            attributes: fields,
        })
    }
}

/// Retrieve every activation key of an account.
pub fn fetch_all_keys(api: &dyn PlatformApi) -> Result<Vec<KeyRecord>, TransportError> {
    let records = api.fetch_all_activation_keys()?;
    debug!("Fetched {} activation key(s)", records.len());
    Ok(records)
}

/// First record whose title equals `title` exactly, in listing order.
///
/// Records without a title never match. When titles repeat, the record listed
/// first wins; the platform does not promise a stable listing order.
pub fn find_by_title<'a>(records: &'a [KeyRecord], title: &str) -> Option<&'a KeyRecord> {
    records
        .iter()
        .find(|record| record.title.as_deref() == Some(title))
}

/// One account's activation keys: title → id in declaration order, plus the
/// raw records when they were fetched.
#[derive(Debug, Clone, Default)]
pub struct KeyDirectory {
    entries: Vec<(String, String)>,
    records: Vec<KeyRecord>,
}

impl KeyDirectory {
    /// Directory declared in configuration, without raw records.
    pub fn from_declared(entries: Vec<(String, String)>) -> Self {
        Self {
            entries,
            records: Vec::new(),
        }
    }

    /// Synthesize title → id from a live listing.
    ///
    /// Untitled records are left out of the title index; a repeated title keeps
    /// the record listed first, matching [`find_by_title`].
    pub fn from_records(records: Vec<KeyRecord>) -> Self {
        let mut entries: Vec<(String, String)> = Vec::with_capacity(records.len());
        for record in &records {
            let Some(title) = record.title.as_deref() else {
                debug!("Skipping activation key {} without a title", record.id);
                continue;
            };
            if entries.iter().any(|(existing, _)| existing == title) {
                warn!(
                    "Activation key title \"{}\" is not unique, keeping the first listed key",
                    title
                );
                continue;
            }
            entries.push((title.to_string(), record.id.clone()));
        }
        Self { entries, records }
    }

    /// Fetch an account's keys and build its directory.
    pub fn fetch(api: &dyn PlatformApi) -> Result<Self, TransportError> {
        fetch_all_keys(api).map(Self::from_records)
    }

    /// Attach raw records fetched separately from the declared entries.
    pub fn with_records(mut self, records: Vec<KeyRecord>) -> Self {
        self.records = records;
        self
    }

    /// Keep only the entries whose title is in `titles`.
    pub fn retain_titles(&mut self, titles: &[&str]) {
        self.entries
            .retain(|(title, _)| titles.contains(&title.as_str()));
    }

    pub fn id_of(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == title)
            .map(|(_, id)| id.as_str())
    }

    pub fn contains(&self, title: &str) -> bool {
        self.id_of(title).is_some()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(title, _)| title.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn records(&self) -> &[KeyRecord] {
        &self.records
    }

    /// Raw record for `title`, if the records were fetched.
    pub fn find_record(&self, title: &str) -> Option<&KeyRecord> {
        find_by_title(&self.records, title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
