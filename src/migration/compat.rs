//! Activation key compatibility check.
//!
//! An agent moved to a target key must keep the same enforced behaviour, so
//! the settings that drive agent behaviour have to agree on both keys.

use std::collections::BTreeSet;

use serde_json::Value;

use super::keys::KeyRecord;

/// Fields compared between a source and a target key.
pub const COMPARED_FIELDS: &[&str] = &["modules", "isDisabled"];

/// True iff every field in [`COMPARED_FIELDS`] agrees on both keys.
pub fn compare_keys(source: &KeyRecord, target: &KeyRecord) -> bool {
    first_mismatch(source, target).is_none()
}

/// Name of the first compared field that differs, in [`COMPARED_FIELDS`] order.
pub fn first_mismatch(source: &KeyRecord, target: &KeyRecord) -> Option<&'static str> {
    COMPARED_FIELDS
        .iter()
        .copied()
        .find(|field| !field_matches(field, source.attribute(field), target.attribute(field)))
}

fn field_matches(field: &str, source: Option<&Value>, target: Option<&Value>) -> bool {
    match field {
        // Module lists come back in arbitrary order.
        "modules" => module_set(source) == module_set(target),
        _ => source == target,
    }
}

/// Every string leaf below a `modules` value, as a set.
///
/// Covers both a plain list of licence names and the nested
/// `{"list": [{"ActivationKeyModule": {"license": ...}}]}` listing shape.
fn module_set(value: Option<&Value>) -> BTreeSet<&str> {
    let mut modules = BTreeSet::new();
    if let Some(value) = value {
        collect_strings(value, &mut modules);
    }
    modules
}

fn collect_strings<'a>(value: &'a Value, out: &mut BTreeSet<&'a str>) {
    match value {
        Value::String(s) => {
            out.insert(s.as_str());
        }
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}
