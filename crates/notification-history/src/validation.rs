//! Structural validation of history entries.
//!
//! Entries are checked field by field on the raw JSON value so that every
//! rejection names the offending index and property.

use serde_json::{Map, Value};

use crate::{HistoryError, HistoryIcon, HistoryItem, Level};

/// Validate a raw JSON array of history entries.
pub fn validate_items(value: Value) -> Result<Vec<HistoryItem>, HistoryError> {
    let Value::Array(entries) = value else {
        return Err(HistoryError::NotAnArray);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            validate_item(&entry).map_err(|reason| HistoryError::Validation {
                index,
                reason: reason.to_string(),
            })
        })
        .collect()
}

fn validate_item(entry: &Value) -> Result<HistoryItem, &'static str> {
    let Value::Object(fields) = entry else {
        return Err("is not an object.");
    };

    let level = match fields.get("level") {
        None => return Err("does not have the property 'level'."),
        Some(value) => value
            .as_str()
            .and_then(Level::from_name)
            .ok_or("has an unrecognised level.")?,
    };

    let text = fields
        .get("text")
        .and_then(Value::as_str)
        .ok_or("text property does not exist or it's not a string.")?
        .to_string();

    let title = match fields.get("title") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(title)) => title.clone(),
        Some(_) => return Err("title property is not a string."),
    };

    let snapshot = fields
        .get("snapshot")
        .and_then(snapshot_millis)
        .ok_or("snapshot property does not exist or it's not an integer.")?;

    let icon = match fields.get("icon") {
        None | Some(Value::Null) => None,
        Some(Value::Object(icon)) => Some(validate_icon(icon)?),
        Some(_) => return Err("icon property is not an object."),
    };

    Ok(HistoryItem {
        level,
        text,
        title,
        snapshot,
        icon,
    })
}

fn validate_icon(icon: &Map<String, Value>) -> Result<HistoryIcon, &'static str> {
    let name = icon
        .get("name")
        .and_then(Value::as_str)
        .ok_or("the name property of icon is not a string!")?;
    let element = icon
        .get("element")
        .and_then(Value::as_str)
        .ok_or("the element property of icon is not a string!")?;

    Ok(HistoryIcon {
        name: name.to_string(),
        element: element.to_string(),
    })
}

/// Accept integral floats too; some writers emit `1.7e12`.
fn snapshot_millis(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
            .map(|f| f as i64)
    })
}
