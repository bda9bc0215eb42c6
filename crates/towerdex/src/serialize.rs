//! JSON, YAML and CSV renderings of command output.

use serde::Serialize;
use thiserror::Error;

use crate::output::OutputMode;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("cannot encode as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot encode as CSV: {0}")]
    Csv(String),

    #[error("text output is rendered as a table, not serialized")]
    NotStructured,
}

/// Encodes `data` in `mode`, which must be one of the structured modes.
pub fn serialize_structured<T: Serialize + ?Sized>(
    data: &T,
    mode: OutputMode,
) -> Result<String, SerializeError> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputMode::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputMode::Csv => serialize_csv(data),
        OutputMode::Text => Err(SerializeError::NotStructured),
    }
}

/// Encodes `data` as CSV through its JSON form. Nested objects become
/// dotted columns (`stats.power`) and arrays are joined with `; `.
pub fn serialize_csv<T: Serialize + ?Sized>(data: &T) -> Result<String, SerializeError> {
    to_csv(&serde_json::to_value(data)?)
}

fn csv_error(e: impl std::fmt::Display) -> SerializeError {
    SerializeError::Csv(e.to_string())
}

fn to_csv(value: &serde_json::Value) -> Result<String, SerializeError> {
    use serde_json::{Map, Value};

    let mut writer = csv::Writer::from_writer(vec![]);

    match value {
        Value::Array(arr) if arr.iter().all(Value::is_object) && !arr.is_empty() => {
            let rows: Vec<Map<String, Value>> = arr
                .iter()
                .map(|item| {
                    let mut flat = Map::new();
                    flatten_into("", item, &mut flat);
                    flat
                })
                .collect();

            // Columns in first-seen order across every row, since optional
            // fields are skipped when empty.
            let mut headers: Vec<&str> = Vec::new();
            for row in &rows {
                for key in row.keys() {
                    if !headers.contains(&key.as_str()) {
                        headers.push(key);
                    }
                }
            }
            writer.write_record(&headers).map_err(csv_error)?;
            for row in &rows {
                let record: Vec<String> = headers
                    .iter()
                    .map(|h| row.get(*h).map(cell).unwrap_or_default())
                    .collect();
                writer.write_record(&record).map_err(csv_error)?;
            }
        }
        Value::Array(arr) => {
            writer.write_record(["value"]).map_err(csv_error)?;
            for item in arr {
                writer.write_record(&[cell(item)]).map_err(csv_error)?;
            }
        }
        Value::Object(obj) => {
            // one record: a key,value row per field
            let mut flat = Map::new();
            for (k, v) in obj {
                flatten_into(k, v, &mut flat);
            }
            writer.write_record(["key", "value"]).map_err(csv_error)?;
            for (k, v) in &flat {
                writer.write_record([k.as_str(), &cell(v)])
                    .map_err(csv_error)?;
            }
        }
        _ => {
            writer.write_record(["value"]).map_err(csv_error)?;
            writer.write_record(&[cell(value)]).map_err(csv_error)?;
        }
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

fn flatten_into(prefix: &str, value: &serde_json::Value, out: &mut serde_json::Map<String, serde_json::Value>) {
    match value {
        serde_json::Value::Object(obj) => {
            for (k, v) in obj {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten_into(&key, v, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

fn cell(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(cell)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
