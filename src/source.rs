//! Row acquisition: in-memory rows, local JSON files, and remote HTTP/HTTPS
//! endpoints. Every failure degrades to an empty row set with a user-facing
//! message; acquisition never returns an error to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::error_display::{user_message_from_io, user_message_from_json, user_message_from_ureq};
use crate::rows::{value_str, Row};

/// Where rows come from.
#[derive(Clone, Debug)]
pub enum RowSource {
    /// Locally supplied rows, used directly.
    Rows(Vec<Row>),
    /// Local JSON file holding the row list (or a document to unwrap).
    File(PathBuf),
    /// Remote HTTP/HTTPS endpoint returning a JSON body.
    Remote {
        url: String,
        headers: Vec<(String, String)>,
    },
}

/// Classifies a CLI source string as a URL or a local path using string
/// parsing only (no filesystem calls).
pub(crate) fn classify_source(s: &str) -> RowSource {
    if let Some(i) = s.find("://") {
        let prefix = s[..i].to_lowercase();
        if prefix == "http" || prefix == "https" {
            return RowSource::Remote {
                url: s.to_string(),
                headers: Vec::new(),
            };
        }
    }
    RowSource::File(Path::new(s).to_path_buf())
}

/// Result of an acquisition attempt. `error` is set when the rows degraded to
/// empty because of a failure.
#[derive(Debug, Default)]
pub struct Acquired {
    pub rows: Vec<Row>,
    pub error: Option<String>,
}

impl Acquired {
    fn failed(message: String) -> Self {
        Self {
            rows: Vec::new(),
            error: Some(message),
        }
    }
}

/// Acquire rows from `source`, unwrapping the JSON document by `data_path`
/// when one is configured. Failures yield an empty set with the message set.
pub fn acquire(source: &RowSource, data_path: Option<&str>, timeout: Duration) -> Acquired {
    let document = match source {
        RowSource::Rows(rows) => {
            return Acquired {
                rows: rows.clone(),
                error: None,
            }
        }
        RowSource::File(path) => match read_file_json(path) {
            Ok(v) => v,
            Err(msg) => return Acquired::failed(msg),
        },
        RowSource::Remote { url, headers } => match fetch_remote(url, headers, timeout) {
            Ok(v) => v,
            Err(msg) => return Acquired::failed(msg),
        },
    };

    let list = match data_path {
        Some(path) if !path.is_empty() => match unwrap_data_path(document, path) {
            Ok(v) => v,
            Err(msg) => return Acquired::failed(msg),
        },
        _ => document,
    };

    match decode_rows(list) {
        Ok(rows) => Acquired { rows, error: None },
        Err(msg) => Acquired::failed(msg),
    }
}

fn read_file_json(path: &Path) -> Result<Value, String> {
    let bytes = std::fs::read(path).map_err(|e| user_message_from_io(&e))?;
    serde_json::from_slice(&bytes).map_err(|e| user_message_from_json(&e))
}

fn fetch_remote(url: &str, headers: &[(String, String)], timeout: Duration) -> Result<Value, String> {
    let mut request = ureq::get(url).timeout(timeout);
    for (name, value) in headers {
        request = request.set(name, value);
    }
    let response = request.call().map_err(|e| user_message_from_ureq(&e))?;
    serde_json::from_reader(response.into_reader()).map_err(|e| user_message_from_json(&e))
}

/// Walk a dotted path of property names (e.g. `result.items`) down the
/// document. Each segment must exist as an object property on the previous
/// level; a missing segment is a non-fatal error.
pub(crate) fn unwrap_data_path(document: Value, path: &str) -> Result<Value, String> {
    let mut current = document;
    for name in path.split('.') {
        current = match current {
            Value::Object(mut map) => match map.remove(name) {
                Some(v) => v,
                None => {
                    return Err(format!(
                        "Data property '{}' not found in the response.",
                        name
                    ))
                }
            },
            _ => {
                return Err(format!(
                    "Data property '{}' not found in the response.",
                    name
                ))
            }
        };
    }
    Ok(current)
}

/// Decode the unwrapped value into rows. The value must be a JSON array; the
/// first element fixes the shape (array-of-values or object) and every other
/// element must match it.
pub(crate) fn decode_rows(list: Value) -> Result<Vec<Row>, String> {
    let Value::Array(items) = list else {
        return Err("The response data is not a list of rows.".to_string());
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row = match item {
            Value::Array(cells) => {
                Row::Cells(cells.iter().map(|v| value_str(v).into_owned()).collect())
            }
            Value::Object(fields) => Row::Fields(fields),
            _ => return Err("Unsupported row shape in the response data.".to_string()),
        };
        if let Some(first) = rows.first() {
            let homogeneous = matches!(
                (first, &row),
                (Row::Cells(_), Row::Cells(_)) | (Row::Fields(_), Row::Fields(_))
            );
            if !homogeneous {
                return Err("Rows in the response data have mixed shapes.".to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}
