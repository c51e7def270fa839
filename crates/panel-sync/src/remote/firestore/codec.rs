//! Firestore typed-value codec
//!
//! Firestore's REST surface wraps every value in a typed envelope
//! (`{"stringValue": "..."}`). Panels work with plain JSON payloads, so
//! values are wrapped on the way out and unwrapped on the way in.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

use crate::domain::Payload;
use crate::error::RemoteError;
use crate::remote::RemoteDocument;

/// Document as returned by the documents endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// Wrap a plain JSON value. Strings always stay strings.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields, &[]) } }),
    }
}

/// Wrap every field. Top-level `timestamp_fields` holding an RFC 3339 string
/// are sent as `timestampValue`; any other string is sent as written.
pub fn encode_fields(payload: &Payload, timestamp_fields: &[&str]) -> Map<String, Value> {
    payload
        .iter()
        .map(|(key, value)| {
            let encoded = match value {
                Value::String(s)
                    if timestamp_fields.contains(&key.as_str())
                        && DateTime::parse_from_rfc3339(s).is_ok() =>
                {
                    json!({ "timestampValue": s })
                }
                _ => encode_value(value),
            };
            (key.clone(), encoded)
        })
        .collect()
}

/// Unwrap a typed Firestore value into plain JSON
pub fn decode_value(value: &Value) -> Result<Value, RemoteError> {
    let envelope = value
        .as_object()
        .ok_or_else(|| RemoteError::Decode(format!("not a typed value: {}", value)))?;
    let (tag, inner) = envelope
        .iter()
        .next()
        .ok_or_else(|| RemoteError::Decode("empty typed value".to_string()))?;

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or_default())),
        "stringValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| RemoteError::Decode(format!("bad integerValue: {}", inner)))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<f64>().ok(),
                other => other.as_f64(),
            };
            Ok(parsed
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        "timestampValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| RemoteError::Decode(format!("bad timestampValue: {}", inner)))?;
            let parsed = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| RemoteError::Decode(format!("bad timestampValue {}: {}", raw, e)))?;
            Ok(Value::String(
                parsed.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ))
        }
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields").and_then(Value::as_object) {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(RemoteError::Decode(format!("unsupported value type {}", other))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Payload, RemoteError> {
    fields
        .iter()
        .map(|(key, value)| decode_value(value).map(|v| (key.clone(), v)))
        .collect()
}

pub(super) fn decode_document(doc: &FirestoreDocument) -> Result<RemoteDocument, RemoteError> {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RemoteError::Decode(format!("bad document name: {}", doc.name)))?;
    Ok(RemoteDocument::new(id, decode_fields(&doc.fields)?))
}

/// Field path for `updateMask`; non-identifier names are backtick quoted
pub fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}
