//! Opaque describe responses.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// Keys with this suffix carry epoch-second timestamps in QuickSight responses.
const TIMESTAMP_KEY_SUFFIX: &str = "Time";

/// A describe response, kept verbatim.
///
/// Apart from [Document::Timestamp] this mirrors [serde_json::Value].
/// Object members keep the order of the response. Timestamps have no native
/// JSON representation and are written as RFC 3339 strings when the document
/// is serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Document>),
    Object(IndexMap<String, Document>),
}

impl Document {
    /// Converts a raw QuickSight response.
    ///
    /// Numbers stored under keys ending in `Time` (`CreatedTime`,
    /// `LastUpdatedTime`, ...) are epoch seconds and become [Document::Timestamp].
    pub fn from_response(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| {
                        let value = match value.as_f64() {
                            Some(secs) if key.ends_with(TIMESTAMP_KEY_SUFFIX) => {
                                epoch_to_timestamp(secs)
                                    .map(Self::Timestamp)
                                    .unwrap_or_else(|| Self::from(value))
                            }
                            _ => Self::from_response(value),
                        };
                        (key, value)
                    })
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from_response).collect()),
            other => Self::from(other),
        }
    }

    /// Looks up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Pretty printed JSON with two space indentation.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => {
                serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::Array(items) => serializer.collect_seq(items),
            Self::Object(map) => serializer.collect_map(map),
        }
    }
}

fn epoch_to_timestamp(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }

    // microsecond precision, finer digits are float noise
    let mut whole = secs.floor() as i64;
    let mut micros = ((secs - secs.floor()) * 1e6).round() as u32;
    if micros >= 1_000_000 {
        whole += 1;
        micros -= 1_000_000;
    }
    DateTime::from_timestamp(whole, micros * 1_000)
}
