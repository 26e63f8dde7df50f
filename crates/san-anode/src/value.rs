//! Compile-time constant values, such as static initial data.

use indexmap::IndexMap;
use serde::Deserialize;

/// A constant known at compile time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum ConstValue {
    /// An absent value. Skipped inside objects.
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// A date, as milliseconds since the Unix epoch.
    Date(i64),
    Array(Vec<ConstValue>),
    Object(IndexMap<String, ConstValue>),
}

/// Key marking a date in the JSON form, `{"$date": 1546300800000}`.
pub const DATE_KEY: &str = "$date";

impl From<serde_json::Value> for ConstValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(ms) = map.get(DATE_KEY).and_then(Value::as_i64) {
                        return Self::Date(ms);
                    }
                }
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ConstValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for ConstValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ConstValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
