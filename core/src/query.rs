//! Query parameter values and query-string encoding.
//!
//! Query values may be booleans, numbers, strings or lists of those. They are
//! flattened to a single string per key with a fixed rule: scalars use their
//! natural textual form and lists are joined with `,`.

use serde::{Deserialize, Serialize};

use crate::params::Params;

/// A single query parameter value before stringification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<QueryValue>),
}

impl QueryValue {
    pub fn to_param_string(&self) -> String {
        match self {
            QueryValue::Bool(b) => b.to_string(),
            QueryValue::Int(n) => n.to_string(),
            QueryValue::Float(n) => n.to_string(),
            QueryValue::String(s) => s.clone(),
            QueryValue::List(items) => items
                .iter()
                .map(QueryValue::to_param_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Percent-encode `params` as `key=value&key=value`, in insertion order.
pub fn encode_query(params: &Params) -> String {
    params.to_form_urlencoded()
}

/// Append an encoded query string to `url`, choosing `?` or `&` depending on
/// whether `url` already carries a query.
pub fn append_query(url: String, params: &Params) -> String {
    if params.is_empty() {
        return url;
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", encode_query(params))
}
