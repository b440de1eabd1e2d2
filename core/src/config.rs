//! Client-wide defaults.
//!
//! `ClientDefaults` is assembled once, either with the chained setters or
//! from a JSON document, and is only read afterwards. Every request starts
//! from these values and layers its own headers, query and cookies on top.
//!
//! ```
//! use getter_core::ClientDefaults;
//!
//! let defaults = ClientDefaults::from_json(
//!     r#"{
//!         "url_prefix": "https://api.example.com",
//!         "headers": {"accept": "application/json"},
//!         "query": {"v": 2}
//!     }"#,
//! )?;
//! assert_eq!(defaults.prefix(), "https://api.example.com");
//! assert_eq!(defaults.default_query().get("v"), Some("2"));
//! # Ok::<(), getter_core::Error>(())
//! ```

use serde::Deserialize;

use crate::error::Error;
use crate::params::Params;
use crate::query::QueryValue;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientDefaults {
    url_prefix: String,
    url_suffix: String,
    query: Params,
    headers: Params,
    cookies: Params,
}

impl ClientDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(document: &str) -> Result<Self, Error> {
        serde_json::from_str(document).map_err(Error::Config)
    }

    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn url_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.url_suffix = suffix.into();
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.set(name, value.into().to_param_string());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.set(name, value);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn suffix(&self) -> &str {
        &self.url_suffix
    }

    pub fn default_query(&self) -> &Params {
        &self.query
    }

    pub fn default_headers(&self) -> &Params {
        &self.headers
    }

    pub fn default_cookies(&self) -> &Params {
        &self.cookies
    }

    /// `prefix + path + suffix`.
    pub(crate) fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.url_prefix, path, self.url_suffix)
    }
}
