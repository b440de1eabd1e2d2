//! Ordered name/value maps for headers, query parameters and cookies.
//!
//! # Design
//! Headers, query parameters and cookies all follow the same rules: insertion
//! order is kept (cookie and query strings are serialized in that order) and
//! a later write to an existing name overwrites the value in place. A plain
//! `Vec<(String, String)>` keeps the wire order visible in tests and stays
//! cheap for the handful of entries a request carries.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::query::QueryValue;

/// Insertion-ordered string map with last-write-wins semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, overwriting an existing entry with the exact
    /// same name without changing its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Chaining form of [`Params::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header-style lookup: names compare ASCII case-insensitively.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Header-style write: replaces the value of an entry whose name matches
    /// ASCII case-insensitively, keeping the original spelling of the name.
    pub fn set_ignore_case(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.get_ignore_case_mut(&name) {
            Some(slot) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub(crate) fn get_ignore_case_mut(&mut self, name: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overlay `other` onto `self`: matching names take `other`'s value,
    /// names only present on either side are kept.
    pub fn merge(&mut self, other: &Params) {
        for (name, value) in &other.entries {
            self.set(name.clone(), value.clone());
        }
    }

    /// Header-style [`merge`](Self::merge): names match ASCII
    /// case-insensitively and the first spelling seen is kept.
    pub fn merge_ignore_case(&mut self, other: &Params) {
        for (name, value) in &other.entries {
            self.set_ignore_case(name.clone(), value.clone());
        }
    }

    /// `base` overlaid with `overrides`, leaving both inputs untouched.
    pub fn merged(base: &Params, overrides: &Params) -> Params {
        let mut out = base.clone();
        out.merge(overrides);
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a `cookie` header value (`a=1; b=2`), or `None` when
    /// there is nothing to send.
    pub fn to_cookie_header(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn to_form_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

/// Deserializes from a map, keeping document order. Values may be any
/// [`QueryValue`] and are stored in their stringified form, so the same
/// representation serves headers, cookies and query defaults.
impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = Params;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of names to scalar or list values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Params, A::Error> {
                let mut params = Params::new();
                while let Some((name, value)) = map.next_entry::<String, QueryValue>()? {
                    params.set(name, value.to_param_string());
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut params = Params::new().with("a", "1").with("b", "2");
        params.set("a", "3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn merge_is_union_with_override() {
        let defaults = Params::new().with("keep", "d").with("shared", "d");
        let call = Params::new().with("shared", "c").with("extra", "c");
        let merged = Params::merged(&defaults, &call);
        assert_eq!(merged.get("keep"), Some("d"));
        assert_eq!(merged.get("shared"), Some("c"));
        assert_eq!(merged.get("extra"), Some("c"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn cookie_header_joins_in_insertion_order() {
        let cookies = Params::new().with("b", "2").with("a", "1");
        assert_eq!(cookies.to_cookie_header().as_deref(), Some("b=2; a=1"));
        assert_eq!(Params::new().to_cookie_header(), None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let headers = Params::new().with("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), None);
        assert_eq!(headers.get_ignore_case("content-type"), Some("text/plain"));
    }

    #[test]
    fn set_ignore_case_replaces_any_spelling() {
        let mut headers = Params::new().with("Content-Type", "text/plain");
        headers.set_ignore_case("content-type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn merge_ignore_case_overrides_differently_spelled_names() {
        let mut headers = Params::new().with("Accept", "application/json");
        headers.merge_ignore_case(&Params::new().with("accept", "text/plain").with("x-a", "1"));
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("Accept", "text/plain"), ("x-a", "1")]);
    }

    #[test]
    fn deserialize_keeps_document_order_and_stringifies() {
        let params: Params =
            serde_json::from_str(r#"{"z":"last","page":2,"tags":["x","y"],"on":true}"#).unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![("z", "last"), ("page", "2"), ("tags", "x,y"), ("on", "true")]
        );
    }

    #[test]
    fn form_encoding_escapes_reserved_characters() {
        let form = Params::new().with("q", "a b&c").with("n", "1");
        assert_eq!(form.to_form_urlencoded(), "q=a+b%26c&n=1");
    }
}
