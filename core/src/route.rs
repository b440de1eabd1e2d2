//! Path-patterns, route declarations and the route table.
//!
//! # Design
//! A path-pattern such as `/users/$id/posts/$post` is tokenized once, when
//! the route is registered, into literal and variable segments. Every call
//! is then checked against that parsed form: each variable the pattern names
//! must be supplied, and nothing else may be. The check runs before a request
//! is built, so a malformed call never reaches the transport.
//!
//! [`Route`] is the statically typed layer on top: a type per endpoint fixes
//! the method, the pattern and the decoded payload types, and carries its
//! variables as fields.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::http::HttpMethod;
use crate::params::Params;

/// Marker that introduces a variable segment.
pub const VARIABLE_PREFIX: char = '$';

/// One `/`-delimited piece of a path-pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed path-pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Tokenize `pattern`. A segment is a variable when it starts with `$`
    /// followed by at least one character; a lone `$` is a literal.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(VARIABLE_PREFIX) {
                Some(name) if !name.is_empty() => Segment::Variable(name.to_string()),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variable names in order of appearance, without the `$` marker.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_variables(&self) -> bool {
        self.variables().next().is_some()
    }

    /// Substitute `vars` into the pattern.
    ///
    /// Fails with `MissingPathVariable` when a named variable is absent and
    /// with `UnexpectedPathVariable` when `vars` holds a name the pattern
    /// does not use.
    pub fn render(&self, vars: &PathVariables) -> Result<String, Error> {
        if let Some(name) = self.variables().find(|name| !vars.contains(name)) {
            return Err(Error::MissingPathVariable {
                pattern: self.raw.clone(),
                name: name.to_string(),
            });
        }
        if let Some((name, _)) = vars
            .iter()
            .find(|(name, _)| !self.variables().any(|declared| declared == *name))
        {
            return Err(Error::UnexpectedPathVariable {
                pattern: self.raw.clone(),
                name: name.to_string(),
            });
        }

        let rendered: Vec<Cow<'_, str>> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Cow::Borrowed(text.as_str()),
                // presence checked above
                Segment::Variable(name) => encode_segment(vars.get(name).unwrap_or_default()),
            })
            .collect();
        Ok(rendered.join("/"))
    }
}

/// Percent-encode a variable value so it stays inside one path segment.
/// Only ASCII alphanumerics and `*-._` pass through unescaped.
fn encode_segment(value: &str) -> Cow<'_, str> {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    if encoded == value {
        Cow::Borrowed(value)
    } else {
        // `+` only appears for a space; a literal plus is already `%2B`
        Cow::Owned(encoded.replace('+', "%20"))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Values for the variable segments of a path-pattern.
///
/// Names may be given with or without the leading `$`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariables {
    values: Params,
}

impl PathVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref();
        let name = name.strip_prefix(VARIABLE_PREFIX).unwrap_or(name);
        self.values.set(name, value);
    }

    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter()
    }

    /// Overlay `other`, its values winning on conflict.
    pub fn extend(&mut self, other: PathVariables) {
        self.values.merge(&other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for PathVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = PathVariables::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

/// The body encoding a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Json,
    Form,
    Buffer,
    Stream,
}

impl fmt::Display for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BodyShape::Json => "json",
            BodyShape::Form => "form",
            BodyShape::Buffer => "buffer",
            BodyShape::Stream => "stream",
        })
    }
}

/// Declared shape of one route. Every field is optional; an empty spec
/// accepts any headers, query, cookies and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSpec {
    pub body: Option<BodyShape>,
    pub headers: Vec<String>,
    pub query: Vec<String>,
    pub cookies: Vec<String>,
}

impl RouteSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, shape: BodyShape) -> Self {
        self.body = Some(shape);
        self
    }

    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(name.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>) -> Self {
        self.query.push(name.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>) -> Self {
        self.cookies.push(name.into());
        self
    }

    /// Check merged request parts against the declaration.
    pub(crate) fn check(
        &self,
        pattern: &PathPattern,
        headers: &Params,
        query: &Params,
        cookies: &Params,
        body: Option<BodyShape>,
    ) -> Result<(), Error> {
        let pattern = pattern.as_str();
        if let Some(name) = self.headers.iter().find(|n| headers.get_ignore_case(n).is_none()) {
            return Err(Error::MissingDeclaredHeader {
                pattern: pattern.to_string(),
                name: name.clone(),
            });
        }
        if let Some(name) = self.query.iter().find(|n| !query.contains_key(n)) {
            return Err(Error::MissingDeclaredQuery {
                pattern: pattern.to_string(),
                name: name.clone(),
            });
        }
        if let Some(name) = self.cookies.iter().find(|n| !cookies.contains_key(n)) {
            return Err(Error::MissingDeclaredCookie {
                pattern: pattern.to_string(),
                name: name.clone(),
            });
        }
        match self.body {
            Some(expected) if body != Some(expected) => Err(Error::BodyShapeMismatch {
                pattern: pattern.to_string(),
                expected,
                found: body,
            }),
            _ => Ok(()),
        }
    }
}

/// A registered route: its parsed pattern and declaration.
#[derive(Debug, Clone)]
pub struct ParsedRoute {
    pub pattern: PathPattern,
    pub spec: RouteSpec,
}

/// Static map of method → path-pattern → [`RouteSpec`].
///
/// An empty table is *open*: every method and path is callable and patterns
/// are parsed per call. Once any route is declared the table is *closed* and
/// only declared method/pattern pairs are accepted.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<HttpMethod, HashMap<String, ParsedRoute>>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// A table that accepts every call.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn lookup(&self, method: HttpMethod, pattern: &str) -> Option<&ParsedRoute> {
        self.routes.get(&method)?.get(pattern)
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.is_open()
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: HashMap<HttpMethod, HashMap<String, ParsedRoute>>,
}

impl RouteTableBuilder {
    /// Register `pattern` under `method`; a repeated registration replaces
    /// the earlier one.
    pub fn route(mut self, method: HttpMethod, pattern: &str, spec: RouteSpec) -> Self {
        let parsed = ParsedRoute {
            pattern: PathPattern::parse(pattern),
            spec,
        };
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern.to_string(), parsed);
        self
    }

    pub fn delete(self, pattern: &str, spec: RouteSpec) -> Self {
        self.route(HttpMethod::Delete, pattern, spec)
    }

    pub fn get(self, pattern: &str, spec: RouteSpec) -> Self {
        self.route(HttpMethod::Get, pattern, spec)
    }

    pub fn head(self, pattern: &str, spec: RouteSpec) -> Self {
        self.route(HttpMethod::Head, pattern, spec)
    }

    pub fn patch(self, pattern: &str, spec: RouteSpec) -> Self {
        self.route(HttpMethod::Patch, pattern, spec)
    }

    pub fn post(self, pattern: &str, spec: RouteSpec) -> Self {
        self.route(HttpMethod::Post, pattern, spec)
    }

    pub fn put(self, pattern: &str, spec: RouteSpec) -> Self {
        self.route(HttpMethod::Put, pattern, spec)
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}

/// A statically described endpoint.
///
/// Implementors are usually small structs whose fields are the path
/// variables:
///
/// ```
/// use getter_core::{HttpMethod, PathVariables, Route};
///
/// struct GetUser {
///     id: u64,
/// }
///
/// impl Route for GetUser {
///     const METHOD: HttpMethod = HttpMethod::Get;
///     const PATH: &'static str = "/users/$id";
///     type Data = serde_json::Value;
///     type Error = serde_json::Value;
///
///     fn variables(&self) -> PathVariables {
///         PathVariables::new().with("id", self.id.to_string())
///     }
/// }
/// ```
pub trait Route {
    const METHOD: HttpMethod;
    const PATH: &'static str;

    /// Payload decoded from a 2xx response.
    type Data: DeserializeOwned;
    /// Payload decoded from a non-2xx response.
    type Error: DeserializeOwned;

    fn variables(&self) -> PathVariables {
        PathVariables::new()
    }
}
