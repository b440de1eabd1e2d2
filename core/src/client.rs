//! Client entry points.
//!
//! # Design
//! Both clients hold immutable [`ClientDefaults`] and a [`Transport`], and
//! can be shared freely between concurrent calls.
//!
//! - [`Client`] hands out a fluent [`RequestBuilder`] per call.
//! - [`RouteClient`] takes a path-pattern plus a [`RequestOptions`] bag,
//!   checks both against its [`RouteTable`], and sends in one step.
//!
//! Resolution order in `RouteClient`: defaults are overlaid by the call's
//! headers, query and cookies; then exactly one body option is picked, in
//! the order `json`, `form_data`, `buffer`, `stream`; then the merged cookies
//! become the `cookie` header.
//!
//! Header names differ between the two clients. `RouteClient` matches them
//! case-insensitively, so a per-call `accept` replaces a default `Accept`,
//! and the merged cookies replace any `cookie` header the caller set.
//! `RequestBuilder` keeps names exactly as written and appends its cookies
//! to a caller-set `cookie` header.

use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::builder::{Bodied, Bodiless, RequestBuilder};
use crate::config::ClientDefaults;
use crate::dispatch::{cancel_signal, dispatch, CancelSignal};
use crate::error::Error;
use crate::http::{Body, BodyStream, HttpMethod, HttpRequest};
use crate::params::Params;
use crate::query::{append_query, QueryValue};
use crate::response::{normalize_json, NormalizedResponse};
use crate::route::{BodyShape, PathPattern, PathVariables, Route, RouteTable};
use crate::transport::Transport;

/// Builder-form client: one method per HTTP verb, each returning a
/// [`RequestBuilder`] for `path`.
#[derive(Debug, Clone)]
pub struct Client<T> {
    defaults: ClientDefaults,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(defaults: ClientDefaults, transport: T) -> Self {
        Self {
            defaults,
            transport,
        }
    }

    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    pub fn delete(&self, path: &str) -> RequestBuilder<'_, T, Bodied> {
        RequestBuilder::new(&self.defaults, &self.transport, HttpMethod::Delete, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder<'_, T, Bodiless> {
        RequestBuilder::new(&self.defaults, &self.transport, HttpMethod::Get, path)
    }

    pub fn head(&self, path: &str) -> RequestBuilder<'_, T, Bodiless> {
        RequestBuilder::new(&self.defaults, &self.transport, HttpMethod::Head, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder<'_, T, Bodied> {
        RequestBuilder::new(&self.defaults, &self.transport, HttpMethod::Patch, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder<'_, T, Bodied> {
        RequestBuilder::new(&self.defaults, &self.transport, HttpMethod::Post, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder<'_, T, Bodied> {
        RequestBuilder::new(&self.defaults, &self.transport, HttpMethod::Put, path)
    }
}

/// Per-call options for [`RouteClient`].
///
/// Several body options may be set at once; only the first present in the
/// order `json`, `form_data`, `buffer`, `stream` is sent.
#[derive(Default)]
pub struct RequestOptions {
    headers: Params,
    query: Params,
    cookies: Params,
    variables: PathVariables,
    json: Option<Value>,
    form_data: Option<Params>,
    buffer: Option<Bytes>,
    stream: Option<BodyStream>,
    cancel: Option<CancelSignal>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.set(name, value.into().to_param_string());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.set(name, value);
        self
    }

    /// Value for the path variable `name` (with or without the `$`).
    pub fn variable(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn variables(mut self, variables: PathVariables) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Serialize `value` into the `json` option.
    pub fn json_from<V: Serialize>(self, value: &V) -> Result<Self, Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.json(value))
    }

    pub fn form_data(mut self, fields: Params) -> Self {
        self.form_data = Some(fields);
        self
    }

    pub fn buffer(mut self, bytes: impl Into<Bytes>) -> Self {
        self.buffer = Some(bytes.into());
        self
    }

    pub fn stream(mut self, stream: BodyStream) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Abandon the call when `signal` resolves before the response.
    pub fn cancel_on<F>(mut self, signal: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel = Some(cancel_signal(signal));
        self
    }

    /// The body to send, and its shape, by option precedence.
    fn take_body(&mut self) -> (Body, Option<BodyShape>) {
        if let Some(value) = self.json.take() {
            (Body::Text(value.to_string()), Some(BodyShape::Json))
        } else if let Some(fields) = self.form_data.take() {
            (Body::Form(fields), Some(BodyShape::Form))
        } else if let Some(bytes) = self.buffer.take() {
            (Body::Bytes(bytes), Some(BodyShape::Buffer))
        } else if let Some(stream) = self.stream.take() {
            (Body::Stream(stream), Some(BodyShape::Stream))
        } else {
            (Body::Empty, None)
        }
    }
}

/// Route-typed client: calls are checked against a [`RouteTable`] and their
/// path variables are validated before anything is sent.
///
/// Path variable values are percent-encoded into their segment. When the
/// call has cookies, they replace a `cookie` header given through
/// [`RequestOptions::header`].
#[derive(Debug, Clone)]
pub struct RouteClient<T> {
    defaults: ClientDefaults,
    routes: RouteTable,
    transport: T,
}

impl<T: Transport> RouteClient<T> {
    pub fn new(defaults: ClientDefaults, routes: RouteTable, transport: T) -> Self {
        Self {
            defaults,
            routes,
            transport,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn delete(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<Value, Value>, Error> {
        self.request(HttpMethod::Delete, path, options).await
    }

    pub async fn get(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<Value, Value>, Error> {
        self.request(HttpMethod::Get, path, options).await
    }

    pub async fn head(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<Value, Value>, Error> {
        self.request(HttpMethod::Head, path, options).await
    }

    pub async fn patch(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<Value, Value>, Error> {
        self.request(HttpMethod::Patch, path, options).await
    }

    pub async fn post(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<Value, Value>, Error> {
        self.request(HttpMethod::Post, path, options).await
    }

    pub async fn put(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<Value, Value>, Error> {
        self.request(HttpMethod::Put, path, options).await
    }

    /// Validate, send and decode one call, both branches as JSON.
    ///
    /// `Err` is only returned for calls rejected before sending; every
    /// outcome after that is inside the `NormalizedResponse`.
    pub async fn request<D, E>(
        &self,
        method: HttpMethod,
        path: &str,
        mut options: RequestOptions,
    ) -> Result<NormalizedResponse<D, E>, Error>
    where
        D: DeserializeOwned,
        E: DeserializeOwned,
    {
        let cancel = options.cancel.take();
        let request = self.prepare(method, path, options)?;
        let response = dispatch(&self.transport, request, cancel).await;
        Ok(normalize_json(response))
    }

    /// Send a statically described [`Route`]; its variables are merged over
    /// any already present in `options`.
    pub async fn call<R: Route>(
        &self,
        route: &R,
        options: RequestOptions,
    ) -> Result<NormalizedResponse<R::Data, R::Error>, Error> {
        let options = options.variables(route.variables());
        self.request(R::METHOD, R::PATH, options).await
    }

    /// Resolve a call into the request that would be sent.
    pub fn prepare(
        &self,
        method: HttpMethod,
        path: &str,
        mut options: RequestOptions,
    ) -> Result<HttpRequest, Error> {
        let adhoc;
        let (pattern, spec) = match self.routes.lookup(method, path) {
            Some(route) => (&route.pattern, Some(&route.spec)),
            None if self.routes.is_open() => {
                adhoc = PathPattern::parse(path);
                (&adhoc, None)
            }
            None => {
                return Err(Error::UndeclaredRoute {
                    method,
                    path: path.to_string(),
                })
            }
        };
        let rendered = pattern.render(&options.variables)?;

        let mut headers = self.defaults.default_headers().clone();
        headers.merge_ignore_case(&options.headers);
        let query = Params::merged(self.defaults.default_query(), &options.query);
        let cookies = Params::merged(self.defaults.default_cookies(), &options.cookies);

        let (body, shape) = options.take_body();
        if shape == Some(BodyShape::Json) {
            headers.set_ignore_case("content-type", "application/json");
        }
        if let Some(spec) = spec {
            spec.check(pattern, &headers, &query, &cookies, shape)?;
        }
        if let Some(serialized) = cookies.to_cookie_header() {
            headers.set_ignore_case("cookie", serialized);
        }

        let url = append_query(self.defaults.url_for(&rendered), &query);
        debug!(%method, pattern = %pattern, %url, "resolved route call");

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}
