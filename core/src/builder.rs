//! Fluent per-request builder.
//!
//! # Design
//! A `RequestBuilder` owns the state of one pending request and is moved
//! through every chained call, then consumed by `submit`. Because submission
//! takes the builder by value, a request cannot be sent twice and a builder
//! cannot be shared between two callers.
//!
//! The `S` parameter records whether the method may carry a body: builders
//! for `GET` and `HEAD` are [`Bodiless`] and have no `data` method.

use std::future::Future;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientDefaults;
use crate::dispatch::{self, cancel_signal, CancelSignal};
use crate::error::Error;
use crate::http::{Blob, Body, BodyStream, HttpMethod, HttpRequest};
use crate::params::Params;
use crate::query::{append_query, QueryValue};
use crate::response::{normalize, normalize_json, DecodeAs, NormalizedResponse, ResponseData};
use crate::transport::Transport;

/// State marker: the method accepts a request body.
#[derive(Debug, Clone, Copy)]
pub struct Bodied;

/// State marker: the method never sends a body.
#[derive(Debug, Clone, Copy)]
pub struct Bodiless;

/// What a caller can hand to [`RequestBuilder::data`].
///
/// Text, bytes, form fields and blobs go out unchanged. A JSON value is
/// serialized to text, and no `content-type` header is added for it.
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
    Form(Params),
    Blob(Blob),
    Stream(BodyStream),
}

impl Payload {
    fn into_body(self) -> Body {
        match self {
            Payload::Json(value) => Body::Text(value.to_string()),
            Payload::Text(text) => Body::Text(text),
            Payload::Bytes(bytes) => Body::Bytes(bytes),
            Payload::Form(fields) => Body::Form(fields),
            Payload::Blob(blob) => Body::Blob(blob),
            Payload::Stream(stream) => Body::Stream(stream),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes.into())
    }
}

impl From<Params> for Payload {
    fn from(fields: Params) -> Self {
        Payload::Form(fields)
    }
}

impl From<Blob> for Payload {
    fn from(blob: Blob) -> Self {
        Payload::Blob(blob)
    }
}

impl From<BodyStream> for Payload {
    fn from(stream: BodyStream) -> Self {
        Payload::Stream(stream)
    }
}

/// Accumulates one request, then sends it with [`submit`](Self::submit).
#[must_use = "a request builder does nothing until submitted"]
pub struct RequestBuilder<'a, T, S = Bodied> {
    defaults: &'a ClientDefaults,
    transport: &'a T,
    method: HttpMethod,
    path: String,
    headers: Params,
    query: Params,
    cookies: Params,
    payload: Option<Payload>,
    _state: PhantomData<S>,
}

impl<'a, T: Transport, S> RequestBuilder<'a, T, S> {
    pub(crate) fn new(
        defaults: &'a ClientDefaults,
        transport: &'a T,
        method: HttpMethod,
        path: &str,
    ) -> Self {
        Self {
            defaults,
            transport,
            method,
            path: path.to_string(),
            headers: Params::new(),
            query: Params::new(),
            cookies: Params::new(),
            payload: None,
            _state: PhantomData,
        }
    }

    /// Set a header; the last value per name wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Shallow-merge `params` into the accumulated query.
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        for (name, value) in params {
            self.query.set(name, value.into().to_param_string());
        }
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.set(name, value);
        self
    }

    /// Build the outgoing request without sending it.
    ///
    /// Defaults are overlaid by the builder's own headers, query and cookies.
    /// Cookies are appended to a `cookie` header set through
    /// [`header`](Self::header), or become that header when there is none.
    pub fn into_request(self) -> HttpRequest {
        let mut headers = Params::merged(self.defaults.default_headers(), &self.headers);
        let query = Params::merged(self.defaults.default_query(), &self.query);
        let cookies = Params::merged(self.defaults.default_cookies(), &self.cookies);

        if let Some(serialized) = cookies.to_cookie_header() {
            match headers.get_ignore_case_mut("cookie") {
                Some(existing) if !existing.is_empty() => {
                    existing.push_str("; ");
                    existing.push_str(&serialized);
                }
                Some(existing) => *existing = serialized,
                None => headers.set("cookie", serialized),
            }
        }

        HttpRequest {
            method: self.method,
            url: append_query(self.defaults.url_for(&self.path), &query),
            headers,
            body: self.payload.map_or(Body::Empty, Payload::into_body),
        }
    }

    /// Send the request and decode the body with `decode_as`.
    pub async fn submit(self, decode_as: DecodeAs) -> NormalizedResponse<ResponseData, ResponseData> {
        let transport = self.transport;
        let response = dispatch::dispatch(transport, self.into_request(), None).await;
        normalize(response, decode_as)
    }

    /// Like [`submit`](Self::submit), but gives up when `cancel` resolves
    /// first. A cancelled call normalizes like a transport failure.
    pub async fn submit_with_cancel<F>(
        self,
        decode_as: DecodeAs,
        cancel: F,
    ) -> NormalizedResponse<ResponseData, ResponseData>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let transport = self.transport;
        let signal: CancelSignal = cancel_signal(cancel);
        let response = dispatch::dispatch(transport, self.into_request(), Some(signal)).await;
        normalize(response, decode_as)
    }

    /// Send the request and decode either branch as JSON.
    pub async fn submit_json<D, E>(self) -> NormalizedResponse<D, E>
    where
        D: DeserializeOwned,
        E: DeserializeOwned,
    {
        let transport = self.transport;
        let response = dispatch::dispatch(transport, self.into_request(), None).await;
        normalize_json(response)
    }
}

impl<'a, T: Transport> RequestBuilder<'a, T, Bodied> {
    /// Set the request body, replacing any earlier one.
    pub fn data(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Serialize `value` as the JSON body. Like [`data`](Self::data) with a
    /// JSON value, this does not set `content-type`.
    pub fn json<V: Serialize>(self, value: &V) -> Result<Self, Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.data(value))
    }
}
