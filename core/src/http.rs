//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and normalizes `HttpResponse` values; the
//! actual I/O is delegated to a [`Transport`](crate::transport::Transport)
//! supplied by the caller.
//!
//! A response body is held as a single `Bytes` buffer and is decoded by
//! moving the response into the normalizer, so it can only be read once.

use std::fmt;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::params::Params;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Delete,
    Get,
    Head,
    Patch,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streamed request body chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Opaque binary payload tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Blob {
    pub fn new(content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            bytes: bytes.into(),
        }
    }
}

/// Outgoing body in the form the transport receives it.
///
/// JSON payloads have already been serialized to `Text` by the time a request
/// reaches this type. `Form` fields are handed over unencoded so the
/// transport can choose urlencoded or multipart framing.
pub enum Body {
    Empty,
    Text(String),
    Bytes(Bytes),
    Form(Params),
    Blob(Blob),
    Stream(BodyStream),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Text view of the body, when it is held as UTF-8 text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Body::Form(fields) => f.debug_tuple("Form").field(fields).finish(),
            Body::Blob(blob) => f.debug_tuple("Blob").field(blob).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// An HTTP request described as plain data, ready for a transport.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Params,
    pub body: Body,
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Params,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Params, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Stand-in for a response that never arrived: status 400, no headers,
    /// empty body.
    pub fn transport_failure() -> Self {
        Self::new(400, Params::new(), Bytes::new())
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_case("content-type")
    }
}
