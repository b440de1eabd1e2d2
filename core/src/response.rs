//! Response normalization.
//!
//! # Design
//! Every call ends in a [`NormalizedResponse`], whatever happened on the
//! wire. The status code decides the branch: a 2xx payload is decoded into
//! `data`, anything else into `error`. Decoding is best-effort and attempted
//! exactly once; when it fails the slot stays `None` and the failure is kept
//! in `decode_error` so callers and tests can see why.
//!
//! The error branch is decoded the same way as the success branch: with the
//! caller's [`DecodeAs`] mode in [`normalize`], or as JSON into the caller's
//! error type in [`normalize_json`].

use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http::{Blob, HttpResponse};
use crate::params::Params;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// How to decode a response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeAs {
    Json,
    Buffer,
    FormData,
    Blob,
    #[default]
    Text,
}

/// A body decoded according to a [`DecodeAs`] mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(serde_json::Value),
    Buffer(Bytes),
    FormData(Params),
    Blob(Blob),
    Text(String),
}

impl ResponseData {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseData::Buffer(bytes) => Some(bytes),
            ResponseData::Blob(blob) => Some(&blob.bytes),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&Params> {
        match self {
            ResponseData::FormData(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Why a body could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("expected content-type {expected}, got {found:?}")]
    ContentType {
        expected: &'static str,
        found: Option<String>,
    },
}

/// Uniform result of a call.
///
/// `data` and `error` are never both set. `ok` is `true` exactly when
/// `200 <= code <= 299`, and only the slot matching `ok` can hold a value.
#[derive(Debug)]
pub struct NormalizedResponse<D, E> {
    pub data: Option<D>,
    pub error: Option<E>,
    pub code: u16,
    pub ok: bool,
    pub headers: Params,
    /// Set when the body was present but could not be decoded.
    pub decode_error: Option<DecodeError>,
}

impl<D, E> NormalizedResponse<D, E> {
    /// Collapse into a `Result`, `Err` carrying the decoded error payload
    /// when there is one.
    pub fn into_result(self) -> Result<Option<D>, Option<E>> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(self.error)
        }
    }
}

/// Decode `response` according to `decode_as`.
pub fn normalize(
    response: HttpResponse,
    decode_as: DecodeAs,
) -> NormalizedResponse<ResponseData, ResponseData> {
    classify(response, |headers, body| decode(decode_as, headers, body))
}

/// Decode `response` as JSON into `D` on success or `E` on failure.
///
/// An empty body leaves both slots `None` without a `decode_error`.
pub fn normalize_json<D, E>(response: HttpResponse) -> NormalizedResponse<D, E>
where
    D: DeserializeOwned,
    E: DeserializeOwned,
{
    let ok = response.is_success();
    let HttpResponse {
        status,
        headers,
        body,
    } = response;
    debug!(status, ok, "normalizing response");

    let (data, error, decode_error) = if body.is_empty() {
        // HEAD, 204 and failed transports: nothing to decode
        (None, None, None)
    } else if ok {
        match serde_json::from_slice::<D>(&body) {
            Ok(data) => (Some(data), None, None),
            Err(err) => (None, None, Some(DecodeError::from(err))),
        }
    } else {
        match serde_json::from_slice::<E>(&body) {
            Ok(error) => (None, Some(error), None),
            Err(err) => (None, None, Some(DecodeError::from(err))),
        }
    };
    if let Some(err) = &decode_error {
        warn!(status, error = %err, "response body could not be decoded");
    }

    NormalizedResponse {
        data,
        error,
        code: status,
        ok,
        headers,
        decode_error,
    }
}

fn classify<F>(response: HttpResponse, decode: F) -> NormalizedResponse<ResponseData, ResponseData>
where
    F: FnOnce(&Params, Bytes) -> Result<ResponseData, DecodeError>,
{
    let ok = response.is_success();
    let HttpResponse {
        status,
        headers,
        body,
    } = response;
    debug!(status, ok, "normalizing response");

    let (payload, decode_error) = match decode(&headers, body) {
        Ok(payload) => (Some(payload), None),
        Err(err) => {
            warn!(status, error = %err, "response body could not be decoded");
            (None, Some(err))
        }
    };
    let (data, error) = if ok { (payload, None) } else { (None, payload) };

    NormalizedResponse {
        data,
        error,
        code: status,
        ok,
        headers,
        decode_error,
    }
}

fn decode(mode: DecodeAs, headers: &Params, body: Bytes) -> Result<ResponseData, DecodeError> {
    let content_type = headers.get_ignore_case("content-type");
    match mode {
        DecodeAs::Json => Ok(ResponseData::Json(serde_json::from_slice(&body)?)),
        DecodeAs::Buffer => Ok(ResponseData::Buffer(body)),
        DecodeAs::FormData => match content_type {
            Some(ct) if ct.starts_with(FORM_URLENCODED) => Ok(ResponseData::FormData(
                url::form_urlencoded::parse(&body).into_owned().collect(),
            )),
            found => Err(DecodeError::ContentType {
                expected: FORM_URLENCODED,
                found: found.map(str::to_string),
            }),
        },
        DecodeAs::Blob => Ok(ResponseData::Blob(Blob::new(
            content_type.map(str::to_string),
            body,
        ))),
        DecodeAs::Text => Ok(ResponseData::Text(String::from_utf8(body.to_vec())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status, Params::new(), body.to_string())
    }

    #[test]
    fn success_goes_to_data() {
        let normalized = normalize(response(200, "hello"), DecodeAs::Text);
        assert!(normalized.ok);
        assert_eq!(normalized.code, 200);
        assert_eq!(normalized.data, Some(ResponseData::Text("hello".to_string())));
        assert!(normalized.error.is_none());
    }

    #[test]
    fn failure_goes_to_error() {
        let normalized = normalize(response(500, r#"{"m":1}"#), DecodeAs::Json);
        assert!(!normalized.ok);
        assert!(normalized.data.is_none());
        assert_eq!(
            normalized.error.and_then(|e| e.as_json().cloned()),
            Some(serde_json::json!({"m": 1}))
        );
    }

    #[test]
    fn data_and_error_follow_status_for_every_code() {
        for status in [100, 199, 200, 201, 299, 300, 301, 400, 404, 500, 599] {
            let normalized = normalize(response(status, "x"), DecodeAs::Text);
            let ok = (200..=299).contains(&status);
            assert_eq!(normalized.ok, ok, "status {status}");
            assert_eq!(normalized.data.is_some(), ok, "status {status}");
            assert_eq!(normalized.error.is_some(), !ok, "status {status}");
        }
    }

    #[test]
    fn malformed_json_is_swallowed_but_observable() {
        let normalized = normalize(response(200, "not json"), DecodeAs::Json);
        assert!(normalized.ok);
        assert!(normalized.data.is_none());
        assert!(normalized.error.is_none());
        assert!(matches!(normalized.decode_error, Some(DecodeError::Json(_))));
    }

    #[test]
    fn empty_json_body_is_not_a_decode_error() {
        for status in [200, 204, 404] {
            let normalized: NormalizedResponse<serde_json::Value, serde_json::Value> =
                normalize_json(response(status, ""));
            assert!(normalized.data.is_none(), "status {status}");
            assert!(normalized.error.is_none(), "status {status}");
            assert!(normalized.decode_error.is_none(), "status {status}");
        }
    }

    #[test]
    fn invalid_utf8_text_is_swallowed() {
        let bad = HttpResponse::new(200, Params::new(), vec![0xff, 0xfe]);
        let normalized = normalize(bad, DecodeAs::Text);
        assert!(normalized.data.is_none());
        assert!(matches!(normalized.decode_error, Some(DecodeError::Utf8(_))));
    }

    #[test]
    fn form_data_requires_urlencoded_content_type() {
        let headers = Params::new().with("Content-Type", "application/x-www-form-urlencoded");
        let form = HttpResponse::new(200, headers, "a=1&b=two+words");
        let normalized = normalize(form, DecodeAs::FormData);
        let fields = normalized.data.unwrap();
        assert_eq!(fields.as_form().unwrap().get("b"), Some("two words"));

        let normalized = normalize(response(200, "a=1"), DecodeAs::FormData);
        assert!(normalized.data.is_none());
        assert!(matches!(
            normalized.decode_error,
            Some(DecodeError::ContentType { found: None, .. })
        ));
    }

    #[test]
    fn blob_keeps_content_type() {
        let headers = Params::new().with("content-type", "image/png");
        let normalized = normalize(HttpResponse::new(200, headers, vec![1u8, 2, 3]), DecodeAs::Blob);
        match normalized.data {
            Some(ResponseData::Blob(blob)) => {
                assert_eq!(blob.content_type.as_deref(), Some("image/png"));
                assert_eq!(&blob.bytes[..], &[1, 2, 3]);
            }
            other => panic!("expected blob, got {other:?}"),
        }
    }

    #[test]
    fn buffer_returns_raw_bytes() {
        let normalized = normalize(response(204, ""), DecodeAs::Buffer);
        assert_eq!(normalized.data, Some(ResponseData::Buffer(Bytes::new())));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ApiMessage {
        message: String,
    }

    #[test]
    fn normalize_json_types_both_branches() {
        let ok: NormalizedResponse<User, ApiMessage> =
            normalize_json(response(200, r#"{"name":"a"}"#));
        assert_eq!(ok.data, Some(User { name: "a".to_string() }));
        assert!(ok.error.is_none());

        let not_found: NormalizedResponse<User, ApiMessage> =
            normalize_json(response(404, r#"{"message":"not found"}"#));
        assert!(not_found.data.is_none());
        assert_eq!(
            not_found.error,
            Some(ApiMessage {
                message: "not found".to_string()
            })
        );
        assert_eq!(not_found.code, 404);
    }

    #[test]
    fn into_result_splits_on_ok() {
        let normalized = normalize(response(404, "gone"), DecodeAs::Text);
        let err = normalized.into_result().unwrap_err();
        assert_eq!(err, Some(ResponseData::Text("gone".to_string())));
    }
}
