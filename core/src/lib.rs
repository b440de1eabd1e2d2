//! Typed HTTP request-building client.
//!
//! # Overview
//! Builds requests from client-wide defaults plus per-call headers, query,
//! cookies and body, hands them to a caller-supplied [`Transport`], and
//! normalizes whatever comes back into a [`NormalizedResponse`].
//!
//! # Design
//! - [`Client`] is the fluent form: `client.post("/users").header(..).data(..)`
//!   then `submit`.
//! - [`RouteClient`] is the route-typed form: calls name a path-pattern such
//!   as `/users/$id`, are checked against a [`RouteTable`], and fail fast
//!   with an [`Error`] before sending when their path variables do not match.
//! - Expected failures (transport errors, non-2xx statuses, undecodable
//!   bodies) never surface as `Err`; they are part of the normalized result.
//! - The core does no I/O of its own, so request building and normalization
//!   are deterministic and testable with an in-memory transport.

pub mod builder;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod params;
pub mod query;
pub mod response;
pub mod route;
pub mod transport;

pub use builder::{Bodied, Bodiless, Payload, RequestBuilder};
pub use client::{Client, RequestOptions, RouteClient};
pub use config::ClientDefaults;
pub use dispatch::{dispatch, CancelSignal};
pub use error::Error;
pub use http::{Blob, Body, BodyStream, HttpMethod, HttpRequest, HttpResponse};
pub use params::Params;
pub use query::{encode_query, QueryValue};
pub use response::{normalize, normalize_json, DecodeAs, DecodeError, NormalizedResponse, ResponseData};
pub use route::{BodyShape, PathPattern, PathVariables, Route, RouteSpec, RouteTable, Segment};
pub use transport::{Transport, TransportError};
