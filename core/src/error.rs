//! Error types for the request client.
//!
//! # Design
//! Expected request outcomes never surface as `Err`: transport failures,
//! non-2xx statuses and undecodable bodies all resolve into a
//! [`NormalizedResponse`](crate::response::NormalizedResponse). `Error` only
//! covers calls that are malformed before anything is sent: a path-pattern
//! whose variables do not match the supplied ones, a route the table does not
//! declare, options that contradict the route declaration, or a payload or
//! configuration document that cannot be (de)serialized.

use thiserror::Error;

use crate::http::HttpMethod;
use crate::route::BodyShape;

#[derive(Debug, Error)]
pub enum Error {
    /// The path-pattern names a variable the call did not supply.
    #[error("path variable `{name}` required by `{pattern}` was not supplied")]
    MissingPathVariable { pattern: String, name: String },

    /// The call supplied a variable the path-pattern does not name.
    #[error("path variable `{name}` is not part of `{pattern}`")]
    UnexpectedPathVariable { pattern: String, name: String },

    /// The route table is closed and has no entry for this method and path.
    #[error("{method} {path} is not declared in the route table")]
    UndeclaredRoute { method: HttpMethod, path: String },

    #[error("route `{pattern}` requires header `{name}`")]
    MissingDeclaredHeader { pattern: String, name: String },

    #[error("route `{pattern}` requires query parameter `{name}`")]
    MissingDeclaredQuery { pattern: String, name: String },

    #[error("route `{pattern}` requires cookie `{name}`")]
    MissingDeclaredCookie { pattern: String, name: String },

    #[error("route `{pattern}` expects a {expected} body, got {found:?}")]
    BodyShapeMismatch {
        pattern: String,
        expected: BodyShape,
        found: Option<BodyShape>,
    },

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A client configuration document could not be parsed.
    #[error("invalid client configuration: {0}")]
    Config(#[source] serde_json::Error),
}

impl Error {
    /// True for the two path-variable mismatch variants.
    pub fn is_path_variable_mismatch(&self) -> bool {
        matches!(
            self,
            Error::MissingPathVariable { .. } | Error::UnexpectedPathVariable { .. }
        )
    }
}
