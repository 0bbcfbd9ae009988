//! Typed errors for the catalog and Datafangst clients

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of characters of a response body kept in an error
pub const MAX_BODY_CHARS: usize = 500;

/// Errors raised by the catalog and Datafangst clients
///
/// Every variant stops the current batch. Record-level problems in the
/// catalog are reported as [`crate::services::relations::models::MalformedCatalogEntry`]
/// instead and never surface here.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("service at {url} answered HTTP {status}: {body}")]
    UnreachableService {
        url: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Login or credentials were rejected, or no login happened yet
    #[error("authentication against {url} failed: {reason}")]
    AuthenticationFailure {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Validation did not reach a terminal status in time
    #[error("validation at {link} still not finished after {attempts} polls")]
    Timeout { link: String, attempts: u32 },

    /// A feature collection lacks a resource link we need
    #[error("feature collection {collection} has no '{rel}' resource")]
    MissingResource { collection: String, rel: String },

    /// No endpoint is configured for the requested environment
    #[error("{service} is not configured for environment {environment}")]
    UnsupportedEnvironment {
        service: &'static str,
        environment: String,
    },

    /// A credential provider could not produce credentials
    #[error("could not resolve credentials: {0}")]
    Credentials(String),

    /// An upload was driven through its states in the wrong order
    #[error("cannot move upload from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// A downloaded collection could not be written to disk
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Truncate a response body for inclusion in an error message
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
