//! Error taxonomy for the client façade.

/// Failures surfaced to callers.
///
/// The façade performs no retries and no backoff; every failure is
/// reported immediately, and retry policy stays with the caller. Each
/// variant renders a message distinct enough for a UI to tell "server not
/// running" from "model not found" from "bad input" without matching on
/// internals.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server cannot be reached (connection refused, DNS failure,
    /// timeout). The liveness probe folds this into `reachable: false`
    /// instead of raising it.
    #[error("cannot reach inference server: {0}")]
    Unreachable(String),

    /// Metadata requested for a name the server does not currently have.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Caller input rejected before any network call was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server answered with a payload we cannot parse into the
    /// expected shape.
    #[error("malformed server response: {0}")]
    MalformedResponse(String),

    /// Application-level error reported by the server itself.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
