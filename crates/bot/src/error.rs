//! Error types for the checkout flow.
//!
//! The taxonomy mirrors how failures propagate: transport failures are
//! connection-level and never retried here; protocol failures carry the
//! offending status and body for diagnosis; authentication failures mean the
//! session must be discarded and rebuilt, never repaired.

use thiserror::Error;

/// Maximum response-body length carried inside an error.
const BODY_SNIPPET_LEN: usize = 500;

/// Failures surfaced by sessions and checkout clients.
#[derive(Debug, Error)]
pub enum BotError {
    /// Network/connection-level failure. Never retried by the core.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with a status the flow does not accept.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A response arrived without a field the flow needs.
    #[error("response missing {field}: {body}")]
    MissingField {
        field: &'static str,
        body: String,
    },

    /// Response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Interactive login or token exchange did not succeed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// An operation was attempted in the wrong lifecycle phase.
    #[error("phase violation: {0}")]
    Phase(String),
}

/// Truncate a response body for inclusion in errors and logs.
pub(crate) fn body_snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_SNIPPET_LEN)
        .collect()
}
