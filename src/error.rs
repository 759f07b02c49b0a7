//! Error taxonomy for the aggregation core.
//!
//! Three failure classes cover the public surface: malformed identifiers
//! and cursors, an unreachable primary source, and a record every source
//! reports absent. Adapter-level transport failures are wrapped into
//! [`Error::UpstreamUnavailable`] at the repository boundary.

use thiserror::Error;

/// Convenience alias for results carrying the core error taxonomy.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the aggregation core.
#[derive(Debug, Error)]
pub enum Error {
    /// An opaque identifier or cursor failed validation or decoding.
    #[error("invalid identifier: {reason}")]
    InvalidIdentifier { reason: String },

    /// The record-defining primary source for an operation failed, with
    /// retries exhausted. Secondary-source failures never raise this;
    /// they degrade to absent fields.
    #[error("upstream source unavailable: {upstream}: {reason}")]
    UpstreamUnavailable {
        upstream: &'static str,
        reason: String,
    },

    /// Every source reported the record absent.
    #[error("record not found: {id}")]
    NotFound { id: String },
}

impl Error {
    pub(crate) fn invalid_identifier(reason: impl Into<String>) -> Self {
        Error::InvalidIdentifier {
            reason: reason.into(),
        }
    }

    pub(crate) fn upstream(upstream: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::UpstreamUnavailable {
            upstream,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }
}
