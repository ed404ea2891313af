//! Typed domain error enum.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! The error type implements `thiserror::Error` and converts to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

/// Every way the enable-ci workflow can fail.
///
/// Services raise these through `anyhow`; the front end recovers the variant
/// with `downcast_ref` to pick usage text and the JSON error code.
#[derive(Debug, Error)]
pub enum EnableCiError {
    /// Bad or missing command-line input.
    #[error("{0}")]
    Validation(String),

    /// A local or remote precondition does not hold.
    #[error("{0}")]
    Precondition(String),

    #[error("OpenShift application {application} did not get reachable within {seconds}s")]
    Timeout { application: String, seconds: u64 },

    #[error(
        "You already have {count} applications. Jenkins will need another free application slot for a builder application."
    )]
    Quota { count: usize, limit: usize },

    /// A subprocess or local I/O failure.
    #[error("{0}")]
    Transport(String),

    /// The platform rejected a call.
    #[error("{0}")]
    Upstream(String),
}

impl EnableCiError {
    /// Stable machine-readable name for the `--json` error object.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Precondition(_) => "precondition",
            Self::Timeout { .. } => "timeout",
            Self::Quota { .. } => "quota",
            Self::Transport(_) => "transport",
            Self::Upstream(_) => "upstream",
        }
    }
}

/// Find the taxonomy variant anywhere in an `anyhow` context chain.
#[must_use]
pub fn classify(err: &anyhow::Error) -> Option<&EnableCiError> {
    err.chain().find_map(|cause| cause.downcast_ref::<EnableCiError>())
}
