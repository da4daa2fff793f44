//! Error taxonomy for the notification layer.
//!
//! Three classes, mirrored in how the orchestrator treats them:
//! - fatal for the whole call: missing/unsupported SCM, missing credentials,
//!   invalid status host;
//! - recoverable per repository: unparseable remote, host not allow-listed,
//!   missing commit id (logged and skipped, never surfaced as an error);
//! - transport failures: collected per resource, other resources still sent.

use thiserror::Error;

use bitstatus_core::HostError;

/// Failure to resolve a build's source-control reference at all.
#[derive(Debug, Error)]
pub enum ScmError {
    /// The job has no source-control binding.
    #[error("build status notification requires a source-control reference")]
    Missing,

    /// The binding exists but is not a system this notifier supports.
    #[error("unsupported source-control system: {0} (only git checkouts are supported)")]
    Unsupported(String),
}

/// Errors surfaced by a notification attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Scm(#[from] ScmError),

    #[error("credentials could not be resolved for status notification")]
    CredentialsMissing,

    #[error(transparent)]
    InvalidHost(#[from] HostError),

    #[error("status payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network error or non-2xx response; `status_code` is `None` when the
    /// request never produced a response.
    #[error("status delivery failed: {message}")]
    Transport {
        status_code: Option<u16>,
        message: String,
    },
}

impl NotifyError {
    /// Transport failure without an HTTP response (timeout, refused, DNS).
    pub fn transport(err: reqwest::Error) -> Self {
        NotifyError::Transport {
            status_code: None,
            message: err.to_string(),
        }
    }

    /// Transport failure carrying the remote's rejection.
    pub fn rejected(status_code: u16, body: &str) -> Self {
        NotifyError::Transport {
            status_code: Some(status_code),
            message: format!("http status {status_code}: {body}"),
        }
    }
}
