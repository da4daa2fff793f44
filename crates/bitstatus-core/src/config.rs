//! Notifier configuration as an explicit parameter bundle.
//!
//! The host engine's configuration layer owns collection and persistence;
//! the core only consumes plain values. Passing them as one bundle keeps the
//! orchestration testable without any ambient state.

use serde::{Deserialize, Serialize};

/// Configuration consumed by one notification invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Status-API host, full URL with scheme.
    pub status_host: String,

    /// Global default credential identifier.
    #[serde(default)]
    pub global_credentials_id: Option<String>,

    /// Per-job credential identifier, looked up before the global one.
    #[serde(default)]
    pub credentials_id: Option<String>,

    /// Report an in-progress status before the build starts.
    #[serde(default)]
    pub notify_start: bool,

    /// Report the final status after the build finishes.
    #[serde(default = "default_true")]
    pub notify_finish: bool,

    /// Collapse all builds of a job onto one remote status entry.
    #[serde(default)]
    pub override_latest_build: bool,
}

fn default_true() -> bool {
    true
}

impl NotifierConfig {
    pub fn new(status_host: impl Into<String>) -> Self {
        Self {
            status_host: status_host.into(),
            global_credentials_id: None,
            credentials_id: None,
            notify_start: false,
            notify_finish: true,
            override_latest_build: false,
        }
    }
}
