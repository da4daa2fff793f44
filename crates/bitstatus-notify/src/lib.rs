//! Build-status notification: commit resolution, orchestration, delivery.
//!
//! This crate wires the pure domain model of `bitstatus-core` to the outside
//! world:
//! - resolving a build's SCM binding into a commit→repository map,
//! - resolving credentials through an ordered fallback chain,
//! - deriving the outgoing status (including continuation across aborted
//!   predecessors),
//! - posting one status per resolved repository over HTTP.
//!
//! Notification is best-effort auxiliary behavior: a failure to notify never
//! fails the build itself.

pub mod credentials;
pub mod error;
pub mod log;
pub mod notifier;
pub mod scm;
pub mod transport;

// Re-export key types
pub use credentials::{resolve_credentials, CredentialStore, Credentials, MemoryCredentialStore};
pub use error::{NotifyError, ScmError};
pub use log::{BuildLog, MemoryLog, NullLog, WriterLog};
pub use notifier::{BuildStatusNotifier, NotifyFailure, NotifyOutcome, StepParams};
pub use scm::{resolve_commit_repo_map, CommitRepoEntry, CommitRepoMap, GitScmAdapter, ScmAdapter};
pub use transport::StatusDelivery;
