//! Credential resolution for the status API.
//!
//! The credential store itself belongs to the host engine; this module only
//! defines the lookup seam and the ordered per-job → global fallback chain.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

/// A username/secret pair for HTTP basic authentication.
///
/// The secret is deliberately kept out of `Debug` output; it is only ever
/// read when the authorization header is computed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Lookup of a named credential identifier.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup(&self, id: &str) -> Option<Credentials>;
}

/// In-memory credential store backed by a `HashMap<id, Credentials>`.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<String>, credentials: Credentials) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(id.into(), credentials);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn lookup(&self, id: &str) -> Option<Credentials> {
        let entries = self.entries.lock().unwrap();
        entries.get(id).cloned()
    }
}

/// Ordered credential resolution: the job-scoped identifier wins over the
/// global default; identifiers that resolve to nothing fall through.
pub async fn resolve_credentials(
    store: &dyn CredentialStore,
    job_scoped: Option<&str>,
    global: Option<&str>,
) -> Option<Credentials> {
    for id in [job_scoped, global].into_iter().flatten() {
        if let Some(credentials) = store.lookup(id).await {
            return Some(credentials);
        }
    }
    None
}
