//! The build-status payload sent to the remote API.

use serde::{Deserialize, Serialize};

use crate::state::BuildState;

/// Maximum key length accepted by the remote build-status API.
pub const MAX_KEY_LEN: usize = 40;

/// One build's status snapshot, serialized as the request body of a
/// build-status POST.
///
/// `state` is `None` when the build result maps to no defined remote state
/// (see [`BuildState::from_result`]); the field is then omitted from the
/// payload entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<BuildState>,
    pub key: String,
    pub url: String,
    pub name: String,
    pub description: String,
}

impl BuildStatus {
    pub fn new(
        state: Option<BuildState>,
        key: String,
        url: String,
        name: String,
        description: String,
    ) -> Self {
        Self {
            state,
            key,
            url,
            name,
            description,
        }
    }

    /// A copy of this status carrying a different key.
    ///
    /// Used for continuation: when the current build supersedes an aborted
    /// predecessor on the same commit, the outgoing status takes the
    /// predecessor's key so the remote entry is revised in place instead of
    /// duplicated.
    pub fn with_key(&self, key: String) -> Self {
        Self {
            key,
            ..self.clone()
        }
    }

    /// Human-readable state for log lines; "(none)" when the state is omitted.
    pub fn state_label(&self) -> &'static str {
        match self.state {
            Some(state) => state.as_str(),
            None => "(none)",
        }
    }
}
