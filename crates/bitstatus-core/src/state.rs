//! Build results and the wire states derived from them.

use serde::{Deserialize, Serialize};

/// Terminal result of a build as reported by the job engine.
///
/// `Option<BuildResult>` is used throughout: `None` means the build is still
/// running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

/// Build state as understood by the remote build-status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildState {
    #[serde(rename = "INPROGRESS")]
    InProgress,
    Successful,
    Failed,
}

impl BuildState {
    /// Map an engine result to the remote state.
    ///
    /// A build with no result yet is in progress. `NotBuilt` maps to no
    /// state at all: the payload is sent with the state field omitted, which
    /// the remote API accepts as a "no status" update.
    pub fn from_result(result: Option<BuildResult>) -> Option<BuildState> {
        match result {
            None => Some(BuildState::InProgress),
            Some(BuildResult::Success) => Some(BuildState::Successful),
            Some(BuildResult::Unstable) | Some(BuildResult::Failure) | Some(BuildResult::Aborted) => {
                Some(BuildState::Failed)
            }
            Some(BuildResult::NotBuilt) => None,
        }
    }

    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildState::InProgress => "INPROGRESS",
            BuildState::Successful => "SUCCESSFUL",
            BuildState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BuildState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INPROGRESS" => Ok(BuildState::InProgress),
            "SUCCESSFUL" => Ok(BuildState::Successful),
            "FAILED" => Ok(BuildState::Failed),
            other => Err(format!("unknown build state: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_build_maps_to_in_progress() {
        assert_eq!(BuildState::from_result(None), Some(BuildState::InProgress));
    }

    #[test]
    fn success_maps_to_successful() {
        assert_eq!(
            BuildState::from_result(Some(BuildResult::Success)),
            Some(BuildState::Successful)
        );
    }

    #[test]
    fn unstable_failure_and_aborted_map_to_failed() {
        for result in [
            BuildResult::Unstable,
            BuildResult::Failure,
            BuildResult::Aborted,
        ] {
            assert_eq!(
                BuildState::from_result(Some(result)),
                Some(BuildState::Failed),
                "{result:?} should map to FAILED"
            );
        }
    }

    #[test]
    fn not_built_maps_to_no_state() {
        assert_eq!(BuildState::from_result(Some(BuildResult::NotBuilt)), None);
    }

    #[test]
    fn wire_names_round_trip() {
        for state in [
            BuildState::InProgress,
            BuildState::Successful,
            BuildState::Failed,
        ] {
            let parsed: BuildState = state.as_str().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn in_progress_serializes_without_underscore() {
        let json = serde_json::to_string(&BuildState::InProgress).unwrap();
        assert_eq!(json, "\"INPROGRESS\"");
    }
}
