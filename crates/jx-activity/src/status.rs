//! Activity status values shared by records, steps and sub-steps.

use serde::{Deserialize, Serialize};

/// Status of an activity, a step or a sub-step.
///
/// `None` serializes as the empty string so records written by other tools
/// without a status round-trip unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[default]
    #[serde(rename = "")]
    None,
    Pending,
    Running,
    Succeeded,
    Failed,
    Aborted,
}

impl ActivityStatus {
    /// Check if no further transitions are expected
    pub fn is_terminated(&self) -> bool {
        matches!(
            self,
            ActivityStatus::Succeeded | ActivityStatus::Failed | ActivityStatus::Aborted
        )
    }

    /// Check if the status carries no information
    pub fn is_none(&self) -> bool {
        matches!(self, ActivityStatus::None)
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityStatus::None => "",
            ActivityStatus::Pending => "Pending",
            ActivityStatus::Running => "Running",
            ActivityStatus::Succeeded => "Succeeded",
            ActivityStatus::Failed => "Failed",
            ActivityStatus::Aborted => "Aborted",
        };
        f.pad(s)
    }
}
