//! Update decision outcome types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a dependency produced no update in a group pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already handled earlier in this run
    AlreadyHandled,
    /// Every newer version is excluded by ignore conditions
    AllVersionsIgnored,
    /// The version jump is not admitted by the group's update types
    SemverExcluded,
    /// Already at the latest permissible version
    UpToDate,
    /// No requirement scope allows the update
    UpdateNotPossible,
    /// The checker proposed no dependency changes
    NoChanges,
}

impl SkipReason {
    /// Returns true if this skip leaves the dependency eligible for other work
    pub fn keeps_eligible(&self) -> bool {
        matches!(self, SkipReason::SemverExcluded)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyHandled => write!(f, "already handled"),
            SkipReason::AllVersionsIgnored => write!(f, "all versions ignored"),
            SkipReason::SemverExcluded => write!(f, "update type not allowed in group"),
            SkipReason::UpToDate => write!(f, "already up to date"),
            SkipReason::UpdateNotPossible => write!(f, "update not possible"),
            SkipReason::NoChanges => write!(f, "no changes proposed"),
        }
    }
}
