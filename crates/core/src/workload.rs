//! Workload level classification for team reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workload level derived from a user's open task count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadLevel {
    /// Few or no open tasks.
    Low,
    /// A comfortable amount of open work.
    Moderate,
    /// Near capacity.
    High,
    /// More open work than one person should carry.
    Overloaded,
}

impl WorkloadLevel {
    /// Classifies an open task count into a workload level.
    #[must_use]
    pub const fn from_open_tasks(open_tasks: u64) -> Self {
        match open_tasks {
            0..=2 => Self::Low,
            3..=6 => Self::Moderate,
            7..=10 => Self::High,
            _ => Self::Overloaded,
        }
    }

    /// Returns the string representation of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Overloaded => "overloaded",
        }
    }
}

impl fmt::Display for WorkloadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, WorkloadLevel::Low)]
    #[case(2, WorkloadLevel::Low)]
    #[case(3, WorkloadLevel::Moderate)]
    #[case(6, WorkloadLevel::Moderate)]
    #[case(7, WorkloadLevel::High)]
    #[case(10, WorkloadLevel::High)]
    #[case(11, WorkloadLevel::Overloaded)]
    fn test_thresholds(#[case] open_tasks: u64, #[case] expected: WorkloadLevel) {
        assert_eq!(WorkloadLevel::from_open_tasks(open_tasks), expected);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(WorkloadLevel::Overloaded > WorkloadLevel::High);
        assert!(WorkloadLevel::High > WorkloadLevel::Moderate);
        assert!(WorkloadLevel::Moderate > WorkloadLevel::Low);
    }
}
