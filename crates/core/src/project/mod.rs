//! Project domain types and validation.

pub mod completion;

pub use completion::completion_percent;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length of a project name.
pub const MAX_NAME_LENGTH: usize = 100;
/// Minimum length of a project name.
pub const MIN_NAME_LENGTH: usize = 2;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Project is being planned; work has not started.
    Planning,
    /// Project is underway.
    InProgress,
    /// All work is finished.
    Completed,
    /// Work is paused.
    OnHold,
    /// Project was abandoned.
    Cancelled,
}

impl ProjectStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "planning" => Some(Self::Planning),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "on_hold" => Some(Self::OnHold),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true while the project still accepts work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Planning | Self::InProgress | Self::OnHold)
    }

    /// Returns true for terminal statuses.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task and project priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Default priority.
    Medium,
    /// High priority.
    High,
    /// Drop-everything priority.
    Critical,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parses a priority from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Project validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectError {
    /// Name missing or outside the accepted length.
    #[error("project name must be 2-100 characters")]
    InvalidName,

    /// End date earlier than start date.
    #[error("end date must not be before start date")]
    InvalidDateRange,

    /// Unknown status label.
    #[error("unknown project status: {0}")]
    UnknownStatus(String),
}

/// Validates a project name.
///
/// # Errors
///
/// Returns `ProjectError::InvalidName` when the trimmed name is outside
/// `MIN_NAME_LENGTH..=MAX_NAME_LENGTH`.
pub fn validate_name(name: &str) -> Result<(), ProjectError> {
    let len = name.trim().chars().count();
    if (MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(ProjectError::InvalidName)
    }
}

/// Validates a project date range.
///
/// Open-ended ranges (either bound missing) are always valid.
///
/// # Errors
///
/// Returns `ProjectError::InvalidDateRange` when the end precedes the start.
pub fn validate_dates(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), ProjectError> {
    if let (Some(start), Some(end)) = (start_date, end_date)
        && end < start
    {
        return Err(ProjectError::InvalidDateRange);
    }
    Ok(())
}

/// Returns true if a project with this end date and status is overdue.
#[must_use]
pub fn is_overdue(end_date: Option<NaiveDate>, status: ProjectStatus, today: NaiveDate) -> bool {
    match end_date {
        Some(end) => !status.is_terminal() && today > end,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("planning", ProjectStatus::Planning)]
    #[case("in_progress", ProjectStatus::InProgress)]
    #[case("COMPLETED", ProjectStatus::Completed)]
    #[case("on_hold", ProjectStatus::OnHold)]
    #[case("cancelled", ProjectStatus::Cancelled)]
    fn test_status_round_trip(#[case] input: &str, #[case] expected: ProjectStatus) {
        assert_eq!(ProjectStatus::parse(input), Some(expected));
        assert_eq!(ProjectStatus::parse(expected.as_str()), Some(expected));
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(ProjectStatus::parse("archived"), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("AB").is_ok());
        assert!(validate_name(&"x".repeat(100)).is_ok());
        assert_eq!(validate_name("a"), Err(ProjectError::InvalidName));
        assert_eq!(
            validate_name(&"x".repeat(101)),
            Err(ProjectError::InvalidName)
        );
        assert_eq!(validate_name("   "), Err(ProjectError::InvalidName));
    }

    #[test]
    fn test_validate_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();

        assert!(validate_dates(Some(start), Some(end)).is_ok());
        assert!(validate_dates(None, Some(end)).is_ok());
        assert!(validate_dates(Some(start), None).is_ok());
        assert_eq!(
            validate_dates(Some(end), Some(start)),
            Err(ProjectError::InvalidDateRange)
        );
    }

    #[test]
    fn test_overdue_requires_open_status() {
        let end = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        assert!(is_overdue(Some(end), ProjectStatus::InProgress, later));
        assert!(!is_overdue(Some(end), ProjectStatus::Completed, later));
        assert!(!is_overdue(Some(end), ProjectStatus::Cancelled, later));
        assert!(!is_overdue(None, ProjectStatus::InProgress, later));
    }
}
