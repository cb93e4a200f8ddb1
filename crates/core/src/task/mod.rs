//! Task domain types and lifecycle rules.

pub mod progress;
pub mod time;

pub use progress::{progress_for_status, status_for_progress};
pub use time::duration_hours;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length of a task name.
pub const MAX_NAME_LENGTH: usize = 100;
/// Minimum length of a task name.
pub const MIN_NAME_LENGTH: usize = 2;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Implementation finished, under verification.
    Testing,
    /// Finished.
    Done,
    /// Cannot proceed until unblocked.
    Blocked,
}

impl TaskStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Testing => "testing",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "testing" => Some(Self::Testing),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Returns true while the task still counts as open work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Name missing or outside the accepted length.
    #[error("task name must be 2-100 characters")]
    InvalidName,

    /// Progress outside 0..=100.
    #[error("progress must be between 0 and 100")]
    InvalidProgress,

    /// End/due date earlier than start date.
    #[error("due date must not be before start date")]
    InvalidDateRange,

    /// A task cannot be its own parent.
    #[error("a task cannot be its own parent")]
    SelfParent,

    /// Unknown status label.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),
}

/// Validates a task name.
///
/// # Errors
///
/// Returns `TaskError::InvalidName` when the trimmed name is outside
/// `MIN_NAME_LENGTH..=MAX_NAME_LENGTH`.
pub fn validate_name(name: &str) -> Result<(), TaskError> {
    let len = name.trim().chars().count();
    if (MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(TaskError::InvalidName)
    }
}

/// Validates a progress value.
///
/// # Errors
///
/// Returns `TaskError::InvalidProgress` when outside `0..=100`.
pub fn validate_progress(progress: i32) -> Result<(), TaskError> {
    if (0..=100).contains(&progress) {
        Ok(())
    } else {
        Err(TaskError::InvalidProgress)
    }
}

/// Validates a task date range.
///
/// # Errors
///
/// Returns `TaskError::InvalidDateRange` when the due date precedes the start.
pub fn validate_dates(
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
) -> Result<(), TaskError> {
    if let (Some(start), Some(due)) = (start_date, due_date)
        && due < start
    {
        return Err(TaskError::InvalidDateRange);
    }
    Ok(())
}

/// Returns true if a task with this due date and status is overdue.
#[must_use]
pub fn is_overdue(due_date: Option<NaiveDate>, status: TaskStatus, today: NaiveDate) -> bool {
    match due_date {
        Some(due) => status.is_open() && today > due,
        None => false,
    }
}

/// Days until the due date; negative when already past.
#[must_use]
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("todo", TaskStatus::Todo)]
    #[case("in_progress", TaskStatus::InProgress)]
    #[case("Testing", TaskStatus::Testing)]
    #[case("done", TaskStatus::Done)]
    #[case("blocked", TaskStatus::Blocked)]
    fn test_status_round_trip(#[case] input: &str, #[case] expected: TaskStatus) {
        assert_eq!(TaskStatus::parse(input), Some(expected));
        assert_eq!(TaskStatus::parse(expected.as_str()), Some(expected));
    }

    #[test]
    fn test_only_done_is_closed() {
        assert!(!TaskStatus::Done.is_open());
        assert!(TaskStatus::Todo.is_open());
        assert!(TaskStatus::Blocked.is_open());
        assert!(TaskStatus::Testing.is_open());
    }

    #[test]
    fn test_validate_progress_bounds() {
        assert!(validate_progress(0).is_ok());
        assert!(validate_progress(100).is_ok());
        assert_eq!(validate_progress(-1), Err(TaskError::InvalidProgress));
        assert_eq!(validate_progress(101), Err(TaskError::InvalidProgress));
    }

    #[test]
    fn test_overdue_ignores_done_tasks() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        assert!(is_overdue(Some(due), TaskStatus::InProgress, later));
        assert!(!is_overdue(Some(due), TaskStatus::Done, later));
        assert!(!is_overdue(Some(due), TaskStatus::InProgress, due));
    }

    #[test]
    fn test_days_until_due() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();

        assert_eq!(days_until_due(due, today), 3);
        assert_eq!(days_until_due(today, due), -3);
    }
}
