//! Status/progress coupling for tasks.
//!
//! Status and progress move together: picking a status implies a progress
//! value, and reporting a progress value implies a status. An explicit
//! value supplied by the caller always wins over the implied one.

use super::TaskStatus;

/// Progress value implied by a status change.
///
/// `Blocked` carries no implication: the work stands wherever it stood.
#[must_use]
pub const fn progress_for_status(status: TaskStatus) -> Option<i32> {
    match status {
        TaskStatus::Todo => Some(0),
        TaskStatus::InProgress => Some(25),
        TaskStatus::Testing => Some(90),
        TaskStatus::Done => Some(100),
        TaskStatus::Blocked => None,
    }
}

/// Status implied by a reported progress value.
#[must_use]
pub const fn status_for_progress(progress: i32) -> TaskStatus {
    match progress {
        i32::MIN..=0 => TaskStatus::Todo,
        100..=i32::MAX => TaskStatus::Done,
        _ => TaskStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_progress_for_status_map() {
        assert_eq!(progress_for_status(TaskStatus::Todo), Some(0));
        assert_eq!(progress_for_status(TaskStatus::InProgress), Some(25));
        assert_eq!(progress_for_status(TaskStatus::Testing), Some(90));
        assert_eq!(progress_for_status(TaskStatus::Done), Some(100));
        assert_eq!(progress_for_status(TaskStatus::Blocked), None);
    }

    #[test]
    fn test_status_for_progress_boundaries() {
        assert_eq!(status_for_progress(0), TaskStatus::Todo);
        assert_eq!(status_for_progress(1), TaskStatus::InProgress);
        assert_eq!(status_for_progress(99), TaskStatus::InProgress);
        assert_eq!(status_for_progress(100), TaskStatus::Done);
    }

    proptest! {
        /// Applying the implied status of an implied progress is a fixpoint:
        /// a second round trip never changes the pair again.
        #[test]
        fn test_coupling_is_idempotent(progress in 0i32..=100) {
            let status = status_for_progress(progress);
            if let Some(implied) = progress_for_status(status) {
                prop_assert_eq!(status_for_progress(implied), status);
            }
        }
    }
}
