//! Project completion percentage.
//!
//! The percentage is derived from the project's tasks: the share of tasks
//! in the `done` status, rounded to the nearest whole percent. A project
//! with no tasks is 0% complete.

/// Computes the completion percentage for `done_tasks` out of `total_tasks`.
///
/// Always returns a value in `0..=100`. `done_tasks` is clamped to
/// `total_tasks` so a stale count can never push the result past 100.
#[must_use]
pub fn completion_percent(done_tasks: u64, total_tasks: u64) -> u8 {
    if total_tasks == 0 {
        return 0;
    }

    let done = done_tasks.min(total_tasks);
    // Integer rounding: floor((100 * done + total / 2) / total)
    let percent = (done * 100 + total_tasks / 2) / total_tasks;

    u8::try_from(percent).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_tasks_is_zero_percent() {
        assert_eq!(completion_percent(0, 0), 0);
    }

    #[test]
    fn test_all_done_is_one_hundred() {
        assert_eq!(completion_percent(7, 7), 100);
    }

    #[test]
    fn test_rounding_to_nearest() {
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(1, 8), 13);
    }

    #[test]
    fn test_done_clamped_to_total() {
        assert_eq!(completion_percent(10, 3), 100);
    }

    proptest! {
        #[test]
        fn test_percent_always_in_bounds(done in 0u64..10_000, total in 0u64..10_000) {
            let percent = completion_percent(done, total);
            prop_assert!(percent <= 100);
        }

        #[test]
        fn test_percent_monotonic_in_done(done in 0u64..1_000, total in 1u64..1_000) {
            let done = done.min(total);
            if done < total {
                let lower = completion_percent(done, total);
                let higher = completion_percent(done + 1, total);
                prop_assert!(higher >= lower);
            }
        }
    }
}
