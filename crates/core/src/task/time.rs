//! Time entry duration arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Computes the duration of a time entry in hours, rounded to two
/// decimal places. Returns zero when the entry ends before it starts.
#[must_use]
pub fn duration_hours(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Decimal {
    let seconds = (ended_at - started_at).num_seconds();
    if seconds <= 0 {
        return Decimal::ZERO;
    }

    (Decimal::from(seconds) / Decimal::from(3600)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_whole_hours() {
        let start = Utc::now();
        assert_eq!(duration_hours(start, start + Duration::hours(2)), dec!(2));
    }

    #[test]
    fn test_fractional_hours_round_to_two_places() {
        let start = Utc::now();
        assert_eq!(
            duration_hours(start, start + Duration::minutes(90)),
            dec!(1.5)
        );
        assert_eq!(
            duration_hours(start, start + Duration::minutes(20)),
            dec!(0.33)
        );
    }

    #[test]
    fn test_negative_interval_is_zero() {
        let start = Utc::now();
        assert_eq!(
            duration_hours(start, start - Duration::minutes(5)),
            Decimal::ZERO
        );
    }
}
