//! Login admission policy: active flag and failed-attempt lockout.
//!
//! The gate is pure: it receives the stored account state and the current
//! time, and decides whether a login attempt may proceed. Persisting the
//! resulting counters is the caller's job.

use chrono::{DateTime, Duration, Utc};

/// Lockout policy parameters.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failed attempts before the account is locked.
    pub max_attempts: u32,
    /// How long the lock lasts once engaged.
    pub lockout_minutes: i64,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_minutes: 30,
        }
    }
}

/// Stored account state relevant to login admission.
#[derive(Debug, Clone, Copy)]
pub struct AccountState {
    /// Soft-delete flag; inactive accounts never authenticate.
    pub is_active: bool,
    /// Consecutive failed login attempts.
    pub failed_attempts: u32,
    /// Lock expiry, if a lock is currently recorded.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Outcome of evaluating a login attempt before password verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    /// The attempt may proceed to password verification.
    Admissible,
    /// The account is deactivated.
    Inactive,
    /// The account is locked until the given time.
    Locked(DateTime<Utc>),
}

/// Counter update to persist after a failed password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureUpdate {
    /// New value for the failed-attempt counter.
    pub failed_attempts: u32,
    /// Lock expiry to store, when the attempt limit was reached.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Login admission gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginGate {
    policy: LockoutPolicy,
}

impl LoginGate {
    /// Creates a gate with the given policy.
    #[must_use]
    pub const fn new(policy: LockoutPolicy) -> Self {
        Self { policy }
    }

    /// Decides whether a login attempt may proceed.
    ///
    /// An expired lock does not block the attempt; the stale `locked_until`
    /// is cleared by the success path.
    #[must_use]
    pub fn evaluate(&self, account: AccountState, now: DateTime<Utc>) -> LoginDecision {
        if !account.is_active {
            return LoginDecision::Inactive;
        }

        match account.locked_until {
            Some(until) if until > now => LoginDecision::Locked(until),
            _ => LoginDecision::Admissible,
        }
    }

    /// Computes the counter update after a failed password check.
    ///
    /// Reaching `max_attempts` engages the lock for `lockout_minutes`.
    #[must_use]
    pub fn register_failure(&self, account: AccountState, now: DateTime<Utc>) -> FailureUpdate {
        let failed_attempts = account.failed_attempts.saturating_add(1);
        let locked_until = (failed_attempts >= self.policy.max_attempts)
            .then(|| now + Duration::minutes(self.policy.lockout_minutes));

        FailureUpdate {
            failed_attempts,
            locked_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_account() -> AccountState {
        AccountState {
            is_active: true,
            failed_attempts: 0,
            locked_until: None,
        }
    }

    #[test]
    fn test_active_account_is_admissible() {
        let gate = LoginGate::default();
        let decision = gate.evaluate(active_account(), Utc::now());
        assert_eq!(decision, LoginDecision::Admissible);
    }

    #[test]
    fn test_inactive_account_is_rejected() {
        let gate = LoginGate::default();
        let account = AccountState {
            is_active: false,
            ..active_account()
        };

        assert_eq!(gate.evaluate(account, Utc::now()), LoginDecision::Inactive);
    }

    #[test]
    fn test_open_lock_blocks_login() {
        let gate = LoginGate::default();
        let now = Utc::now();
        let until = now + Duration::minutes(10);
        let account = AccountState {
            locked_until: Some(until),
            ..active_account()
        };

        assert_eq!(gate.evaluate(account, now), LoginDecision::Locked(until));
    }

    #[test]
    fn test_expired_lock_admits_login() {
        let gate = LoginGate::default();
        let now = Utc::now();
        let account = AccountState {
            failed_attempts: 5,
            locked_until: Some(now - Duration::minutes(1)),
            ..active_account()
        };

        assert_eq!(gate.evaluate(account, now), LoginDecision::Admissible);
    }

    #[test]
    fn test_lock_engages_exactly_at_limit() {
        let gate = LoginGate::new(LockoutPolicy {
            max_attempts: 5,
            lockout_minutes: 30,
        });
        let now = Utc::now();

        let below = gate.register_failure(
            AccountState {
                failed_attempts: 3,
                ..active_account()
            },
            now,
        );
        assert_eq!(below.failed_attempts, 4);
        assert!(below.locked_until.is_none());

        let at_limit = gate.register_failure(
            AccountState {
                failed_attempts: 4,
                ..active_account()
            },
            now,
        );
        assert_eq!(at_limit.failed_attempts, 5);
        assert_eq!(at_limit.locked_until, Some(now + Duration::minutes(30)));
    }
}
