//! Authentication logic: password hashing and login admission.

pub mod login_gate;
pub mod password;

pub use login_gate::{AccountState, FailureUpdate, LockoutPolicy, LoginDecision, LoginGate};
pub use password::{
    PasswordError, generate_temporary_password, hash_password, verify_password,
};
