//! Authentication types for JWT and auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// JWT claims for access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role (admin, manager, user, viewer).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Role name.
    pub role: String,
    /// Department, if set.
    pub department: Option<String>,
    /// Job title, if set.
    pub job_title: Option<String>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Change password request for the authenticated user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, verified before the change is applied.
    pub current_password: String,
    /// New password.
    #[validate(length(min = 6, max = 255))]
    pub new_password: String,
}

/// Create user request (admin only).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username (letters, digits, underscores).
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 6, max = 255))]
    pub password: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Role name (defaults to "user").
    pub role: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
}

/// Update user request (admin, or self for profile fields).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address.
    #[validate(email)]
    pub email: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Role name (admin only).
    pub role: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, "manager", expires_at);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "manager");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        };
        assert!(validator::Validate::validate(&ok).is_ok());

        let short = LoginRequest {
            username: "ab".to_string(),
            password: "admin123".to_string(),
        };
        assert!(validator::Validate::validate(&short).is_err());
    }

    #[test]
    fn test_create_user_request_rejects_bad_email() {
        let req = CreateUserRequest {
            username: "newuser".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
            first_name: None,
            last_name: None,
            role: None,
            department: None,
            job_title: None,
        };
        assert!(validator::Validate::validate(&req).is_err());
    }
}
