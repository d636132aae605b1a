pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Role, UserResponse};

pub use extractors::AuthenticatedUser;
pub use middleware::{AuthMiddleware, TOKEN_HEADER};
pub use password::{hash_password, verify_password, PasswordHasher};
pub use token::{Claims, TokenError, TokenPolicy, TokenService};

/// Payload for `POST /user/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 72))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Payload for `POST /user/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for `POST /user/change-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 1, max = 72))]
    pub new_password: String,
}

/// Payload for `PUT /user/update-user/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Response after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_validation() {
        let valid: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "A",
            "email": "a@x.com",
            "password": "p1"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.role, None);

        let bad_email = RegisterRequest {
            email: "testexample.com".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());

        let empty_name = RegisterRequest {
            name: "".to_string(),
            email: "a@x.com".to_string(),
            password: "p1".to_string(),
            role: Some(Role::Admin),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_password = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_update_user_request_allows_partial_payloads() {
        let name_only: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "name": "B" })).unwrap();
        assert!(name_only.validate().is_ok());
        assert!(name_only.email.is_none());

        let bad_email: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "email": "nope" })).unwrap();
        assert!(bad_email.validate().is_err());
    }
}
