//! Authentication payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// The `result` of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SignInResult {
    #[validate(length(min = 1, message = "Access token cannot be empty"))]
    pub token: String,
    pub authenticated: bool,
    pub username: String,
    #[validate(length(min = 1, message = "At least one role is required"))]
    pub roles: Vec<String>,
}

/// Roles a user may register with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignUpRole {
    Buyer,
    Farmer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: SignUpRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SignUpResult {
    #[validate(range(min = 1))]
    pub id: i64,
    pub username: String,
    pub role: String,
    #[validate(length(min = 1))]
    pub token: String,
}

/// Body of the sign-out, refresh and introspect requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub refresh_token: String,
    /// Lifetime of the new access token, in seconds.
    #[validate(range(exclusive_min = 0))]
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct IntrospectResult {
    pub active: bool,
    pub username: String,
    pub role: String,
    #[validate(range(exclusive_min = 0))]
    pub exp: i64,
}
