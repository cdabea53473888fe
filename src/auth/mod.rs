//! Session, identity and role gating.
//!
//! The signed-in user is derived from the sign-in response and the access token's
//! claims. [`SessionManager`] owns the token and runs the single-flight refresh.

mod jwt;
mod manager;
mod session;

pub use jwt::*;
pub use manager::*;
pub use session::*;

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

/// Platform roles. Each has its own portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Farmer,
    Buyer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
        }
    }

    /// Parse a role name case-insensitively; `ROLE_` prefixes are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.strip_prefix("role_").unwrap_or(&lower) {
            "admin" => Some(Role::Admin),
            "farmer" => Some(Role::Farmer),
            "buyer" => Some(Role::Buyer),
            _ => None,
        }
    }

    /// Landing page of the role's portal.
    pub fn dashboard_path(&self) -> String {
        format!("/{}/dashboard", self.as_str())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub role: Role,
}

/// Path of the sign-in page.
pub const SIGN_IN_PATH: &str = "/signin";

/// Outcome of gating a portal on the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Nobody is signed in.
    SignInRequired,
    /// Signed in, but the portal belongs to other roles.
    WrongPortal(Role),
}

impl AccessDecision {
    /// Where to send the user instead, if anywhere.
    pub fn redirect(&self) -> Option<String> {
        match self {
            AccessDecision::Allow => None,
            AccessDecision::SignInRequired => Some(SIGN_IN_PATH.to_string()),
            AccessDecision::WrongPortal(role) => Some(role.dashboard_path()),
        }
    }
}

/// Decide whether `user` may enter a portal open to `allowed` roles.
pub fn authorize(user: Option<&SessionUser>, allowed: &[Role]) -> AccessDecision {
    match user {
        None => AccessDecision::SignInRequired,
        Some(user) if allowed.contains(&user.role) => AccessDecision::Allow,
        Some(user) => AccessDecision::WrongPortal(user.role),
    }
}

/// Fail with `Forbidden` unless `user` holds one of `allowed`.
pub fn require_role(user: Option<&SessionUser>, allowed: &[Role]) -> Result<(), ClientError> {
    match authorize(user, allowed) {
        AccessDecision::Allow => Ok(()),
        AccessDecision::SignInRequired => Err(ClientError::Auth("Sign-in required".to_string())),
        AccessDecision::WrongPortal(role) => Err(ClientError::Forbidden(format!(
            "Role {} may not perform this operation",
            role
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: Some(1),
            username: "u".to_string(),
            role,
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("FARMER"), Some(Role::Farmer));
        assert_eq!(Role::parse("ROLE_ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("buyer"), Some(Role::Buyer));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_authorize() {
        assert_eq!(
            authorize(None, &[Role::Farmer]),
            AccessDecision::SignInRequired
        );
        assert_eq!(
            authorize(Some(&user(Role::Farmer)), &[Role::Farmer]),
            AccessDecision::Allow
        );

        let decision = authorize(Some(&user(Role::Buyer)), &[Role::Farmer]);
        assert_eq!(decision, AccessDecision::WrongPortal(Role::Buyer));
        assert_eq!(decision.redirect().as_deref(), Some("/buyer/dashboard"));
        assert_eq!(
            AccessDecision::SignInRequired.redirect().as_deref(),
            Some("/signin")
        );
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(Some(&user(Role::Admin)), &[Role::Admin]).is_ok());
        assert!(matches!(
            require_role(Some(&user(Role::Farmer)), &[Role::Admin]),
            Err(ClientError::Forbidden(_))
        ));
        assert!(matches!(
            require_role(None, &[Role::Admin]),
            Err(ClientError::Auth(_))
        ));
    }
}
