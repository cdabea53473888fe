//! Authentication endpoints. None of these retry on 401.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    IntrospectResult, ResetPasswordRequest, SignInRequest, SignInResult, SignUpRequest,
    SignUpResult, TokenRequest,
};

/// POST /api/v1/auth/sign-in - Exchange credentials for a token.
pub async fn sign_in(
    client: &ApiClient,
    request: &SignInRequest,
) -> Result<SignInResult, ClientError> {
    let result: SignInResult = client.post("/auth/sign-in", request).await?;
    if !result.authenticated {
        return Err(ClientError::Auth("Invalid username or password".to_string()));
    }
    Ok(result)
}

/// POST /api/v1/auth/sign-up - Register a buyer or farmer.
pub async fn sign_up(
    client: &ApiClient,
    request: &SignUpRequest,
) -> Result<SignUpResult, ClientError> {
    client.post("/auth/sign-up", request).await
}

/// POST /api/v1/auth/sign-out - Revoke a token.
pub async fn sign_out(client: &ApiClient, token: &str) -> Result<(), ClientError> {
    client
        .post_unit(
            "/auth/sign-out",
            &TokenRequest {
                token: token.to_string(),
            },
        )
        .await
}

/// POST /api/v1/auth/reset-password - Set a new password.
pub async fn reset_password(
    client: &ApiClient,
    request: &ResetPasswordRequest,
) -> Result<(), ClientError> {
    client.post_unit("/auth/reset-password", request).await
}

/// POST /api/v1/auth/introspect - Ask the backend whether a token is still active.
pub async fn introspect(client: &ApiClient, token: &str) -> Result<IntrospectResult, ClientError> {
    client
        .post(
            "/auth/introspect",
            &TokenRequest {
                token: token.to_string(),
            },
        )
        .await
}
