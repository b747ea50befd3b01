//! Custom error types for the authentication service
//!
//! Every failure is rendered through the uniform envelope
//! `{"success": false, "message": …}` (+ `"erreurs"` for validation), so
//! nothing propagates to the transport as an unhandled fault.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Custom error type for authentication failures
#[derive(Error, Debug)]
pub enum AuthError {
    /// Per-field validation failures, all collected
    #[error("Erreurs de validation")]
    Validation(HashMap<String, String>),

    /// Malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Uniform credentials failure; unknown email and wrong password are
    /// deliberately indistinguishable
    #[error("Identifiants invalides")]
    InvalidCredentials,

    /// No bearer token presented
    #[error("Token manquant")]
    TokenMissing,

    /// Malformed or badly signed token
    #[error("Token invalide")]
    TokenInvalid,

    /// Token past its expiry, signature notwithstanding
    #[error("Token expiré")]
    TokenExpired,

    /// Token references a user that no longer exists
    #[error("Utilisateur non trouvé")]
    UserNotFound,

    /// Refresh token unknown, revoked or expired
    #[error("Refresh token invalide ou expiré, veuillez vous reconnecter")]
    RefreshRejected,

    /// Duplicate email at registration
    #[error("Un utilisateur avec cet email existe déjà")]
    EmailConflict,

    /// Session to revoke is absent or belongs to another user
    #[error("Session non trouvée")]
    SessionNotFound,

    /// Too many login attempts for one account
    #[error("Trop de tentatives, veuillez réessayer plus tard")]
    RateLimited,

    /// Unexpected internal failure; detail stays in the server logs
    #[error("Une erreur interne est survenue")]
    Internal,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::TokenMissing
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::UserNotFound
            | AuthError::RefreshRejected => StatusCode::UNAUTHORIZED,
            AuthError::EmailConflict => StatusCode::CONFLICT,
            AuthError::SessionNotFound => StatusCode::NOT_FOUND,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });

        if let AuthError::Validation(erreurs) = &self {
            body["erreurs"] = json!(erreurs);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation(HashMap::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::EmailConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::SessionNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_credential_failures_share_one_message() {
        // Both failure causes map onto the same variant, so the responses
        // for unknown email and wrong password are byte-identical.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Identifiants invalides"
        );
    }
}
