//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::errors::ErrorKind;
use tracing::warn;
use uuid::Uuid;

use crate::{AppState, error::AuthError};

/// Authenticated identity resolved from a bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

/// Extract and validate the JWT from the Authorization header, inserting the
/// authenticated identity into the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::TokenMissing)?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => {
                warn!("Token validation failed: {}", e);
                AuthError::TokenInvalid
            }
        })?;

    let user = AuthUser {
        id: claims.sub,
        email: claims.email,
        roles: claims.roles,
    };
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
