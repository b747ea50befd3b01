//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    error::AuthError,
    jwt,
    middleware::{AuthUser, auth_middleware},
    models::{LoginRequest, NewRefreshToken, NewUser, RegisterRequest, SessionResponse, User, UserResponse},
    validation,
};

/// Request body for token refresh
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Response carrying a fresh token pair
#[derive(Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: u64,
    pub user: UserResponse,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/me", get(me))
        .route("/api/logout", post(logout))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/purge", post(purge_sessions))
        .route("/api/sessions/:id", delete(revoke_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/login_check", post(login))
        .route("/api/refresh-token", post(refresh_token))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) =
        payload.map_err(|_| AuthError::BadRequest("Format JSON invalide".to_string()))?;

    let erreurs = validation::validate_registration(&payload);
    if !erreurs.is_empty() {
        return Err(AuthError::Validation(erreurs));
    }

    let new_user = NewUser::new(
        payload.email.as_deref().unwrap_or_default(),
        payload.nom.as_deref().unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
        payload.roles.unwrap_or_default(),
    );

    let existing = state
        .user_repository
        .find_by_email(&new_user.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user by email: {}", e);
            AuthError::Internal
        })?;
    if existing.is_some() {
        return Err(AuthError::EmailConflict);
    }

    let user = state.user_repository.create(&new_user).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        AuthError::Internal
    })?;

    info!("User registered: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Utilisateur créé avec succès",
            "user": UserResponse::from(&user),
        })),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) =
        payload.map_err(|_| AuthError::BadRequest("Format JSON invalide".to_string()))?;

    let erreurs = validation::validate_login(&payload);
    if !erreurs.is_empty() {
        return Err(AuthError::Validation(erreurs));
    }

    let email = payload
        .email
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if !state.rate_limiter.is_allowed(&email).await.map_err(|e| {
        error!("Rate limiter failure: {}", e);
        AuthError::Internal
    })? {
        return Err(AuthError::RateLimited);
    }

    // Unknown email and wrong password fall through to the same error so the
    // response never reveals which one failed
    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user by email: {}", e);
            AuthError::Internal
        })?
        .ok_or(AuthError::InvalidCredentials)?;

    let password_valid = state
        .user_repository
        .verify_password(&user, payload.password.as_deref().unwrap_or_default())
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            AuthError::Internal
        })?;
    if !password_valid {
        return Err(AuthError::InvalidCredentials);
    }

    state.rate_limiter.reset(&email).await;
    info!("Login successful for {}", user.email);

    let response = issue_token_pair(&state, &user, &headers, "Connexion réussie").await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Current identity endpoint
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to look up user by id: {}", e);
            AuthError::Internal
        })?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(json!({
        "success": true,
        "user": UserResponse::from(&user),
    })))
}

/// Refresh token endpoint: validates the opaque token against storage and
/// rotates it
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) =
        payload.map_err(|_| AuthError::BadRequest("Format JSON invalide".to_string()))?;

    let token = payload
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::BadRequest("Le refresh token est obligatoire".to_string()))?;

    // Shape check before any storage lookup
    if !jwt::is_refresh_token_shape(token) {
        return Err(AuthError::BadRequest(
            "Format de refresh token invalide".to_string(),
        ));
    }

    let stored = state
        .refresh_token_repository
        .find_valid(token)
        .await
        .map_err(|e| {
            error!("Failed to look up refresh token: {}", e);
            AuthError::Internal
        })?
        .ok_or(AuthError::RefreshRejected)?;

    let user = state
        .user_repository
        .find_by_id(stored.user_id)
        .await
        .map_err(|e| {
            error!("Failed to look up user by id: {}", e);
            AuthError::Internal
        })?
        .ok_or(AuthError::RefreshRejected)?;

    // Rotation: the old token is superseded before the new pair is issued
    state
        .refresh_token_repository
        .touch_last_used(stored.id)
        .await
        .map_err(|e| {
            error!("Failed to stamp refresh token use: {}", e);
            AuthError::Internal
        })?;
    state
        .refresh_token_repository
        .revoke(&stored.token)
        .await
        .map_err(|e| {
            error!("Failed to revoke refresh token: {}", e);
            AuthError::Internal
        })?;

    let response = issue_token_pair(&state, &user, &headers, "Token rafraîchi avec succès").await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Logout endpoint: revokes the caller's refresh tokens; the access token
/// itself cannot be revoked server-side and self-expires
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let revoked = state
        .refresh_token_repository
        .revoke_all_for_user(auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to revoke refresh tokens: {}", e);
            AuthError::Internal
        })?;

    info!("Logout for {}: {} refresh tokens revoked", auth_user.email, revoked);

    Ok(Json(json!({
        "success": true,
        "message": "Déconnexion réussie. Supprimez le token côté client, il expirera automatiquement.",
        "revoked_sessions": revoked,
    })))
}

/// List the caller's active sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let tokens = state
        .refresh_token_repository
        .find_active_by_user(auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to list sessions: {}", e);
            AuthError::Internal
        })?;

    let sessions: Vec<SessionResponse> = tokens.iter().map(SessionResponse::from).collect();
    let count = sessions.len();

    Ok(Json(json!({
        "success": true,
        "data": sessions,
        "count": count,
    })))
}

/// Revoke one of the caller's sessions
pub async fn revoke_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let revoked = state
        .refresh_token_repository
        .revoke_by_id(id, auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to revoke session: {}", e);
            AuthError::Internal
        })?;

    if !revoked {
        return Err(AuthError::SessionNotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Session révoquée avec succès",
    })))
}

/// On-demand sweep deleting expired or revoked refresh tokens
pub async fn purge_sessions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuthError> {
    let deleted = state
        .refresh_token_repository
        .delete_expired()
        .await
        .map_err(|e| {
            error!("Failed to purge refresh tokens: {}", e);
            AuthError::Internal
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Nettoyage des sessions effectué",
        "deleted": deleted,
    })))
}

/// Issue a signed access token and a persisted refresh token for a user
async fn issue_token_pair(
    state: &AppState,
    user: &User,
    headers: &HeaderMap,
    message: &str,
) -> Result<TokenResponse, AuthError> {
    let (token, expires_at) = state.jwt_service.generate_access_token(user).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        AuthError::Internal
    })?;

    let new_refresh = NewRefreshToken {
        user_id: user.id,
        token: jwt::generate_refresh_token(),
        expires_at: Utc::now() + Duration::seconds(state.jwt_service.refresh_token_expiry() as i64),
        ip_address: client_ip(headers),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.chars().take(500).collect()),
    };

    let refresh = state
        .refresh_token_repository
        .create(&new_refresh)
        .await
        .map_err(|e| {
            error!("Failed to persist refresh token: {}", e);
            AuthError::Internal
        })?;

    Ok(TokenResponse {
        success: true,
        message: message.to_string(),
        token,
        refresh_token: refresh.token,
        expires_at,
        user: UserResponse::from(user),
    })
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), Some("10.0.0.1".to_string()));
    }

    #[test]
    fn test_client_ip_absent_header() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
