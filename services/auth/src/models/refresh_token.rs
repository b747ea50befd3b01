//! Refresh token model and session projections

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Refresh token entity
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_revoked: bool,
}

impl RefreshToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// A token is valid iff it is not revoked and not expired
    pub fn is_valid(&self) -> bool {
        !self.is_revoked && !self.is_expired()
    }
}

/// New refresh token creation payload
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Session projection listed by the sessions endpoint; the token string
/// itself is never exposed
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<&RefreshToken> for SessionResponse {
    fn from(token: &RefreshToken) -> Self {
        Self {
            id: token.id,
            created_at: token.created_at,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
            ip_address: token.ip_address.clone(),
            user_agent: token.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>, is_revoked: bool) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "rt_test".to_string(),
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
            ip_address: None,
            user_agent: None,
            is_revoked,
        }
    }

    #[test]
    fn test_unexpired_unrevoked_token_is_valid() {
        assert!(token(Utc::now() + Duration::days(7), false).is_valid());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        assert!(!token(Utc::now() - Duration::seconds(1), false).is_valid());
    }

    #[test]
    fn test_revoked_token_is_invalid() {
        assert!(!token(Utc::now() + Duration::days(7), true).is_valid());
    }

    #[test]
    fn test_session_response_hides_token_string() {
        let json =
            serde_json::to_value(SessionResponse::from(&token(Utc::now(), false))).unwrap();
        assert!(json.get("token").is_none());
    }
}
