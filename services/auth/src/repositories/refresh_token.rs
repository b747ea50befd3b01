//! Refresh token repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewRefreshToken, RefreshToken};

/// Refresh token repository
#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new refresh token
    pub async fn create(&self, new_token: &NewRefreshToken) -> Result<RefreshToken> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_token (id, user_id, token, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, token, created_at, expires_at, last_used_at,
                      ip_address, user_agent, is_revoked
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .bind(new_token.expires_at)
        .bind(&new_token.ip_address)
        .bind(&new_token.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Find a valid token by its value: unrevoked and unexpired only
    pub async fn find_valid(&self, token: &str) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token, created_at, expires_at, last_used_at,
                   ip_address, user_agent, is_revoked
            FROM refresh_token
            WHERE token = $1 AND is_revoked = FALSE AND expires_at > $2
            "#,
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// List a user's active tokens, most recent first
    pub async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>> {
        let tokens = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token, created_at, expires_at, last_used_at,
                   ip_address, user_agent, is_revoked
            FROM refresh_token
            WHERE user_id = $1 AND is_revoked = FALSE AND expires_at > $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    /// Stamp a token's last use
    pub async fn touch_last_used(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE refresh_token SET last_used_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Revoke a token by its value
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE refresh_token SET is_revoked = TRUE WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke one of a user's tokens by id; false when the token does not
    /// exist or belongs to another user
    pub async fn revoke_by_id(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_token
            SET is_revoked = TRUE
            WHERE id = $1 AND user_id = $2 AND is_revoked = FALSE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke all of a user's active tokens, returning the count
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_token
            SET is_revoked = TRUE
            WHERE user_id = $1 AND is_revoked = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired or revoked tokens (on-demand sweep)
    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_token WHERE expires_at < $1 OR is_revoked = TRUE")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        info!("Deleted {} expired or revoked refresh tokens", deleted);
        Ok(deleted)
    }

    /// Count a user's active tokens
    pub async fn count_active_for_user(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM refresh_token
            WHERE user_id = $1 AND is_revoked = FALSE AND expires_at > $2
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
