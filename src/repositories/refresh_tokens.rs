use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::RefreshToken;

const TOKEN_COLUMNS: &str = "id, token, user_id, expires_at, created_at";

pub async fn create(
    pool: &PgPool,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<RefreshToken, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(&format!(
        "INSERT INTO refresh_tokens (id, token, user_id, expires_at) VALUES ($1, $2, $3, $4) RETURNING {}",
        TOKEN_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(&format!(
        "SELECT {} FROM refresh_tokens WHERE token = $1",
        TOKEN_COLUMNS
    ))
    .bind(token)
    .fetch_optional(pool)
    .await
}

/// Deletes `token` if it belongs to `user_id`. Returns the number of rows removed.
pub async fn delete_for_user(pool: &PgPool, token: &str, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1 AND user_id = $2")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Replaces the row `old_id` with a new token for the same user, atomically.
///
/// Returns `None` when `old_id` was already gone (e.g. a concurrent logout
/// or refresh won the race); nothing is inserted in that case.
pub async fn rotate(
    pool: &PgPool,
    old_id: Uuid,
    user_id: Uuid,
    new_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Option<RefreshToken>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
        .bind(old_id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let created = sqlx::query_as::<_, RefreshToken>(&format!(
        "INSERT INTO refresh_tokens (id, token, user_id, expires_at) VALUES ($1, $2, $3, $4) RETURNING {}",
        TOKEN_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(new_token)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(created))
}
