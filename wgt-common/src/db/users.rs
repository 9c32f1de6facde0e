//! User (player) database operations

use crate::types::{PlayerId, UserId};
use crate::Result;
use sqlx::SqlitePool;

/// Look up the store id for a player's username
pub async fn find_user_id(pool: &SqlitePool, username: &PlayerId) -> Result<Option<UserId>> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(id.map(UserId))
}

/// Insert a user unless the username already exists
///
/// Returns `true` when a new row was created.
pub async fn ensure_user(pool: &SqlitePool, username: &PlayerId, display_name: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, display_name)
        VALUES (?, ?)
        ON CONFLICT(username) DO NOTHING
        "#,
    )
    .bind(username.as_str())
    .bind(display_name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
