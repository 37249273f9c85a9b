//! SQLite-Implementierung des TokenRepository
//!
//! SQLite kennt kein natives Ablaufdatum pro Zeile. Abgelaufene Tokens bleiben
//! liegen bis `delete_expired` sie entfernt; `find_valid` blendet sie vorher aus.

use chrono::{DateTime, Utc};
use zugang_core::UserId;

use crate::models::TokenRecord;
use crate::repository::{DbResult, TokenRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{zeit_parsen, zeitstempel};

impl TokenRepository for SqliteDb {
    async fn insert(&self, token: &TokenRecord) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO tokens (token, user_id, environment, created_at, expired_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&token.token)
        .bind(token.user_id.inner())
        .bind(&token.environment)
        .bind(zeitstempel(&token.created_at))
        .bind(zeitstempel(&token.expired_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_valid(&self, token: &str, jetzt: DateTime<Utc>) -> DbResult<Option<TokenRecord>> {
        let row = sqlx::query(
            "SELECT token, user_id, environment, created_at, expired_at
             FROM tokens
             WHERE token = ? AND expired_at > ?",
        )
        .bind(token)
        .bind(zeitstempel(&jetzt))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_token(&r)).transpose()
    }

    async fn delete(&self, token: &str) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn delete_expired(&self, jetzt: DateTime<Utc>) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM tokens WHERE expired_at < ?")
            .bind(zeitstempel(&jetzt))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }
}

fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> DbResult<TokenRecord> {
    use sqlx::Row as _;

    let created_at_str: String = row.try_get("created_at")?;
    let expired_at_str: String = row.try_get("expired_at")?;

    Ok(TokenRecord {
        token: row.try_get("token")?,
        user_id: UserId(row.try_get("user_id")?),
        environment: row.try_get("environment")?,
        created_at: zeit_parsen(&created_at_str, "created_at")?,
        expired_at: zeit_parsen(&expired_at_str, "expired_at")?,
    })
}
