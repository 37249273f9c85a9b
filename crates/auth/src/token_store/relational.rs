//! Token-Store auf SQLite
//!
//! Abgelaufene Zeilen bleiben bis zum naechsten Reaper-Lauf liegen, werden
//! beim Lesen aber schon ausgeblendet.

use std::sync::Arc;

use zugang_db::{models::BenutzerRecord, models::TokenRecord, SqliteDb, TokenRepository};

use super::{token_ableiten, TokenEinstellungen, TokenStore};
use crate::error::AuthResult;
use crate::token_codec::token_praefix;
use crate::uhr::{SystemUhr, Uhr};

pub struct RelationalTokenStore {
    db: SqliteDb,
    einstellungen: TokenEinstellungen,
    uhr: Arc<dyn Uhr>,
}

impl RelationalTokenStore {
    pub fn neu(db: SqliteDb, einstellungen: TokenEinstellungen) -> Self {
        Self::mit_uhr(db, einstellungen, Arc::new(SystemUhr))
    }

    pub fn mit_uhr(db: SqliteDb, einstellungen: TokenEinstellungen, uhr: Arc<dyn Uhr>) -> Self {
        Self {
            db,
            einstellungen,
            uhr,
        }
    }
}

impl TokenStore for RelationalTokenStore {
    async fn create(&self, benutzer: &BenutzerRecord) -> AuthResult<TokenRecord> {
        let token = token_ableiten(benutzer, &self.einstellungen, self.uhr.jetzt())?;
        TokenRepository::insert(&self.db, &token).await?;

        tracing::debug!(
            user_id = %token.user_id,
            token_praefix = %token_praefix(&token.token),
            "Token in der Datenbank angelegt"
        );
        Ok(token)
    }

    async fn find(&self, token: &str) -> AuthResult<Option<TokenRecord>> {
        Ok(TokenRepository::find_valid(&self.db, token, self.uhr.jetzt()).await?)
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        TokenRepository::delete(&self.db, token).await?;
        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        Ok(TokenRepository::delete_expired(&self.db, self.uhr.jetzt()).await?)
    }

    fn can_auto_delete_expired(&self) -> bool {
        false
    }

    fn bezeichnung(&self) -> &'static str {
        "relational"
    }
}
