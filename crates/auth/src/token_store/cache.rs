//! Token-Store auf einem Key-Value-Cache (Redis)
//!
//! Jedes Token liegt als JSON unter einem eigenen Schluessel mit TTL. Der
//! Cache verwirft abgelaufene Eintraege selbst, ein Reaper ist unnoetig.

use std::future::Future;
use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use zugang_db::models::{BenutzerRecord, TokenRecord};

use super::{token_ableiten, TokenEinstellungen, TokenStore};
use crate::error::AuthResult;
use crate::token_codec::token_praefix;
use crate::uhr::{SystemUhr, Uhr};

const SCHLUESSEL_PRAEFIX: &str = "zugang:token:";

/// Minimale Schnittstelle zum Cache
pub trait CacheClient: Send + Sync + 'static {
    fn setzen_mit_ablauf(
        &self,
        schluessel: &str,
        wert: Vec<u8>,
        ttl_sekunden: u64,
    ) -> impl Future<Output = AuthResult<()>> + Send;

    fn holen(&self, schluessel: &str) -> impl Future<Output = AuthResult<Option<Vec<u8>>>> + Send;

    fn loeschen(&self, schluessel: &str) -> impl Future<Output = AuthResult<()>> + Send;
}

// ConnectionManager ist billig zu klonen und verbindet sich selbst neu
impl CacheClient for ConnectionManager {
    async fn setzen_mit_ablauf(
        &self,
        schluessel: &str,
        wert: Vec<u8>,
        ttl_sekunden: u64,
    ) -> AuthResult<()> {
        let mut con = self.clone();
        con.set_ex::<_, _, ()>(schluessel, wert, ttl_sekunden).await?;
        Ok(())
    }

    async fn holen(&self, schluessel: &str) -> AuthResult<Option<Vec<u8>>> {
        let mut con = self.clone();
        Ok(con.get(schluessel).await?)
    }

    async fn loeschen(&self, schluessel: &str) -> AuthResult<()> {
        let mut con = self.clone();
        con.del::<_, ()>(schluessel).await?;
        Ok(())
    }
}

pub struct CacheTokenStore<C: CacheClient> {
    cache: C,
    einstellungen: TokenEinstellungen,
    uhr: Arc<dyn Uhr>,
}

impl<C: CacheClient> CacheTokenStore<C> {
    pub fn neu(cache: C, einstellungen: TokenEinstellungen) -> Self {
        Self::mit_uhr(cache, einstellungen, Arc::new(SystemUhr))
    }

    pub fn mit_uhr(cache: C, einstellungen: TokenEinstellungen, uhr: Arc<dyn Uhr>) -> Self {
        Self {
            cache,
            einstellungen,
            uhr,
        }
    }

    fn schluessel(token: &str) -> String {
        format!("{SCHLUESSEL_PRAEFIX}{token}")
    }

    fn ttl_sekunden(&self) -> u64 {
        // SETEX lehnt 0 ab
        self.einstellungen.ttl.num_seconds().max(1) as u64
    }
}

impl<C: CacheClient> TokenStore for CacheTokenStore<C> {
    async fn create(&self, benutzer: &BenutzerRecord) -> AuthResult<TokenRecord> {
        let token = token_ableiten(benutzer, &self.einstellungen, self.uhr.jetzt())?;
        let wert = serde_json::to_vec(&token)?;

        self.cache
            .setzen_mit_ablauf(&Self::schluessel(&token.token), wert, self.ttl_sekunden())
            .await?;

        tracing::debug!(
            user_id = %token.user_id,
            token_praefix = %token_praefix(&token.token),
            "Token im Cache angelegt"
        );
        Ok(token)
    }

    async fn find(&self, token: &str) -> AuthResult<Option<TokenRecord>> {
        let Some(wert) = self.cache.holen(&Self::schluessel(token)).await? else {
            return Ok(None);
        };

        let record: TokenRecord = serde_json::from_slice(&wert)?;
        // Die Cache-TTL ist nur sekundengenau
        if !record.ist_gueltig_zu(self.uhr.jetzt()) {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        self.cache.loeschen(&Self::schluessel(token)).await
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        Ok(0)
    }

    fn can_auto_delete_expired(&self) -> bool {
        true
    }

    fn bezeichnung(&self) -> &'static str {
        "cache"
    }
}

#[cfg(test)]
pub(crate) use speicher::SpeicherCache;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::uhr::TestUhr;
    use chrono::{Duration, Utc};
    use zugang_core::{Geschlecht, Rolle, UserId};

    fn benutzer() -> BenutzerRecord {
        benutzer_mit_freigabe(true)
    }

    fn benutzer_mit_freigabe(is_enable: bool) -> BenutzerRecord {
        BenutzerRecord {
            id: UserId(1),
            account: "cacheuser".into(),
            name: "Cache".into(),
            mail_address: None,
            sex: Geschlecht::Unbekannt,
            password_hash: String::new(),
            role: Rolle::Allgemein,
            is_active: true,
            is_enable,
            last_authenticated_at: None,
            created_at: Utc::now(),
        }
    }

    fn aufbau() -> (CacheTokenStore<SpeicherCache>, SpeicherCache, Arc<TestUhr>) {
        let uhr = TestUhr::neu(Utc::now());
        let cache = SpeicherCache::neu(uhr.clone());
        let store =
            CacheTokenStore::mit_uhr(cache.clone(), TokenEinstellungen::default(), uhr.clone());
        (store, cache, uhr)
    }

    #[tokio::test]
    async fn erstellen_und_finden() {
        let (store, cache, _uhr) = aufbau();
        let token = store.create(&benutzer()).await.unwrap();

        assert_eq!(cache.anzahl().await, 1);
        let gefunden = store.find(&token.token).await.unwrap().unwrap();
        assert_eq!(gefunden, token);
    }

    #[tokio::test]
    async fn gesperrtes_konto_bekommt_kein_token() {
        let (store, cache, _uhr) = aufbau();

        let f = store.create(&benutzer_mit_freigabe(false)).await.unwrap_err();
        assert!(matches!(f, crate::error::AuthError::NichtAutorisiert));
        assert_eq!(cache.anzahl().await, 0);
    }

    #[tokio::test]
    async fn cache_verwirft_abgelaufene_tokens() {
        let (store, cache, uhr) = aufbau();
        let token = store.create(&benutzer()).await.unwrap();

        uhr.vorstellen(Duration::seconds(601));
        assert!(store.find(&token.token).await.unwrap().is_none());
        assert_eq!(cache.anzahl().await, 0);
    }

    #[tokio::test]
    async fn loeschen_und_reaper_noop() {
        let (store, _cache, _uhr) = aufbau();
        let token = store.create(&benutzer()).await.unwrap();

        store.delete(&token.token).await.unwrap();
        store.delete(&token.token).await.unwrap();
        assert!(store.find(&token.token).await.unwrap().is_none());

        assert!(store.can_auto_delete_expired());
        assert_eq!(store.delete_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unlesbarer_eintrag_ist_persistenzfehler() {
        let (store, cache, _uhr) = aufbau();
        cache
            .setzen_mit_ablauf("zugang:token:kaputt", b"kein json".to_vec(), 60)
            .await
            .unwrap();

        let f = store.find("kaputt").await.unwrap_err();
        assert_eq!(f.kategorie(), crate::error::FehlerKategorie::Persistenz);
    }

    /// Braucht einen laufenden Redis: `REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn gegen_echten_redis() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into());
        let client = redis::Client::open(url).unwrap();
        let manager = client.get_connection_manager().await.unwrap();
        let store = CacheTokenStore::neu(manager, TokenEinstellungen::default());

        let token = store.create(&benutzer()).await.unwrap();
        assert_eq!(store.find(&token.token).await.unwrap(), Some(token.clone()));
        store.delete(&token.token).await.unwrap();
        assert!(store.find(&token.token).await.unwrap().is_none());
    }
}
