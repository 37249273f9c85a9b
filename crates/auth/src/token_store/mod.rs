//! Token-Store-Abstraktion
//!
//! Genau eine Implementierung ist pro Deployment aktiv; die Auswahl faellt
//! beim Start anhand der Konfiguration. Beide Implementierungen leiten Tokens
//! ueber [`token_ableiten`] identisch ab (gleiche TTL, gleicher Token-Wert),
//! damit Clients keinen Unterschied sehen.
//!
//! Bekannte Schwaeche: der Token-Wert ist Primaerschluessel und
//! Bearer-Geheimnis zugleich. Wer den Speicher lesen kann, kann Sessions
//! uebernehmen.

mod cache;
mod relational;

pub use cache::{CacheClient, CacheTokenStore};
pub use relational::RelationalTokenStore;

#[cfg(test)]
pub(crate) use cache::SpeicherCache;

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use zugang_db::models::{BenutzerRecord, TokenRecord};

use crate::error::{AuthError, AuthResult};
use crate::token_codec::token_generieren;

/// Standard-Lebensdauer eines Tokens: 10 Minuten
pub const STANDARD_TTL_SEKUNDEN: i64 = 600;

/// Gemeinsame Einstellungen beider Backends
#[derive(Debug, Clone)]
pub struct TokenEinstellungen {
    pub ttl: Duration,
    /// Kennung des ausstellenden Deployments, rein informativ
    pub environment: String,
}

impl Default for TokenEinstellungen {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(STANDARD_TTL_SEKUNDEN),
            environment: "debug".into(),
        }
    }
}

/// Baut einen neuen Token-Datensatz fuer ein Konto
///
/// Gesperrte Konten bekommen kein Token.
pub(crate) fn token_ableiten(
    benutzer: &BenutzerRecord,
    einstellungen: &TokenEinstellungen,
    jetzt: DateTime<Utc>,
) -> AuthResult<TokenRecord> {
    if !benutzer.zustand().darf_token_erhalten() {
        return Err(AuthError::NichtAutorisiert);
    }

    Ok(TokenRecord {
        token: token_generieren(&benutzer.account, jetzt),
        user_id: benutzer.id,
        environment: einstellungen.environment.clone(),
        created_at: jetzt,
        expired_at: jetzt + einstellungen.ttl,
    })
}

/// Speicher fuer Session-Tokens
///
/// Die Futures sind `Send`, damit der Reaper in einem eigenen Task laufen kann.
pub trait TokenStore: Send + Sync + 'static {
    /// Erzeugt und speichert ein neues Token fuer das Konto
    fn create(&self, benutzer: &BenutzerRecord)
        -> impl Future<Output = AuthResult<TokenRecord>> + Send;

    /// `Ok(None)` wenn das Token nicht existiert oder abgelaufen ist
    fn find(&self, token: &str) -> impl Future<Output = AuthResult<Option<TokenRecord>>> + Send;

    /// Idempotent: ein unbekanntes Token zu loeschen ist kein Fehler
    fn delete(&self, token: &str) -> impl Future<Output = AuthResult<()>> + Send;

    /// Entfernt alle abgelaufenen Tokens und gibt deren Anzahl zurueck
    fn delete_expired(&self) -> impl Future<Output = AuthResult<u64>> + Send;

    /// `true` wenn das Backend abgelaufene Tokens selbst entfernt
    fn can_auto_delete_expired(&self) -> bool;

    /// Kurzname fuer Logs und Statusausgaben
    fn bezeichnung(&self) -> &'static str;
}
