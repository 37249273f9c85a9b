//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Implementiert werden die Traits von
//! [`crate::SqliteDb`].

use chrono::{DateTime, Utc};
use zugang_core::UserId;

use crate::error::DbError;
use crate::models::{BenutzerRecord, BenutzerUpdate, NeuerBenutzer, TokenRecord};

/// Result-Alias fuer Datenbankoperationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://zugang.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://zugang.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Benutzer-Datenzugriffe
#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    /// Legt einen neuen Benutzer an (freigeschaltet, nicht aktiv)
    ///
    /// Ein bereits vergebener Account-Name liefert `DbError::Eindeutigkeit`.
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    /// Prueft ob ein Account-Name bereits vergeben ist
    async fn exists(&self, account: &str) -> DbResult<bool>;

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>>;

    async fn get_by_account(&self, account: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Aendert nur die gesetzten Felder
    async fn update(&self, id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord>;

    /// Setzt den Zeitpunkt der letzten erfolgreichen Authentifizierung
    async fn update_last_authenticated(&self, id: UserId, zeitpunkt: DateTime<Utc>)
        -> DbResult<()>;
}

/// Repository fuer Session-Tokens in einem Speicher ohne natives TTL
///
/// Alle zeitabhaengigen Abfragen bekommen `jetzt` explizit uebergeben.
#[allow(async_fn_in_trait)]
pub trait TokenRepository: Send + Sync {
    async fn insert(&self, token: &TokenRecord) -> DbResult<()>;

    /// Laedt einen Token nur wenn `jetzt < expired_at`
    async fn find_valid(&self, token: &str, jetzt: DateTime<Utc>)
        -> DbResult<Option<TokenRecord>>;

    /// Loescht einen Token; gibt die Anzahl geloeschter Zeilen zurueck (0 oder 1)
    async fn delete(&self, token: &str) -> DbResult<u64>;

    /// Loescht alle Tokens mit `expired_at < jetzt`
    async fn delete_expired(&self, jetzt: DateTime<Utc>) -> DbResult<u64>;
}
