//! Datenbankmodelle fuer Zugang
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Domain-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zugang_core::{Geschlecht, KontoZustand, Rolle, UserId};

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
///
/// Der Passwort-Hash und die Zustandsflags werden nie serialisiert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenutzerRecord {
    pub id: UserId,
    pub account: String,
    pub name: String,
    pub mail_address: Option<String>,
    pub sex: Geschlecht,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Rolle,
    #[serde(skip)]
    pub is_active: bool,
    #[serde(skip)]
    pub is_enable: bool,
    #[serde(skip)]
    pub last_authenticated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl BenutzerRecord {
    /// Aktueller Zustand in der Konto-Zustandsmaschine
    pub fn zustand(&self) -> KontoZustand {
        KontoZustand::aus_flags(self.is_enable, self.is_active)
    }
}

/// Daten zum Erstellen eines neuen Benutzers
///
/// Neue Konten sind immer freigeschaltet, aber noch nicht aktiv.
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub account: &'a str,
    pub name: &'a str,
    pub mail_address: Option<&'a str>,
    pub sex: Geschlecht,
    pub password_hash: &'a str,
    pub role: Rolle,
}

/// Daten zum Aktualisieren eines Benutzers
#[derive(Debug, Clone, Default)]
pub struct BenutzerUpdate {
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub is_enable: Option<bool>,
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Session-Token-Datensatz
///
/// Der Token-Wert ist zugleich Primaerschluessel und Bearer-Geheimnis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(rename = "accessToken")]
    pub token: String,
    pub user_id: UserId,
    pub environment: String,
    pub created_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Gueltig genau dann wenn `jetzt < expired_at`
    pub fn ist_gueltig_zu(&self, jetzt: DateTime<Utc>) -> bool {
        jetzt < self.expired_at
    }
}
