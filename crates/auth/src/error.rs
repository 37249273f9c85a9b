//! Fehlertypen fuer den Auth-Service
//!
//! Jede Variante gehoert zu genau einer [`FehlerKategorie`]. Die Kategorie
//! bestimmt, was der Aufrufer zu sehen bekommt: Autorisierungsfehler werden
//! nie unterschieden, Persistenzfehler nur intern protokolliert.

use thiserror::Error;
use zugang_db::DbError;

/// Meldung fuer alle Autorisierungsfehler nach aussen
pub const MELDUNG_NICHT_AUTORISIERT: &str = "Autorisierung fehlgeschlagen";

/// Meldung fuer alle Persistenz- und internen Fehler nach aussen
pub const MELDUNG_INTERN: &str = "Interner Fehler";

/// Grobe Einordnung eines Fehlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FehlerKategorie {
    /// Eingabe fehlerhaft, wird woertlich zurueckgegeben
    Validierung,
    /// Anmeldedaten, Konto- oder Token-Zustand, immer generisch
    Autorisierung,
    /// Konto existiert bereits
    Konflikt,
    /// Speicher nicht erreichbar oder fehlerhaft
    Persistenz,
    /// Sonstiger interner Fehler
    Intern,
}

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingabe ---
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Account ist ungueltig")]
    KontoUngueltig,

    #[error("Unbekannte Rolle: {0}")]
    UngueltigeRolle(String),

    #[error("Wechsel auf das gleiche Passwort ist nicht erlaubt")]
    GleichesPasswort,

    #[error("Passwort muss zuerst geaendert werden")]
    PasswortAenderungErforderlich,

    // --- Autorisierung ---
    #[error("Benutzername oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Autorisierung fehlgeschlagen")]
    NichtAutorisiert,

    #[error("Access-Token erforderlich")]
    TokenErforderlich,

    #[error("Access-Token ungueltig oder abgelaufen")]
    TokenUngueltig,

    // --- Konflikt ---
    #[error("Account existiert bereits: {0}")]
    KontoExistiert(String),

    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Speicher ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] DbError),

    #[error("Cache-Fehler: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Serialisierungsfehler: {0}")]
    Serialisierung(#[from] serde_json::Error),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn kategorie(&self) -> FehlerKategorie {
        match self {
            Self::UngueltigeEingabe(_)
            | Self::KontoUngueltig
            | Self::UngueltigeRolle(_)
            | Self::GleichesPasswort
            | Self::PasswortAenderungErforderlich => FehlerKategorie::Validierung,
            Self::UngueltigeAnmeldedaten
            | Self::NichtAutorisiert
            | Self::TokenErforderlich
            | Self::TokenUngueltig => FehlerKategorie::Autorisierung,
            Self::KontoExistiert(_) => FehlerKategorie::Konflikt,
            Self::Datenbank(_) | Self::Cache(_) | Self::Serialisierung(_) => {
                FehlerKategorie::Persistenz
            }
            Self::PasswortHashing(_) | Self::Intern(_) => FehlerKategorie::Intern,
        }
    }

    /// Die Meldung, die ein Aufrufer zu sehen bekommt
    ///
    /// Fehlendes Token bleibt unterscheidbar, weil es nichts ueber Konten
    /// oder Tokens verraet.
    pub fn oeffentliche_meldung(&self) -> String {
        match self.kategorie() {
            FehlerKategorie::Validierung | FehlerKategorie::Konflikt => self.to_string(),
            FehlerKategorie::Autorisierung => match self {
                Self::TokenErforderlich => self.to_string(),
                _ => MELDUNG_NICHT_AUTORISIERT.to_string(),
            },
            FehlerKategorie::Persistenz | FehlerKategorie::Intern => MELDUNG_INTERN.to_string(),
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
