//! Fehlertypen fuer das Datenbank-Crate
//!
//! Constraint-Verletzungen werden an genau einer Stelle aus dem
//! Datenbankfehler klassifiziert ([`From<sqlx::Error>`]), damit Aufrufer
//! nur noch auf Varianten matchen.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0} nicht gefunden")]
    NichtGefunden(String),

    /// UNIQUE- oder PRIMARY-KEY-Verletzung
    #[error("Bereits vorhanden: {0}")]
    Eindeutigkeit(String),

    #[error("Verweis ins Leere: {0}")]
    Fremdschluessel(String),

    /// Gespeicherter Wert laesst sich nicht in den Domain-Typ umwandeln
    #[error("Ungueltiger Wert in Spalte '{spalte}': {grund}")]
    UngueltigerWert { spalte: &'static str, grund: String },

    #[error("SQLite: {0}")]
    Sqlx(#[source] sqlx::Error),

    #[error("Migration: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        let Some(db_fehler) = e.as_database_error() else {
            return Self::Sqlx(e);
        };

        if db_fehler.is_unique_violation() {
            Self::Eindeutigkeit(db_fehler.message().to_string())
        } else if db_fehler.is_foreign_key_violation() {
            Self::Fremdschluessel(db_fehler.message().to_string())
        } else {
            Self::Sqlx(e)
        }
    }
}

impl DbError {
    pub fn nicht_gefunden(was: impl Into<String>) -> Self {
        Self::NichtGefunden(was.into())
    }

    pub fn ungueltiger_wert(spalte: &'static str, grund: impl ToString) -> Self {
        Self::UngueltigerWert {
            spalte,
            grund: grund.to_string(),
        }
    }

    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::Eindeutigkeit(_))
    }
}
