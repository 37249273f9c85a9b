//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod pool;
pub mod tokens;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DbError;
use crate::repository::DbResult;

/// Zeitstempel als RFC3339 mit fester Breite (Millisekunden, `Z`)
///
/// Die feste Breite haelt lexikografische Vergleiche in SQL korrekt.
pub(crate) fn zeitstempel(zeit: &DateTime<Utc>) -> String {
    zeit.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn zeit_parsen(wert: &str, spalte: &'static str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::ungueltiger_wert(spalte, format!("'{wert}': {e}")))
}
