//! zugang-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern fuer Benutzer und Session-Tokens
//! bereit. Die Implementierung basiert auf SQLite (sqlx, WAL-Modus) mit
//! eingebetteten Migrationen.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{DatabaseConfig, DbResult, TokenRepository, UserRepository};
pub use sqlite::SqliteDb;
