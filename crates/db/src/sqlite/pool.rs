//! SQLite-Connection-Pool
//!
//! Datei- und In-Memory-Datenbanken entstehen aus derselben
//! [`DatabaseConfig`]; Fremdschluessel sind immer eingeschaltet.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::repository::{DatabaseConfig, DbResult};

#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

impl SqliteDb {
    /// Oeffnet (oder erstellt) die Datenbank und bringt das Schema auf Stand
    pub async fn oeffnen(config: &DatabaseConfig) -> DbResult<Self> {
        let db = Self {
            pool: pool_aufbauen(config).await?,
        };
        tracing::info!(
            url = %config.url,
            wal = config.sqlite_wal,
            max_verbindungen = config.max_verbindungen,
            "SQLite-Pool geoeffnet"
        );

        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    /// Private In-Memory-Datenbank mit aktuellem Schema
    pub async fn in_memory() -> DbResult<Self> {
        // Jede Verbindung saehe sonst ihre eigene leere Datenbank
        let config = DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_verbindungen: 1,
            sqlite_wal: false,
        };
        let db = Self {
            pool: pool_aufbauen(&config).await?,
        };
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    pub async fn migrationen_ausfuehren(&self) -> DbResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::debug!("Datenbank-Schema aktuell");
        Ok(())
    }

    /// Direkter Pool-Zugriff fuer Tests und Diagnose
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn verbindungsoptionen(config: &DatabaseConfig) -> DbResult<SqliteConnectOptions> {
    let journal = if config.sqlite_wal {
        SqliteJournalMode::Wal
    } else {
        SqliteJournalMode::Delete
    };

    Ok(SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(journal)
        .foreign_keys(true))
}

async fn pool_aufbauen(config: &DatabaseConfig) -> DbResult<SqlitePool> {
    let max = config.max_verbindungen.max(1);
    let pool = SqlitePoolOptions::new()
        .max_connections(max)
        // In-Memory lebt nur solange eine Verbindung offen ist
        .min_connections(1)
        .connect_with(verbindungsoptionen(config)?)
        .await?;
    Ok(pool)
}
