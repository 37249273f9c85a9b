//! zugang-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Passwort-Hasher, Token-Store und Reaper und haelt
//! den Dienst bis zum Shutdown-Signal am Laufen.

pub mod config;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::watch;
use zugang_auth::{
    AuthService, CacheTokenStore, ExpiryReaper, PasswortHasher, RelationalTokenStore, TokenStore,
};
use zugang_db::SqliteDb;
use zugang_observability::LogEinstellungen;

use config::{ServerConfig, TokenBackend};

/// Statusbericht des Dienstes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DienstZustand {
    pub status: &'static str,
    pub environment: String,
    pub log_level: String,
    pub zeitzone: &'static str,
    pub token_backend: &'static str,
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    pub logging: LogEinstellungen,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig, logging: LogEinstellungen) -> Self {
        Self { config, logging }
    }

    /// Zustand fuer ein gegebenes Token-Backend
    pub fn zustand(&self, token_backend: &'static str) -> DienstZustand {
        DienstZustand {
            status: "Active",
            environment: self.config.dienst.environment.clone(),
            log_level: self.logging.level.clone(),
            // Alle Zeitstempel sind UTC
            zeitzone: "UTC",
            token_backend,
        }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Passwort-Hasher aufbauen
    /// 3. Token-Store laut Konfiguration waehlen
    /// 4. Reaper starten (nur wenn der Store nicht selbst aufraeumt)
    /// 5. Auf Ctrl-C warten, dann Reaper geordnet stoppen
    pub async fn starten(self) -> Result<()> {
        let db = SqliteDb::oeffnen(&self.config.datenbank_config()).await?;
        let hasher = Arc::new(PasswortHasher::neu(self.config.passwort_kosten())?);
        let einstellungen = self.config.token_einstellungen();

        match self.config.token.backend {
            TokenBackend::Relational => {
                let store = RelationalTokenStore::neu(db.clone(), einstellungen);
                let dienst = AuthService::neu(Arc::new(db), Arc::new(store), hasher);
                self.betreiben(dienst).await
            }
            TokenBackend::Cache => {
                let client = redis::Client::open(self.config.cache.url.as_str())?;
                let manager = client.get_connection_manager().await?;
                tracing::info!(url = %self.config.cache.url, "Redis-Verbindung hergestellt");

                let store = CacheTokenStore::neu(manager, einstellungen);
                let dienst = AuthService::neu(Arc::new(db), Arc::new(store), hasher);
                self.betreiben(dienst).await
            }
        }
    }

    async fn betreiben<T: TokenStore>(&self, dienst: AuthService<SqliteDb, T>) -> Result<()> {
        let zustand = self.zustand(dienst.backend());
        tracing::info!(
            status = zustand.status,
            environment = %zustand.environment,
            log_level = %zustand.log_level,
            zeitzone = zustand.zeitzone,
            token_backend = zustand.token_backend,
            ttl_sek = self.config.token.ttl_sekunden,
            "Dienst bereit"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reaper = ExpiryReaper::neu(dienst.token_store(), self.config.reaper_intervall())
            .starten(shutdown_rx);

        tracing::info!("Dienst laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Dienst wird beendet");

        let _ = shutdown_tx.send(true);
        if let Some(handle) = reaper {
            if let Err(e) = handle.await {
                tracing::error!(fehler = %e, "Reaper-Task nicht sauber beendet");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zustand_meldet_konfiguration() {
        let mut config = ServerConfig::default();
        config.dienst.environment = "production".into();
        let logging = LogEinstellungen {
            level: "warn".into(),
            ..Default::default()
        };

        let z = Server::neu(config, logging).zustand("cache");
        assert_eq!(
            z,
            DienstZustand {
                status: "Active",
                environment: "production".into(),
                log_level: "warn".into(),
                zeitzone: "UTC",
                token_backend: "cache",
            }
        );
    }

    #[test]
    fn zustand_als_json() {
        let z = Server::neu(ServerConfig::default(), LogEinstellungen::default())
            .zustand("relational");
        let json = serde_json::to_value(&z).unwrap();
        assert_eq!(json["status"], "Active");
        assert_eq!(json["logLevel"], "info");
        assert_eq!(json["tokenBackend"], "relational");
    }
}
