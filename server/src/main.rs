//! Zugang Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Dienst.

use anyhow::Result;
use zugang_observability::{logging_initialisieren, LogEinstellungen};
use zugang_server::{config::ServerConfig, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("AG_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ServerConfig::laden(&config_pfad)?;

    let logging = LogEinstellungen::aus_umgebung(&config.logging.level, &config.logging.format);
    logging_initialisieren(&logging).map_err(|e| anyhow::anyhow!("Logging-Setup: {e}"))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        backend = ?config.token.backend,
        "Zugang wird initialisiert"
    );

    let server = Server::neu(config, logging);
    server.starten().await?;

    Ok(())
}
