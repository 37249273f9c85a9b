//! Structured Logging Setup via tracing-subscriber
//!
//! Die Werte aus der Konfigurationsdatei lassen sich per Umgebungsvariable
//! ueberschreiben:
//! - `AG_LOG_LEVEL`: Filter-Direktive (trace/debug/info/warn/error oder
//!   `zugang_auth=debug,info`), Standard: info
//! - `AG_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Token-Werte werden nie vollstaendig geloggt, nur ihr Praefix.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const ENV_LOG_LEVEL: &str = "AG_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "AG_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            andere => Err(format!("Unbekanntes Log-Format: {andere}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Effektive Logging-Einstellungen nach Aufloesung der Umgebung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEinstellungen {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl LogEinstellungen {
    /// Liest `AG_LOG_LEVEL` und `AG_LOG_FORMAT`, sonst die Konfigurationswerte
    pub fn aus_umgebung(level: &str, format: &str) -> Self {
        Self::aufloesen(
            std::env::var(ENV_LOG_LEVEL).ok(),
            std::env::var(ENV_LOG_FORMAT).ok(),
            level,
            format,
        )
    }

    fn aufloesen(
        env_level: Option<String>,
        env_format: Option<String>,
        level: &str,
        format: &str,
    ) -> Self {
        let level = env_level
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| level.to_string());

        // Unbekannte Formate fallen auf Text zurueck
        let format = env_format
            .as_deref()
            .unwrap_or(format)
            .parse()
            .unwrap_or_default();

        Self { level, format }
    }
}

/// Initialisiert das Logging-System
///
/// Ein ungueltiger Level faellt auf `info` zurueck. Schlaegt fehl, wenn
/// bereits ein globaler Subscriber gesetzt ist.
pub fn logging_initialisieren(
    einstellungen: &LogEinstellungen,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter =
        EnvFilter::try_new(&einstellungen.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match einstellungen.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    }
}
