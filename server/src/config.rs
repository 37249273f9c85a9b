//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Dienst ohne Konfigurationsdatei
//! lauffaehig ist (relationales Token-Backend, lokale SQLite-Datei).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zugang_auth::{reaper::STANDARD_INTERVALL, token_store::STANDARD_TTL_SEKUNDEN};
use zugang_auth::{PasswortKosten, TokenEinstellungen};
use zugang_db::DatabaseConfig;

/// Obergrenze fuer `token.ttl_sekunden` (30 Tage)
pub const MAX_TTL_SEKUNDEN: u64 = 30 * 24 * 60 * 60;

/// Obergrenze fuer `token.reaper_intervall_sekunden` (1 Tag)
pub const MAX_REAPER_INTERVALL_SEKUNDEN: u64 = 24 * 60 * 60;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub dienst: DienstEinstellungen,
    pub datenbank: DatenbankEinstellungen,
    pub token: TokenKonfig,
    pub cache: CacheEinstellungen,
    pub passwort: PasswortEinstellungen,
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Dienst-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DienstEinstellungen {
    /// Kennung des Deployments, landet in jedem Token
    pub environment: String,
}

impl Default for DienstEinstellungen {
    fn default() -> Self {
        Self {
            environment: "debug".into(),
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    pub url: String,
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let standard = DatabaseConfig::default();
        Self {
            url: standard.url,
            max_verbindungen: standard.max_verbindungen,
            sqlite_wal: standard.sqlite_wal,
        }
    }
}

/// Welcher Token-Store aktiv ist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// SQLite, braucht den Reaper
    #[default]
    Relational,
    /// Redis mit nativer TTL
    Cache,
}

/// Token-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenKonfig {
    pub backend: TokenBackend,
    pub ttl_sekunden: u64,
    pub reaper_intervall_sekunden: u64,
}

impl Default for TokenKonfig {
    fn default() -> Self {
        Self {
            backend: TokenBackend::Relational,
            ttl_sekunden: STANDARD_TTL_SEKUNDEN as u64,
            reaper_intervall_sekunden: STANDARD_INTERVALL.as_secs(),
        }
    }
}

/// Cache-Einstellungen (nur fuer `backend = "cache"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEinstellungen {
    pub url: String,
}

impl Default for CacheEinstellungen {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/".into(),
        }
    }
}

/// Argon2-Kosten
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswortEinstellungen {
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
}

impl Default for PasswortEinstellungen {
    fn default() -> Self {
        let standard = PasswortKosten::default();
        Self {
            speicher_kib: standard.speicher_kib,
            iterationen: standard.iterationen,
            parallelitaet: standard.parallelitaet,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Filter-Direktive, z.B. "info" oder "zugang_auth=debug,info"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Logging ist hier noch nicht initialisiert
                eprintln!("Konfigurationsdatei '{pfad}' nicht gefunden, verwende Standardwerte");
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.pruefen()?;
        Ok(config)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if self.token.ttl_sekunden == 0 {
            anyhow::bail!("token.ttl_sekunden muss groesser als 0 sein");
        }
        if self.token.ttl_sekunden > MAX_TTL_SEKUNDEN {
            anyhow::bail!(
                "token.ttl_sekunden darf hoechstens {MAX_TTL_SEKUNDEN} sein, ist {}",
                self.token.ttl_sekunden
            );
        }
        if self.token.reaper_intervall_sekunden == 0 {
            anyhow::bail!("token.reaper_intervall_sekunden muss groesser als 0 sein");
        }
        if self.token.reaper_intervall_sekunden > MAX_REAPER_INTERVALL_SEKUNDEN {
            anyhow::bail!(
                "token.reaper_intervall_sekunden darf hoechstens {MAX_REAPER_INTERVALL_SEKUNDEN} sein, ist {}",
                self.token.reaper_intervall_sekunden
            );
        }
        if self.token.backend == TokenBackend::Cache && self.cache.url.trim().is_empty() {
            anyhow::bail!("cache.url fehlt, ist aber fuer backend = \"cache\" noetig");
        }
        Ok(())
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
        }
    }

    pub fn token_einstellungen(&self) -> TokenEinstellungen {
        TokenEinstellungen {
            ttl: chrono::Duration::seconds(self.token.ttl_sekunden as i64),
            environment: self.dienst.environment.clone(),
        }
    }

    pub fn reaper_intervall(&self) -> Duration {
        Duration::from_secs(self.token.reaper_intervall_sekunden)
    }

    pub fn passwort_kosten(&self) -> PasswortKosten {
        PasswortKosten {
            speicher_kib: self.passwort.speicher_kib,
            iterationen: self.passwort.iterationen,
            parallelitaet: self.passwort.parallelitaet,
        }
    }
}
