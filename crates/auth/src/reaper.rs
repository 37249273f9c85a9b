//! Periodisches Entfernen abgelaufener Tokens
//!
//! Laeuft nur fuer Backends, die Ablauf nicht selbst erledigen. Fehler
//! eines Durchlaufs werden geloggt, der naechste Tick versucht es erneut.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::token_store::TokenStore;

/// Standard-Intervall zwischen zwei Durchlaeufen
pub const STANDARD_INTERVALL: Duration = Duration::from_secs(60);

pub struct ExpiryReaper<T: TokenStore> {
    store: Arc<T>,
    intervall: Duration,
}

impl<T: TokenStore> ExpiryReaper<T> {
    pub fn neu(store: Arc<T>, intervall: Duration) -> Self {
        Self { store, intervall }
    }

    /// Ein einzelner Durchlauf; gibt die Anzahl entfernter Tokens zurueck
    pub async fn durchlauf(&self) -> u64 {
        match self.store.delete_expired().await {
            Ok(0) => 0,
            Ok(anzahl) => {
                tracing::info!(
                    anzahl,
                    backend = self.store.bezeichnung(),
                    "Abgelaufene Tokens entfernt"
                );
                anzahl
            }
            Err(e) => {
                tracing::error!(
                    fehler = %e,
                    backend = self.store.bezeichnung(),
                    "Entfernen abgelaufener Tokens fehlgeschlagen"
                );
                0
            }
        }
    }

    /// Startet den Reaper als eigenen Task
    ///
    /// Gibt `None` zurueck wenn das Backend selbst aufraeumt. Der Task endet,
    /// sobald `true` ueber den Shutdown-Kanal kommt oder der Sender gedroppt wird.
    pub fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        if self.store.can_auto_delete_expired() {
            tracing::debug!(
                backend = self.store.bezeichnung(),
                "Backend entfernt Tokens selbst, kein Reaper"
            );
            return None;
        }

        tracing::info!(
            intervall_sek = self.intervall.as_secs(),
            backend = self.store.bezeichnung(),
            "Token-Reaper gestartet"
        );

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.intervall);
            ticker.tick().await; // Ersten Tick ueberspringen

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.durchlauf().await;
                    }
                    ergebnis = shutdown_rx.changed() => {
                        if ergebnis.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Token-Reaper beendet");
        }))
    }
}
