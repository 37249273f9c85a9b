//! Erzeugung der Token-Werte
//!
//! Ein Token ist SHA-512/256 ueber Account-Name und Erstellungszeitpunkt
//! (millisekundengenau), hex-kodiert. Gleiche Eingaben ergeben denselben Wert;
//! Kollisionen werden nicht gesondert behandelt.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha512_256};

/// Laenge eines Token-Werts in Hex-Zeichen (256 Bit)
pub const TOKEN_LAENGE: usize = 64;

/// Erzeugt den Token-Wert fuer einen Account zum gegebenen Zeitpunkt
pub fn token_generieren(account: &str, zeitpunkt: DateTime<Utc>) -> String {
    let zeit = zeitpunkt.format("%Y%m%d%H%M%S%3f").to_string();

    let mut hasher = Sha512_256::new();
    hasher.update(account.as_bytes());
    hasher.update(zeit.as_bytes());
    hex::encode(hasher.finalize())
}

/// Kurzform fuer Logs; der volle Wert ist ein Bearer-Geheimnis
pub fn token_praefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}
