//! zugang-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! Zugang-Crates gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{Geschlecht, KontoZustand, Rolle, UnbekannteRolle, UnbekanntesGeschlecht, UserId};
