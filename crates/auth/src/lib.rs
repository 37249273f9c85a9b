//! zugang-auth – Konten, Passwoerter und Session-Tokens
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Die Konto-Zustandsmaschine (Ausstehend, Aktiv, Deaktiviert)
//! - Token-Erzeugung und zwei austauschbare Token-Stores (SQLite, Redis)
//! - Den Reaper fuer abgelaufene Tokens
//! - AuthService (Registrierung, Aktivierung, Anmeldung, Abmeldung, Token-Pruefung)

pub mod error;
pub mod konto;
pub mod password;
pub mod reaper;
pub mod service;
pub mod token_codec;
pub mod token_store;
pub mod uhr;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult, FehlerKategorie};
pub use konto::{NeuesKonto, Registrierung};
pub use password::{PasswortHasher, PasswortKosten};
pub use reaper::ExpiryReaper;
pub use service::{token_aus_header, AuthService};
pub use token_store::{
    CacheClient, CacheTokenStore, RelationalTokenStore, TokenEinstellungen, TokenStore,
};
pub use uhr::{SystemUhr, Uhr};
