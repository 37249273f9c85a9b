//! Passwort-Hashing mit Argon2id
//!
//! Stellt Hashing und zeitkonstante Verifikation mit einstellbaren Kosten
//! bereit. Argon2id ist der empfohlene Algorithmus gemaess OWASP-Richtlinien.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Argon2id-Kostenparameter
///
/// Standardwerte gemaess OWASP-Empfehlungen (Stand 2024):
/// - Speicher: 64 MiB
/// - Iterationen: 3
/// - Parallelismus: 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswortKosten {
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
}

impl Default for PasswortKosten {
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelitaet: 1,
        }
    }
}

impl PasswortKosten {
    /// Kleinste zulaessige Kosten, nur fuer Tests gedacht
    pub fn minimal() -> Self {
        Self {
            speicher_kib: Params::MIN_M_COST,
            iterationen: Params::MIN_T_COST,
            parallelitaet: Params::MIN_P_COST,
        }
    }
}

/// Hasht und verifiziert Passwoerter
///
/// Haelt zusaetzlich einen Dummy-Hash, gegen den verifiziert wird wenn kein
/// Konto existiert. So dauert "unbekannter Account" genauso lange wie
/// "falsches Passwort".
#[derive(Clone)]
pub struct PasswortHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl std::fmt::Debug for PasswortHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswortHasher").finish_non_exhaustive()
    }
}

impl PasswortHasher {
    pub fn neu(kosten: PasswortKosten) -> AuthResult<Self> {
        let params = Params::new(
            kosten.speicher_kib,
            kosten.iterationen,
            kosten.parallelitaet,
            None, // output_len: Standard (32 Bytes)
        )
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltige Argon2-Parameter: {e}")))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hashen("zugang-dummy-passwort")?;
        Ok(hasher)
    }

    /// Hasht ein Passwort mit einem zufaelligen Salt
    ///
    /// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
    pub fn hashen(&self, klartext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(klartext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    /// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
    ///
    /// Die Parameter werden aus dem Hash gelesen, aeltere Hashes mit anderen
    /// Kosten bleiben also pruefbar. Stimmt das Passwort nicht, kommt
    /// `AuthError::UngueltigeAnmeldedaten`.
    pub fn verifizieren(&self, hash: &str, klartext: &str) -> AuthResult<()> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

        match self.argon2.verify_password(klartext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(AuthError::UngueltigeAnmeldedaten),
            Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
        }
    }

    /// Verbraucht die Zeit einer echten Verifikation, ohne Ergebnis
    pub fn verifizieren_ohne_konto(&self, klartext: &str) {
        let _ = self.verifizieren(&self.dummy_hash, klartext);
    }
}
