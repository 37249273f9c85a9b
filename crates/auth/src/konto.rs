//! Konto-Zustandsmaschine und Registrierungsdaten
//!
//! Die Zustaende selbst ([`KontoZustand`]) leben in `zugang-core`; hier stehen
//! die Uebergaenge und Eingabepruefungen, die der Service vor jeder
//! Zustandsaenderung ausfuehrt.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use zugang_core::{Geschlecht, KontoZustand, Rolle, UserId};
use zugang_db::models::BenutzerRecord;

use crate::error::{AuthError, AuthResult};

pub const ACCOUNT_MIN_LAENGE: usize = 6;
pub const ACCOUNT_MAX_LAENGE: usize = 10;
pub const NAME_MAX_LAENGE: usize = 50;
pub const PASSWORT_MIN_LAENGE: usize = 8;
pub const EINMALPASSWORT_LAENGE: usize = 16;

/// Daten fuer eine Registrierung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuesKonto {
    pub account: String,
    pub name: String,
    #[serde(default)]
    pub mail_address: Option<String>,
    /// Pflichtfeld: "Male", "Female" oder "Unknown"
    pub sex: String,
    /// Fehlt die Rolle, wird `General` vergeben
    #[serde(default)]
    pub role: Option<String>,
}

impl NeuesKonto {
    /// Prueft die Formularfelder und liefert das aufgeloeste Geschlecht
    ///
    /// Die Rolle wird erst nach der Dublettenpruefung aufgeloest, siehe [`Self::rolle`].
    pub fn pruefen(&self) -> AuthResult<Geschlecht> {
        account_pruefen(&self.account)?;

        let name_laenge = self.name.chars().count();
        if name_laenge == 0 || name_laenge > NAME_MAX_LAENGE {
            return Err(AuthError::UngueltigeEingabe(format!(
                "name muss 1 bis {NAME_MAX_LAENGE} Zeichen lang sein"
            )));
        }

        if let Some(mail) = self.mail_address.as_deref() {
            if !mail.contains('@') {
                return Err(AuthError::UngueltigeEingabe(
                    "mailAddress ist keine gueltige Adresse".into(),
                ));
            }
        }

        self.sex
            .parse::<Geschlecht>()
            .map_err(|e| AuthError::UngueltigeEingabe(e.to_string()))
    }

    /// Aufgeloeste Rolle; fehlt sie, gilt `General`
    pub fn rolle(&self) -> AuthResult<Rolle> {
        match self.role.as_deref() {
            None | Some("") => Ok(Rolle::default()),
            Some(r) => r
                .parse()
                .map_err(|_| AuthError::UngueltigeRolle(r.to_string())),
        }
    }
}

/// Ergebnis einer Registrierung
///
/// Das Einmalpasswort wird genau hier einmal im Klartext herausgegeben und
/// sonst nirgends gespeichert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrierung {
    pub user_id: UserId,
    #[serde(rename = "password")]
    pub einmalpasswort: String,
}

pub fn account_pruefen(account: &str) -> AuthResult<()> {
    let laenge = account.chars().count();
    if !(ACCOUNT_MIN_LAENGE..=ACCOUNT_MAX_LAENGE).contains(&laenge) {
        return Err(AuthError::KontoUngueltig);
    }
    Ok(())
}

pub fn passwort_eingabe_pruefen(passwort: &str) -> AuthResult<()> {
    if passwort.chars().count() < PASSWORT_MIN_LAENGE {
        return Err(AuthError::UngueltigeEingabe(format!(
            "Passwort muss mindestens {PASSWORT_MIN_LAENGE} Zeichen lang sein"
        )));
    }
    Ok(())
}

/// Erzeugt das systemvergebene Initialpasswort
pub fn einmalpasswort_erzeugen() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(EINMALPASSWORT_LAENGE)
        .map(char::from)
        .collect()
}

/// Waechter vor jeder Anmeldung: nur aktive Konten
///
/// Ausstehende Konten bekommen einen eigenen Fehler, gesperrte nur den
/// generischen.
pub fn anmeldung_zulassen(benutzer: &BenutzerRecord) -> AuthResult<()> {
    match benutzer.zustand() {
        KontoZustand::Aktiv => Ok(()),
        KontoZustand::Ausstehend => Err(AuthError::PasswortAenderungErforderlich),
        KontoZustand::Deaktiviert => Err(AuthError::NichtAutorisiert),
    }
}

/// Vorbedingung fuer den Uebergang nach `Aktiv`, ohne Datenbankzugriff
pub fn aktivierung_pruefen(altes_passwort: &str, neues_passwort: &str) -> AuthResult<()> {
    if altes_passwort == neues_passwort {
        return Err(AuthError::GleichesPasswort);
    }
    passwort_eingabe_pruefen(neues_passwort)
}
