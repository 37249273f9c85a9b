//! Gemeinsame Identifikations- und Zustandstypen fuer Zugang
//!
//! IDs verwenden das Newtype-Pattern, Rollen und Kontozustaende sind
//! geschlossene Enums.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stabile numerische Benutzer-ID (vergeben von der Datenbank)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Gibt den inneren Zahlenwert zurueck
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Unbekannter Rollenname
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unbekannte Rolle: {0}")]
pub struct UnbekannteRolle(pub String);

/// Rolle eines Kontos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rolle {
    #[serde(rename = "Administrator")]
    Administrator,
    /// Standardrolle wenn bei der Registrierung keine angegeben wurde
    #[default]
    #[serde(rename = "General")]
    Allgemein,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Allgemein => "General",
        }
    }
}

impl std::str::FromStr for Rolle {
    type Err = UnbekannteRolle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrator" => Ok(Self::Administrator),
            "General" => Ok(Self::Allgemein),
            other => Err(UnbekannteRolle(other.to_string())),
        }
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

/// Unbekannte Geschlechtsangabe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unbekanntes Geschlecht: {0}")]
pub struct UnbekanntesGeschlecht(pub String);

/// Geschlechtsangabe eines Kontos (Pflichtfeld bei der Registrierung)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geschlecht {
    #[serde(rename = "Male")]
    Maennlich,
    #[serde(rename = "Female")]
    Weiblich,
    #[serde(rename = "Unknown")]
    Unbekannt,
}

impl Geschlecht {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Maennlich => "Male",
            Self::Weiblich => "Female",
            Self::Unbekannt => "Unknown",
        }
    }
}

impl std::str::FromStr for Geschlecht {
    type Err = UnbekanntesGeschlecht;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Self::Maennlich),
            "Female" => Ok(Self::Weiblich),
            "Unknown" => Ok(Self::Unbekannt),
            other => Err(UnbekanntesGeschlecht(other.to_string())),
        }
    }
}

impl std::fmt::Display for Geschlecht {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

/// Zustand eines Kontos, abgeleitet aus `is_enable` und `is_active`
///
/// ```text
/// Ausstehend ──aktivieren──▶ Aktiv
///     │                        │
///     └──────deaktivieren──────┴──▶ Deaktiviert ──aktivieren──▶ Aktiv
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KontoZustand {
    /// Freigeschaltet, Initialpasswort noch nicht geaendert
    Ausstehend,
    /// Freigeschaltet und Passwort geaendert
    Aktiv,
    /// Gesperrt, unabhaengig von `is_active`
    Deaktiviert,
}

impl KontoZustand {
    /// Leitet den Zustand aus den beiden persistierten Flags ab
    pub fn aus_flags(is_enable: bool, is_active: bool) -> Self {
        match (is_enable, is_active) {
            (false, _) => Self::Deaktiviert,
            (true, false) => Self::Ausstehend,
            (true, true) => Self::Aktiv,
        }
    }

    /// Ob fuer dieses Konto ueberhaupt Tokens ausgestellt werden duerfen
    pub fn darf_token_erhalten(&self) -> bool {
        !matches!(self, Self::Deaktiviert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolle_standard_ist_allgemein() {
        assert_eq!(Rolle::default(), Rolle::Allgemein);
    }

    #[test]
    fn rolle_parsen() {
        assert_eq!("Administrator".parse::<Rolle>().unwrap(), Rolle::Administrator);
        assert_eq!("General".parse::<Rolle>().unwrap(), Rolle::Allgemein);
        assert!("general".parse::<Rolle>().is_err());
        assert!("Root".parse::<Rolle>().is_err());
    }

    #[test]
    fn rolle_serde_nutzt_externe_namen() {
        let json = serde_json::to_string(&Rolle::Allgemein).unwrap();
        assert_eq!(json, "\"General\"");
        let rolle: Rolle = serde_json::from_str("\"Administrator\"").unwrap();
        assert_eq!(rolle, Rolle::Administrator);
    }

    #[test]
    fn geschlecht_geschlossene_menge() {
        assert_eq!("Male".parse::<Geschlecht>().unwrap(), Geschlecht::Maennlich);
        assert_eq!("Female".parse::<Geschlecht>().unwrap(), Geschlecht::Weiblich);
        assert_eq!("Unknown".parse::<Geschlecht>().unwrap(), Geschlecht::Unbekannt);
        assert_eq!(
            "male".parse::<Geschlecht>(),
            Err(UnbekanntesGeschlecht("male".into()))
        );

        let json = serde_json::to_string(&Geschlecht::Unbekannt).unwrap();
        assert_eq!(json, "\"Unknown\"");
    }

    #[test]
    fn zustand_aus_flags() {
        assert_eq!(KontoZustand::aus_flags(true, false), KontoZustand::Ausstehend);
        assert_eq!(KontoZustand::aus_flags(true, true), KontoZustand::Aktiv);
        assert_eq!(KontoZustand::aus_flags(false, true), KontoZustand::Deaktiviert);
        assert_eq!(KontoZustand::aus_flags(false, false), KontoZustand::Deaktiviert);
    }

    #[test]
    fn nur_deaktivierte_konten_ohne_token() {
        assert!(KontoZustand::Ausstehend.darf_token_erhalten());
        assert!(KontoZustand::Aktiv.darf_token_erhalten());
        assert!(!KontoZustand::Deaktiviert.darf_token_erhalten());
    }

    #[test]
    fn user_id_display_und_serde() {
        let uid = UserId(42);
        assert_eq!(uid.to_string(), "user:42");
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "42");
        let uid2: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, uid2);
    }
}
