//! Zeitquelle fuer Ablaufberechnungen
//!
//! Stores und Service lesen die Zeit nur ueber [`Uhr`], damit Tests den
//! Ablauf von Tokens ohne Warten pruefen koennen.

use chrono::{DateTime, Utc};

pub trait Uhr: Send + Sync + 'static {
    fn jetzt(&self) -> DateTime<Utc>;
}

/// Systemzeit
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUhr;

impl Uhr for SystemUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) use test_uhr::TestUhr;
