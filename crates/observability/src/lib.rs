//! # zugang-observability
//!
//! Structured Logging fuer Zugang via tracing-subscriber (Text oder JSON).

pub mod logging;

pub use logging::{logging_initialisieren, LogEinstellungen, LogFormat};
