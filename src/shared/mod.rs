//! Geteilte Konfiguration für layer-übergreifende Verträge.
//!
//! Enthält Typen, die zwischen `app` und den Tools geteilt werden,
//! um direkte Abhängigkeiten zu vermeiden.

pub mod options;

pub use options::{CoordinationOptions, SyncChaining};
