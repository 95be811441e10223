//! Energy-storage bank models for hybrid power-system simulation.

/// Unified bank state model (battery and supercapacitor variants).
pub mod bank;
/// Observability hooks for the bank update path.
pub mod trace;
pub mod types;

// Re-export the main types for convenience
pub use bank::EnergyBank;
pub use trace::{BankSnapshot, NoTrace, RecordingTrace, TraceEvent, UpdateTrace};
pub use types::{BankKind, BankParams, BankUpdate};
