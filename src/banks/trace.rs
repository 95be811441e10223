//! Observability hooks invoked at defined points of the bank update path.

use super::types::BankKind;

/// Immutable view of a bank's mutable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankSnapshot {
    /// Stored energy (J).
    pub e_stored_j: f64,
    /// Terminal voltage (V).
    pub v_bank_v: f64,
    /// State of charge (percent).
    pub soc_pct: f64,
}

/// Hook invoked by [`EnergyBank::update_state_traced`] at three points:
/// before the energy update, after the energy clamp, and after the state
/// recomputation. All methods default to no-ops so implementors override
/// only what they observe.
///
/// [`EnergyBank::update_state_traced`]: super::EnergyBank::update_state_traced
pub trait UpdateTrace {
    /// Called with the pre-update state and the update inputs.
    fn pre_update(&mut self, bank: BankKind, state: &BankSnapshot, current_a: f64, dt_s: f64) {
        let _ = (bank, state, current_a, dt_s);
    }

    /// Called after the stored-energy clamp with both candidate values (J).
    fn post_clamp(&mut self, bank: BankKind, unclamped_j: f64, clamped_j: f64) {
        let _ = (bank, unclamped_j, clamped_j);
    }

    /// Called with the final state after voltage and SoC recomputation.
    fn post_update(&mut self, bank: BankKind, state: &BankSnapshot) {
        let _ = (bank, state);
    }
}

/// Trace hook that observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl UpdateTrace for NoTrace {}

/// One recorded trace callback.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    PreUpdate {
        bank: BankKind,
        state: BankSnapshot,
        current_a: f64,
        dt_s: f64,
    },
    PostClamp {
        bank: BankKind,
        unclamped_j: f64,
        clamped_j: f64,
    },
    PostUpdate {
        bank: BankKind,
        state: BankSnapshot,
    },
}

/// Trace hook that records every callback, for tests and offline analysis.
#[derive(Debug, Default)]
pub struct RecordingTrace {
    /// Recorded callbacks in invocation order.
    pub events: Vec<TraceEvent>,
}

impl UpdateTrace for RecordingTrace {
    fn pre_update(&mut self, bank: BankKind, state: &BankSnapshot, current_a: f64, dt_s: f64) {
        self.events.push(TraceEvent::PreUpdate {
            bank,
            state: *state,
            current_a,
            dt_s,
        });
    }

    fn post_clamp(&mut self, bank: BankKind, unclamped_j: f64, clamped_j: f64) {
        self.events.push(TraceEvent::PostClamp {
            bank,
            unclamped_j,
            clamped_j,
        });
    }

    fn post_update(&mut self, bank: BankKind, state: &BankSnapshot) {
        self.events.push(TraceEvent::PostUpdate {
            bank,
            state: *state,
        });
    }
}
