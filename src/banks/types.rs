//! Bank variant tags, configuration records, and update outputs.

use serde::{Deserialize, Serialize};

/// Per-cell current rating of the supercapacitor variant (A).
pub const SUPERCAP_CELL_CURRENT_A: f64 = 280.0;

/// Default discharge C-rate of the battery variant. The cell rating is
/// `BATTERY_C_RATE * C` amps for a capacity of `C` amp-hours.
pub const BATTERY_C_RATE: f64 = 6.0;

/// Storage-bank variant selector.
///
/// Both variants share the same state-transition contract and differ in
/// their energy–voltage coupling (capacitance vs. capacity semantics of
/// `c`) and their default constants (cell current rating, SoC bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankKind {
    /// Supercapacitor bank: `c` in farads, capacitor energy–voltage
    /// coupling, high cell current, voltage floored at half nominal
    /// (25 % of energy).
    Supercapacitor,
    /// Battery bank: `c` in amp-hours, capacity energy semantics at the
    /// nominal stack voltage, current rating derived from the cell C-rate.
    Battery,
}

impl BankKind {
    /// Human-readable label used in traces and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Supercapacitor => "Supercapacitor",
            Self::Battery => "Battery",
        }
    }

    /// Default minimum state of charge (percent).
    pub fn default_soc_min_pct(&self) -> f64 {
        match self {
            Self::Supercapacitor => 25.0,
            Self::Battery => 0.0,
        }
    }

    /// Default maximum state of charge (percent).
    pub fn default_soc_max_pct(&self) -> f64 {
        100.0
    }

    /// Default per-cell current rating (A) for a cell of size `c`
    /// (farads for the supercapacitor, amp-hours for the battery).
    pub fn default_cell_current_a(&self, c: f64) -> f64 {
        match self {
            Self::Supercapacitor => SUPERCAP_CELL_CURRENT_A,
            Self::Battery => BATTERY_C_RATE * c,
        }
    }
}

/// Complete configuration record for one bank.
///
/// This is the handoff format between the sizing engine, the TOML scenario
/// sections, and [`EnergyBank::configure`](super::EnergyBank::configure).
///
/// `c` is the per-cell capacitance in farads for the supercapacitor
/// variant and the per-cell capacity in amp-hours for the battery variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankParams {
    /// Per-cell capacitance (F) or capacity (Ah).
    pub c: f64,
    /// Cells in series per string.
    pub ns: u32,
    /// Parallel strings.
    pub np: u32,
    /// Modules in series.
    pub nm: u32,
    /// Nominal per-cell voltage (V).
    pub vnom: f64,
    /// Initial state of charge (percent).
    pub soc_init_pct: f64,
    /// Minimum allowed state of charge (percent).
    pub soc_min_pct: f64,
    /// Maximum allowed state of charge (percent).
    pub soc_max_pct: f64,
    /// Per-cell current rating (A).
    pub i_cell_max_a: f64,
}

impl BankParams {
    /// Builds a parameter record with the variant defaults for SoC bounds
    /// and cell current rating filled in.
    pub fn for_kind(
        kind: BankKind,
        c: f64,
        ns: u32,
        np: u32,
        nm: u32,
        vnom: f64,
        soc_init_pct: f64,
    ) -> Self {
        Self {
            c,
            ns,
            np,
            nm,
            vnom,
            soc_init_pct,
            soc_min_pct: kind.default_soc_min_pct(),
            soc_max_pct: kind.default_soc_max_pct(),
            i_cell_max_a: kind.default_cell_current_a(c),
        }
    }
}

/// Output of one bank state update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankUpdate {
    /// State of charge after the update (percent).
    pub soc_pct: f64,
    /// Bank terminal voltage after the update (V).
    pub v_bank_v: f64,
    /// Power the energy clamp refused this step (kW; positive = could not
    /// supply, negative = could not absorb).
    pub rejected_kw: f64,
}
