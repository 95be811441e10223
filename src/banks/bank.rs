//! Unified energy-storage bank model.

use crate::error::ModelError;

use super::trace::{BankSnapshot, NoTrace, UpdateTrace};
use super::types::{BankKind, BankParams, BankUpdate};

/// An energy-storage bank: cells arranged in series (`ns`), parallel
/// strings (`np`), and series modules (`nm`), addressed as one electrical
/// source/sink.
///
/// Both variants ([`BankKind::Battery`], [`BankKind::Supercapacitor`])
/// share one state-transition contract. The only mutable state is the
/// stored energy; terminal voltage and state of charge are always
/// recomputed from it. The energy–voltage coupling is the per-variant
/// difference (`c` is farads for the supercapacitor, amp-hours for the
/// battery):
///
/// - supercapacitor: `c_eq = c * np / (ns * nm)`,
///   `e_total = 0.5 * c_eq * (vnom * ns * nm)^2`,
///   `v_bank = sqrt(2 * e_stored / c_eq)`
/// - battery: `e_total = np * c * (vnom * ns * nm)` watt-hours (stored in
///   joules); `v_bank` is held at the nominal stack voltage
/// - both: `soc = 100 * e_stored / e_total`
///
/// # Sign Convention (discharge-positive)
/// - Positive current/power: load — energy leaving the bank
/// - Negative current/power: charge — energy entering the bank
///
/// Requested power beyond the current rating or the SoC window is reported
/// back as rejected power, never silently dropped or silently satisfied.
#[derive(Debug, Clone)]
pub struct EnergyBank {
    kind: BankKind,
    params: BankParams,
    /// Equivalent bank capacitance (F); drives the supercapacitor
    /// energy–voltage coupling.
    c_eq_f: f64,
    /// Total addressable energy (J).
    e_total_j: f64,
    /// Stored energy (J), clamped to the SoC window at all times.
    e_stored_j: f64,
    /// Terminal voltage (V), derived from `e_stored_j`.
    v_bank_v: f64,
    /// State of charge (percent), derived from `e_stored_j`.
    soc_pct: f64,
}

impl EnergyBank {
    /// Builds a bank from a validated parameter record.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if any physical quantity is
    /// non-positive or non-finite, if the SoC bounds leave `[0, 100]` or
    /// are inverted, or if `soc_init_pct` lies outside the bounds. Fails
    /// before any state is built.
    pub fn configure(kind: BankKind, params: BankParams) -> Result<Self, ModelError> {
        Self::validate(&params)?;

        let mut bank = Self {
            kind,
            params,
            c_eq_f: 0.0,
            e_total_j: 0.0,
            e_stored_j: 0.0,
            v_bank_v: 0.0,
            soc_pct: 0.0,
        };
        bank.recompute_derived();
        Ok(bank)
    }

    /// Replaces the configuration and resets the state to `soc_init_pct`.
    ///
    /// # Errors
    ///
    /// Same contract as [`EnergyBank::configure`]; on error the previous
    /// configuration and state are left untouched.
    pub fn reconfigure(&mut self, params: BankParams) -> Result<(), ModelError> {
        Self::validate(&params)?;
        self.params = params;
        self.recompute_derived();
        Ok(())
    }

    fn validate(p: &BankParams) -> Result<(), ModelError> {
        if !(p.c.is_finite() && p.c > 0.0) {
            return Err(ModelError::parameter("c", "must be a positive finite number"));
        }
        if p.ns == 0 {
            return Err(ModelError::parameter("ns", "must be > 0"));
        }
        if p.np == 0 {
            return Err(ModelError::parameter("np", "must be > 0"));
        }
        if p.nm == 0 {
            return Err(ModelError::parameter("nm", "must be > 0"));
        }
        if !(p.vnom.is_finite() && p.vnom > 0.0) {
            return Err(ModelError::parameter(
                "vnom",
                "must be a positive finite number",
            ));
        }
        if !(p.i_cell_max_a.is_finite() && p.i_cell_max_a > 0.0) {
            return Err(ModelError::parameter(
                "i_cell_max_a",
                "must be a positive finite number",
            ));
        }
        if !(p.soc_min_pct.is_finite() && (0.0..=100.0).contains(&p.soc_min_pct)) {
            return Err(ModelError::parameter("soc_min_pct", "must be in [0, 100]"));
        }
        if !(p.soc_max_pct.is_finite() && (0.0..=100.0).contains(&p.soc_max_pct)) {
            return Err(ModelError::parameter("soc_max_pct", "must be in [0, 100]"));
        }
        if p.soc_min_pct >= p.soc_max_pct {
            return Err(ModelError::parameter(
                "soc_min_pct",
                "must be < soc_max_pct",
            ));
        }
        if !(p.soc_init_pct.is_finite()
            && p.soc_init_pct >= p.soc_min_pct
            && p.soc_init_pct <= p.soc_max_pct)
        {
            return Err(ModelError::parameter(
                "soc_init_pct",
                "must be within [soc_min_pct, soc_max_pct]",
            ));
        }
        Ok(())
    }

    /// Recomputes the cached quantities and resets the state from
    /// `soc_init_pct`. Only called with validated parameters.
    fn recompute_derived(&mut self) {
        let p = &self.params;
        let series_cells = f64::from(p.ns) * f64::from(p.nm);
        self.c_eq_f = p.c * f64::from(p.np) / series_cells;
        let v_total = p.vnom * series_cells;
        self.e_total_j = match self.kind {
            // Capacitor energy: 0.5 * C_eq * V².
            BankKind::Supercapacitor => 0.5 * self.c_eq_f * v_total * v_total,
            // Capacity energy: Np parallel cells of C amp-hours at the
            // nominal stack voltage, converted from Wh to J.
            BankKind::Battery => f64::from(p.np) * p.c * v_total * 3600.0,
        };
        self.e_stored_j = p.soc_init_pct / 100.0 * self.e_total_j;
        self.refresh_state();
    }

    /// Recomputes voltage and SoC from the stored energy.
    fn refresh_state(&mut self) {
        self.soc_pct = 100.0 * self.e_stored_j / self.e_total_j;
        self.v_bank_v = match self.kind {
            BankKind::Supercapacitor => (2.0 * self.e_stored_j / self.c_eq_f).sqrt(),
            // Constant-voltage battery model: the terminal stays at the
            // nominal stack voltage across the SoC window.
            BankKind::Battery => {
                let p = &self.params;
                p.vnom * f64::from(p.ns) * f64::from(p.nm)
            }
        };
    }

    /// Terminal current for a requested power, saturated to the bank
    /// current rating.
    ///
    /// Returns `(current_a, rejected_kw)`: the saturated current and the
    /// portion of the request the current limiter refused. Discharge
    /// convention: positive power draws positive current.
    ///
    /// A bank at zero voltage cannot convert power to current and rejects
    /// the whole request.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] for a non-finite power request.
    pub fn compute_current(&self, power_kw: f64) -> Result<(f64, f64), ModelError> {
        if !power_kw.is_finite() {
            return Err(ModelError::input("power_kw", power_kw));
        }
        if self.v_bank_v <= 0.0 {
            return Ok((0.0, power_kw));
        }

        let current_a = power_kw * 1000.0 / self.v_bank_v;
        let i_max = self.i_max_a();
        let saturated_a = current_a.clamp(-i_max, i_max);
        let rejected_kw = (current_a - saturated_a) * self.v_bank_v / 1000.0;
        Ok((saturated_a, rejected_kw))
    }

    /// Applies a terminal current for `dt_s` seconds.
    ///
    /// Discharge-positive: `energy_variation = -v_bank * current * dt`.
    /// The new stored energy is clamped to the SoC window; the refused
    /// portion comes back as `rejected_kw`, signed like the unserved
    /// demand (positive = could not supply, negative = could not absorb),
    /// matching the [`EnergyBank::compute_current`] rejection sign. Zero
    /// current is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] for a non-finite current or a
    /// non-positive/non-finite dt. State is untouched on error.
    pub fn update_state(&mut self, current_a: f64, dt_s: f64) -> Result<BankUpdate, ModelError> {
        self.update_state_traced(current_a, dt_s, &mut NoTrace)
    }

    /// [`EnergyBank::update_state`] with an observability hook invoked
    /// pre-update, post-clamp, and post-update.
    pub fn update_state_traced(
        &mut self,
        current_a: f64,
        dt_s: f64,
        trace: &mut dyn UpdateTrace,
    ) -> Result<BankUpdate, ModelError> {
        if !current_a.is_finite() {
            return Err(ModelError::input("current_a", current_a));
        }
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return Err(ModelError::input("dt_s", dt_s));
        }

        trace.pre_update(self.kind, &self.snapshot(), current_a, dt_s);

        let energy_variation = -self.v_bank_v * current_a * dt_s;
        let unclamped = self.e_stored_j + energy_variation;
        let clamped = unclamped.clamp(self.e_min_j(), self.e_max_j());
        trace.post_clamp(self.kind, unclamped, clamped);

        // Energy the clamp refused, expressed as power over this step and
        // signed like the unserved demand.
        let rejected_kw = (clamped - unclamped) / dt_s / 1000.0;

        self.e_stored_j = clamped;
        self.refresh_state();
        trace.post_update(self.kind, &self.snapshot());

        Ok(BankUpdate {
            soc_pct: self.soc_pct,
            v_bank_v: self.v_bank_v,
            rejected_kw,
        })
    }

    /// Bank variant.
    pub fn kind(&self) -> BankKind {
        self.kind
    }

    /// Active configuration record.
    pub fn params(&self) -> &BankParams {
        &self.params
    }

    /// Equivalent bank capacitance (F).
    pub fn c_eq_f(&self) -> f64 {
        self.c_eq_f
    }

    /// Total addressable energy (J).
    pub fn e_total_j(&self) -> f64 {
        self.e_total_j
    }

    /// Total addressable energy (kWh).
    pub fn capacity_kwh(&self) -> f64 {
        self.e_total_j / 3.6e6
    }

    /// Stored energy (J).
    pub fn e_stored_j(&self) -> f64 {
        self.e_stored_j
    }

    /// Terminal voltage (V).
    pub fn v_bank_v(&self) -> f64 {
        self.v_bank_v
    }

    /// State of charge (percent).
    pub fn soc_pct(&self) -> f64 {
        self.soc_pct
    }

    /// Bank current rating (A): per-cell rating times parallel strings.
    pub fn i_max_a(&self) -> f64 {
        self.params.i_cell_max_a * f64::from(self.params.np)
    }

    /// Lower stored-energy bound (J).
    pub fn e_min_j(&self) -> f64 {
        self.e_total_j * self.params.soc_min_pct / 100.0
    }

    /// Upper stored-energy bound (J).
    pub fn e_max_j(&self) -> f64 {
        self.e_total_j * self.params.soc_max_pct / 100.0
    }

    /// Copy of the current state for trace hooks.
    pub fn snapshot(&self) -> BankSnapshot {
        BankSnapshot {
            e_stored_j: self.e_stored_j,
            v_bank_v: self.v_bank_v,
            soc_pct: self.soc_pct,
        }
    }
}
