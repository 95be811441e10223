//! Simulation engine driving the controller and both banks in lockstep.

use crate::banks::{EnergyBank, NoTrace, UpdateTrace};
use crate::error::ModelError;

use super::controller::SupervisoryController;
use super::types::{SimConfig, StepResult};

/// Simulation engine owning the controller, both banks, and the timing
/// configuration.
///
/// The engine carries bank state forward across timesteps; a failed step
/// aborts the whole run rather than continuing with stale state. Results
/// accumulate in a plain `Vec<StepResult>` returned from [`Engine::run`].
pub struct Engine {
    config: SimConfig,
    controller: SupervisoryController,
    battery: EnergyBank,
    supercap: EnergyBank,
    trace: Option<Box<dyn UpdateTrace>>,
}

impl Engine {
    /// Creates a simulation engine.
    pub fn new(
        config: SimConfig,
        controller: SupervisoryController,
        battery: EnergyBank,
        supercap: EnergyBank,
    ) -> Self {
        Self {
            config,
            controller,
            battery,
            supercap,
            trace: None,
        }
    }

    /// Installs an observability hook invoked around every bank update.
    pub fn with_trace(mut self, trace: Box<dyn UpdateTrace>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Executes one simulation timestep.
    ///
    /// The split uses only the exogenous demand for this step, never
    /// feedback from bank state (no look-ahead). Per-bank rejected power
    /// combines the current-saturation and energy-clamp components.
    ///
    /// # Errors
    ///
    /// Returns the first bank or controller error (non-finite demand,
    /// current, or dt); the step is not recorded.
    pub fn step(&mut self, t: usize, demand_kw: f64) -> Result<StepResult, ModelError> {
        let dt = self.config.dt_s;
        let mut no_trace = NoTrace;
        let trace: &mut dyn UpdateTrace = match &mut self.trace {
            Some(hook) => hook.as_mut(),
            None => &mut no_trace,
        };

        // 1. Split the demand between the banks
        let split = self.controller.split(demand_kw)?;

        // 2. Battery: current, then state
        let (battery_i_a, battery_i_reject_kw) = self.battery.compute_current(split.battery_kw)?;
        let battery_upd = self
            .battery
            .update_state_traced(battery_i_a, dt, &mut *trace)?;

        // 3. Supercapacitor: current, then state
        let (supercap_i_a, supercap_i_reject_kw) =
            self.supercap.compute_current(split.supercap_kw)?;
        let supercap_upd = self
            .supercap
            .update_state_traced(supercap_i_a, dt, &mut *trace)?;

        // 4. Record the step
        Ok(StepResult {
            timestep: t,
            time_s: t as f64 * dt,
            demand_kw,
            battery_kw: split.battery_kw,
            supercap_kw: split.supercap_kw,
            battery_i_a,
            battery_v: battery_upd.v_bank_v,
            battery_soc_pct: battery_upd.soc_pct,
            supercap_i_a,
            supercap_v: supercap_upd.v_bank_v,
            supercap_soc_pct: supercap_upd.soc_pct,
            battery_reject_kw: battery_i_reject_kw + battery_upd.rejected_kw,
            supercap_reject_kw: supercap_i_reject_kw + supercap_upd.rejected_kw,
        })
    }

    /// Executes the whole demand trace and returns the step records.
    ///
    /// # Errors
    ///
    /// Aborts at the first failing step and returns its error.
    pub fn run(&mut self, demand_kw: &[f64]) -> Result<Vec<StepResult>, ModelError> {
        let mut results = Vec::with_capacity(demand_kw.len());
        for (t, &demand) in demand_kw.iter().enumerate() {
            results.push(self.step(t, demand)?);
        }
        Ok(results)
    }

    /// Returns a reference to the battery bank.
    pub fn battery(&self) -> &EnergyBank {
        &self.battery
    }

    /// Returns a reference to the supercapacitor bank.
    pub fn supercap(&self) -> &EnergyBank {
        &self.supercap
    }

    /// Returns the timing configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
