//! Core simulation types: configuration and per-step records.

use std::fmt;

use crate::error::ModelError;

/// Simulation timing configuration.
///
/// The demand trace carries one sample per timestep; `dt_s` is the fixed
/// sample spacing.
///
/// # Examples
///
/// ```
/// use hess_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(1.0).unwrap();
/// assert_eq!(cfg.dt_s, 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Duration of one timestep in seconds.
    pub dt_s: f64,
}

impl SimConfig {
    /// Creates a simulation configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] unless `dt_s` is a positive
    /// finite number.
    pub fn new(dt_s: f64) -> Result<Self, ModelError> {
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(ModelError::parameter(
                "dt_s",
                "must be a positive finite number",
            ));
        }
        Ok(Self { dt_s })
    }
}

impl Default for SimConfig {
    /// One-second timesteps, matching one-hertz power traces.
    fn default() -> Self {
        Self { dt_s: 1.0 }
    }
}

/// Complete record of one simulation timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Timestep index.
    pub timestep: usize,
    /// Simulation time in seconds.
    pub time_s: f64,
    /// Exogenous demand for this step (kW; positive = traction,
    /// negative = regenerative braking).
    pub demand_kw: f64,
    /// Power routed to the battery bank (kW).
    pub battery_kw: f64,
    /// Power routed to the supercapacitor bank (kW).
    pub supercap_kw: f64,
    /// Battery terminal current (A, discharge-positive).
    pub battery_i_a: f64,
    /// Battery terminal voltage after this step (V).
    pub battery_v: f64,
    /// Battery state of charge after this step (percent).
    pub battery_soc_pct: f64,
    /// Supercapacitor terminal current (A, discharge-positive).
    pub supercap_i_a: f64,
    /// Supercapacitor terminal voltage after this step (V).
    pub supercap_v: f64,
    /// Supercapacitor state of charge after this step (percent).
    pub supercap_soc_pct: f64,
    /// Battery power refused by current saturation or the energy clamp
    /// this step (kW).
    pub battery_reject_kw: f64,
    /// Supercapacitor power refused by current saturation or the energy
    /// clamp this step (kW).
    pub supercap_reject_kw: f64,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>6} ({:>8.1}s) | demand={:>8.1} kW | bat={:>8.1} kW \
             (I={:>7.1} A, V={:>6.1} V, SoC={:>5.1}%) | cap={:>8.1} kW \
             (I={:>7.1} A, V={:>6.1} V, SoC={:>5.1}%) | reject(bat={:.2}, cap={:.2}) kW",
            self.timestep,
            self.time_s,
            self.demand_kw,
            self.battery_kw,
            self.battery_i_a,
            self.battery_v,
            self.battery_soc_pct,
            self.supercap_kw,
            self.supercap_i_a,
            self.supercap_v,
            self.supercap_soc_pct,
            self.battery_reject_kw,
            self.supercap_reject_kw,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_config_accepts_positive_dt() {
        let cfg = SimConfig::new(0.5).expect("valid dt");
        assert_eq!(cfg.dt_s, 0.5);
    }

    #[test]
    fn sim_config_rejects_bad_dt() {
        assert!(SimConfig::new(0.0).is_err());
        assert!(SimConfig::new(-1.0).is_err());
        assert!(SimConfig::new(f64::NAN).is_err());
        assert!(SimConfig::new(f64::INFINITY).is_err());
    }

    #[test]
    fn default_is_one_second() {
        assert_eq!(SimConfig::default().dt_s, 1.0);
    }

    #[test]
    fn step_result_display_does_not_panic() {
        let r = StepResult {
            timestep: 0,
            time_s: 0.0,
            demand_kw: 1500.0,
            battery_kw: 1000.0,
            supercap_kw: 500.0,
            battery_i_a: 778.2,
            battery_v: 1285.0,
            battery_soc_pct: 49.9,
            supercap_i_a: 926.0,
            supercap_v: 540.0,
            supercap_soc_pct: 81.0,
            battery_reject_kw: 0.0,
            supercap_reject_kw: 0.0,
        };
        assert!(!format!("{r}").is_empty());
    }
}
