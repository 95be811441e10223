//! Post-hoc run summary computation from simulation results.

use std::fmt;

use super::types::StepResult;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<StepResult>` to keep the step data and the
/// reported metrics consistent.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of simulated timesteps.
    pub steps: usize,
    /// Peak absolute demand (kW).
    pub peak_demand_kw: f64,
    /// Peak absolute battery power (kW).
    pub battery_peak_kw: f64,
    /// Peak absolute supercapacitor power (kW).
    pub supercap_peak_kw: f64,
    /// Battery SoC envelope over the run (percent).
    pub battery_soc_min_pct: f64,
    pub battery_soc_max_pct: f64,
    /// Supercapacitor SoC envelope over the run (percent).
    pub supercap_soc_min_pct: f64,
    pub supercap_soc_max_pct: f64,
    /// Total battery energy the banks could not serve or absorb (kWh).
    pub battery_rejected_kwh: f64,
    /// Total supercapacitor energy rejected (kWh).
    pub supercap_rejected_kwh: f64,
    /// Total battery energy throughput (kWh, sum of |power| * dt).
    pub battery_throughput_kwh: f64,
    /// Battery equivalent full cycles (throughput / 2*capacity).
    pub battery_equivalent_full_cycles: f64,
}

impl RunSummary {
    /// Computes all indicators from the complete step record vector.
    ///
    /// # Arguments
    ///
    /// * `results` - Complete simulation step results
    /// * `dt_s` - Timestep duration in seconds
    /// * `battery_capacity_kwh` - Battery capacity for cycle counting
    pub fn from_results(results: &[StepResult], dt_s: f64, battery_capacity_kwh: f64) -> Self {
        if results.is_empty() {
            return Self {
                steps: 0,
                peak_demand_kw: 0.0,
                battery_peak_kw: 0.0,
                supercap_peak_kw: 0.0,
                battery_soc_min_pct: 0.0,
                battery_soc_max_pct: 0.0,
                supercap_soc_min_pct: 0.0,
                supercap_soc_max_pct: 0.0,
                battery_rejected_kwh: 0.0,
                supercap_rejected_kwh: 0.0,
                battery_throughput_kwh: 0.0,
                battery_equivalent_full_cycles: 0.0,
            };
        }

        let dt_h = dt_s / 3600.0;
        let mut peak_demand = 0.0_f64;
        let mut bat_peak = 0.0_f64;
        let mut cap_peak = 0.0_f64;
        let mut bat_soc_min = f64::INFINITY;
        let mut bat_soc_max = f64::NEG_INFINITY;
        let mut cap_soc_min = f64::INFINITY;
        let mut cap_soc_max = f64::NEG_INFINITY;
        let mut bat_rejected = 0.0_f64;
        let mut cap_rejected = 0.0_f64;
        let mut bat_throughput = 0.0_f64;

        for r in results {
            peak_demand = peak_demand.max(r.demand_kw.abs());
            bat_peak = bat_peak.max(r.battery_kw.abs());
            cap_peak = cap_peak.max(r.supercap_kw.abs());

            bat_soc_min = bat_soc_min.min(r.battery_soc_pct);
            bat_soc_max = bat_soc_max.max(r.battery_soc_pct);
            cap_soc_min = cap_soc_min.min(r.supercap_soc_pct);
            cap_soc_max = cap_soc_max.max(r.supercap_soc_pct);

            bat_rejected += r.battery_reject_kw.abs() * dt_h;
            cap_rejected += r.supercap_reject_kw.abs() * dt_h;
            bat_throughput += r.battery_kw.abs() * dt_h;
        }

        let cycles = if battery_capacity_kwh > 0.0 {
            bat_throughput / (2.0 * battery_capacity_kwh)
        } else {
            0.0
        };

        Self {
            steps: results.len(),
            peak_demand_kw: peak_demand,
            battery_peak_kw: bat_peak,
            supercap_peak_kw: cap_peak,
            battery_soc_min_pct: bat_soc_min,
            battery_soc_max_pct: bat_soc_max,
            supercap_soc_min_pct: cap_soc_min,
            supercap_soc_max_pct: cap_soc_max,
            battery_rejected_kwh: bat_rejected,
            supercap_rejected_kwh: cap_rejected,
            battery_throughput_kwh: bat_throughput,
            battery_equivalent_full_cycles: cycles,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Peak demand:           {:.1} kW", self.peak_demand_kw)?;
        writeln!(
            f,
            "Peak bank power:       bat {:.1} kW / cap {:.1} kW",
            self.battery_peak_kw, self.supercap_peak_kw
        )?;
        writeln!(
            f,
            "Battery SoC range:     {:.1}% – {:.1}%",
            self.battery_soc_min_pct, self.battery_soc_max_pct
        )?;
        writeln!(
            f,
            "Supercap SoC range:    {:.1}% – {:.1}%",
            self.supercap_soc_min_pct, self.supercap_soc_max_pct
        )?;
        writeln!(
            f,
            "Rejected energy:       bat {:.3} kWh / cap {:.3} kWh",
            self.battery_rejected_kwh, self.supercap_rejected_kwh
        )?;
        write!(
            f,
            "Battery throughput:    {:.2} kWh ({:.2} equiv. cycles)",
            self.battery_throughput_kwh, self.battery_equivalent_full_cycles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(demand_kw: f64, battery_kw: f64, reject_kw: f64, soc_pct: f64) -> StepResult {
        StepResult {
            timestep: 0,
            time_s: 0.0,
            demand_kw,
            battery_kw,
            supercap_kw: demand_kw - battery_kw,
            battery_i_a: 0.0,
            battery_v: 1200.0,
            battery_soc_pct: soc_pct,
            supercap_i_a: 0.0,
            supercap_v: 540.0,
            supercap_soc_pct: 100.0,
            battery_reject_kw: reject_kw,
            supercap_reject_kw: 0.0,
        }
    }

    #[test]
    fn peaks_use_absolute_values() {
        let results = vec![
            make_result(1500.0, 1000.0, 0.0, 50.0),
            make_result(-1800.0, -1000.0, 0.0, 52.0),
        ];
        let s = RunSummary::from_results(&results, 1.0, 100.0);
        assert_eq!(s.peak_demand_kw, 1800.0);
        assert_eq!(s.battery_peak_kw, 1000.0);
        assert_eq!(s.supercap_peak_kw, 800.0);
    }

    #[test]
    fn soc_envelope_tracks_min_and_max() {
        let results = vec![
            make_result(0.0, 0.0, 0.0, 48.0),
            make_result(0.0, 0.0, 0.0, 61.0),
            make_result(0.0, 0.0, 0.0, 39.0),
        ];
        let s = RunSummary::from_results(&results, 1.0, 100.0);
        assert_eq!(s.battery_soc_min_pct, 39.0);
        assert_eq!(s.battery_soc_max_pct, 61.0);
    }

    #[test]
    fn throughput_and_cycles() {
        // |1000| + |1000| kW over 1800 s steps = 1000 kWh; capacity 250 kWh
        // gives 2 equivalent full cycles.
        let results = vec![
            make_result(1000.0, 1000.0, 0.0, 50.0),
            make_result(-1000.0, -1000.0, 0.0, 50.0),
        ];
        let s = RunSummary::from_results(&results, 1800.0, 250.0);
        assert!((s.battery_throughput_kwh - 1000.0).abs() < 1e-9);
        assert!((s.battery_equivalent_full_cycles - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejected_energy_accumulates_magnitudes() {
        let results = vec![
            make_result(0.0, 0.0, 360.0, 50.0),
            make_result(0.0, 0.0, -360.0, 50.0),
        ];
        let s = RunSummary::from_results(&results, 10.0, 100.0);
        // 2 * 360 kW * 10 s = 2 kWh
        assert!((s.battery_rejected_kwh - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_results() {
        let s = RunSummary::from_results(&[], 1.0, 100.0);
        assert_eq!(s.steps, 0);
        assert_eq!(s.battery_throughput_kwh, 0.0);
    }
}
