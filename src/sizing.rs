//! Offline bank sizing from a historical power trace.
//!
//! Sizing is a pure function of the recorded demand, the split threshold,
//! and a fixed cell topology per bank: the voltage class pins `ns`, `nm`,
//! and the cell choice, and the engine solves for the parallel string
//! count `np`. The output is a configuration record per bank, handed to
//! [`EnergyBank::configure`](crate::banks::EnergyBank::configure) — sizing
//! never mutates a live bank.

use std::fmt;

use serde::Serialize;

use crate::banks::{BankKind, BankParams};
use crate::error::ModelError;
use crate::sim::controller::SupervisoryController;

/// Fixed cell topology of one bank: everything but the parallel count.
#[derive(Debug, Clone, Copy)]
pub struct CellTopology {
    /// Per-cell capacitance (F) or capacity (Ah).
    pub c: f64,
    /// Cells in series per string.
    pub ns: u32,
    /// Modules in series.
    pub nm: u32,
    /// Nominal per-cell voltage (V).
    pub vnom: f64,
}

/// Tunables of the sizing pass.
#[derive(Debug, Clone, Copy)]
pub struct SizingOptions {
    /// Multiplier applied to the peak cumulative energy.
    pub safety_factor: f64,
    /// Lower bound on supercapacitor parallel strings, guaranteeing peak
    /// current capability regardless of the energy-derived count.
    pub min_parallel_strings: u32,
    /// Sample spacing of the demand trace (s).
    pub dt_s: f64,
}

impl Default for SizingOptions {
    fn default() -> Self {
        Self {
            safety_factor: 1.2,
            min_parallel_strings: 3,
            dt_s: 1.0,
        }
    }
}

/// Sizing result for one bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankSizing {
    /// Per-cell capacitance (F) or capacity (Ah).
    pub c: f64,
    /// Cells in series per string.
    pub ns: u32,
    /// Solved parallel string count.
    pub np: u32,
    /// Modules in series.
    pub nm: u32,
    /// Nominal per-cell voltage (V).
    pub vnom: f64,
    /// Required addressable energy including the safety factor (Wh).
    pub max_energy_wh: f64,
}

impl BankSizing {
    /// Converts the sizing record into bank parameters, filling the
    /// variant defaults for SoC bounds and cell current rating.
    pub fn params(&self, kind: BankKind, soc_init_pct: f64) -> BankParams {
        BankParams::for_kind(
            kind,
            self.c,
            self.ns,
            self.np,
            self.nm,
            self.vnom,
            soc_init_pct,
        )
    }
}

/// Sizing results for both banks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingReport {
    pub battery: BankSizing,
    pub supercap: BankSizing,
}

impl fmt::Display for SizingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Sizing Report ---")?;
        writeln!(
            f,
            "Battery:   Np={} (Ns={}, Nm={}, {:.2} V x {:.0} Ah cells, {:.1} Wh required)",
            self.battery.np,
            self.battery.ns,
            self.battery.nm,
            self.battery.vnom,
            self.battery.c,
            self.battery.max_energy_wh
        )?;
        write!(
            f,
            "Supercap:  Np={} (Ns={}, Nm={}, {:.2} V x {:.0} F cells, {:.1} Wh required)",
            self.supercap.np,
            self.supercap.ns,
            self.supercap.nm,
            self.supercap.vnom,
            self.supercap.c,
            self.supercap.max_energy_wh
        )
    }
}

fn validate_topology(prefix: &str, t: &CellTopology) -> Result<(), ModelError> {
    if !(t.c.is_finite() && t.c > 0.0) {
        return Err(ModelError::parameter(
            &format!("{prefix}.c"),
            "must be a positive finite number",
        ));
    }
    if t.ns == 0 {
        return Err(ModelError::parameter(&format!("{prefix}.ns"), "must be > 0"));
    }
    if t.nm == 0 {
        return Err(ModelError::parameter(&format!("{prefix}.nm"), "must be > 0"));
    }
    if !(t.vnom.is_finite() && t.vnom > 0.0) {
        return Err(ModelError::parameter(
            &format!("{prefix}.vnom"),
            "must be a positive finite number",
        ));
    }
    Ok(())
}

/// Sizes both banks from a historical demand trace.
///
/// Applies the same split policy as the supervisory controller to every
/// sample, integrates the per-bank energy (rectangular rule, Wh), scales
/// the absolute peak by the safety factor, and solves the parallel string
/// count of each bank:
///
/// - battery: `np = ceil(ceil(max_energy / (vnom * c)) / (ns * nm))`,
///   at least one string;
/// - supercapacitor: from `max_energy = 0.5 * c_eq_total * v_total^2`,
///   `np = ceil(c_eq_total * ns * nm / c)`, floored at
///   `min_parallel_strings`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for an empty trace, a bad
/// threshold, or non-positive topology/option values, and
/// [`ModelError::InvalidInput`] for a non-finite demand sample.
pub fn size_banks(
    demand_kw: &[f64],
    threshold_kw: f64,
    battery: &CellTopology,
    supercap: &CellTopology,
    opts: &SizingOptions,
) -> Result<SizingReport, ModelError> {
    if demand_kw.is_empty() {
        return Err(ModelError::parameter("demand_kw", "trace must be non-empty"));
    }
    validate_topology("battery", battery)?;
    validate_topology("supercap", supercap)?;
    if !(opts.safety_factor.is_finite() && opts.safety_factor >= 1.0) {
        return Err(ModelError::parameter("safety_factor", "must be >= 1.0"));
    }
    if opts.min_parallel_strings == 0 {
        return Err(ModelError::parameter("min_parallel_strings", "must be > 0"));
    }
    if !(opts.dt_s.is_finite() && opts.dt_s > 0.0) {
        return Err(ModelError::parameter(
            "dt_s",
            "must be a positive finite number",
        ));
    }

    let controller = SupervisoryController::new(threshold_kw)?;

    // Cumulative energy per bank (Wh) and its absolute peak. The reduction
    // is associative and could be chunked; a single pass is plenty here.
    let wh_per_kw = 1000.0 * opts.dt_s / 3600.0;
    let mut cum_battery_wh = 0.0_f64;
    let mut cum_supercap_wh = 0.0_f64;
    let mut peak_battery_wh = 0.0_f64;
    let mut peak_supercap_wh = 0.0_f64;

    for &sample in demand_kw {
        let split = controller.split(sample)?;
        cum_battery_wh += split.battery_kw * wh_per_kw;
        cum_supercap_wh += split.supercap_kw * wh_per_kw;
        peak_battery_wh = peak_battery_wh.max(cum_battery_wh.abs());
        peak_supercap_wh = peak_supercap_wh.max(cum_supercap_wh.abs());
    }

    let battery_energy_wh = opts.safety_factor * peak_battery_wh;
    let supercap_energy_wh = opts.safety_factor * peak_supercap_wh;

    // Battery: whole cells, then whole parallel strings.
    let energy_per_cell_wh = battery.vnom * battery.c;
    let n_cells = (battery_energy_wh / energy_per_cell_wh).ceil();
    let series_cells = f64::from(battery.ns) * f64::from(battery.nm);
    let battery_np = ((n_cells / series_cells).ceil() as u32).max(1);

    // Supercapacitor: solve the energy equation for total capacitance.
    let v_total = supercap.vnom * f64::from(supercap.ns) * f64::from(supercap.nm);
    let c_eq_total = 2.0 * supercap_energy_wh * 3600.0 / (v_total * v_total);
    let cap_series = f64::from(supercap.ns) * f64::from(supercap.nm);
    let supercap_np =
        ((c_eq_total * cap_series / supercap.c).ceil() as u32).max(opts.min_parallel_strings);

    Ok(SizingReport {
        battery: BankSizing {
            c: battery.c,
            ns: battery.ns,
            np: battery_np,
            nm: battery.nm,
            vnom: battery.vnom,
            max_energy_wh: battery_energy_wh,
        },
        supercap: BankSizing {
            c: supercap.c,
            ns: supercap.ns,
            np: supercap_np,
            nm: supercap.nm,
            vnom: supercap.vnom,
            max_energy_wh: supercap_energy_wh,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banks::EnergyBank;

    fn battery_cell() -> CellTopology {
        CellTopology {
            c: 40.0,
            ns: 1,
            nm: 1,
            vnom: 3.2,
        }
    }

    fn supercap_cell() -> CellTopology {
        CellTopology {
            c: 3000.0,
            ns: 200,
            nm: 1,
            vnom: 2.7,
        }
    }

    #[test]
    fn single_cell_battery_from_100wh_peak() {
        // One 360 kW sample at dt=1s integrates to exactly 100 Wh; the
        // 1.2 safety factor requires 120 Wh, under the 128 Wh of one
        // 3.2 V / 40 Ah cell.
        let report = size_banks(
            &[360.0],
            500.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");

        assert!((report.battery.max_energy_wh - 120.0).abs() < 1e-9);
        assert_eq!(report.battery.np, 1);
    }

    #[test]
    fn supercap_parallel_count_never_below_floor() {
        // Demand never crosses the threshold, so the supercap integrates
        // zero energy but still gets the minimum string count.
        let report = size_banks(
            &[100.0; 60],
            500.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");

        assert_eq!(report.supercap.max_energy_wh, 0.0);
        assert_eq!(report.supercap.np, 3);
    }

    #[test]
    fn supercap_np_solves_the_energy_equation() {
        // 600 s at 1540 kW: supercap carries 540 kW -> 90 kWh peak,
        // 108 kWh with the safety factor. v_total = 540 V, so
        // c_eq_total = 2*108e3*3600/540^2 ≈ 2666.7 F and
        // np = ceil(2666.7 * 200 / 3000) = 178.
        let report = size_banks(
            &[1540.0; 600],
            1000.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");

        assert!((report.supercap.max_energy_wh - 108_000.0).abs() < 1e-6);
        assert_eq!(report.supercap.np, 178);
    }

    #[test]
    fn regen_counts_through_absolute_cumulative_energy() {
        // Net energy is zero but the excursion peaks at 100 Wh.
        let trace = [vec![360.0; 1], vec![-360.0; 1]].concat();
        let report = size_banks(
            &trace,
            500.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");
        assert!((report.battery.max_energy_wh - 120.0).abs() < 1e-9);
    }

    #[test]
    fn sized_params_configure_a_valid_bank() {
        let report = size_banks(
            &[1540.0; 600],
            1000.0,
            &CellTopology {
                c: 40.0,
                ns: 16,
                nm: 24,
                vnom: 3.35,
            },
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");

        let battery = EnergyBank::configure(
            BankKind::Battery,
            report.battery.params(BankKind::Battery, 50.0),
        )
        .expect("sized battery must configure");
        let supercap = EnergyBank::configure(
            BankKind::Supercapacitor,
            report.supercap.params(BankKind::Supercapacitor, 100.0),
        )
        .expect("sized supercap must configure");

        assert_eq!(battery.params().np, report.battery.np);
        assert_eq!(supercap.params().np, report.supercap.np);
    }

    #[test]
    fn sized_banks_hold_the_energy_they_were_sized_for() {
        // Battery: one 360 kW second integrates to 100 Wh, 120 Wh with the
        // safety factor; the configured bank must address at least that.
        let report = size_banks(
            &[360.0],
            500.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");
        let battery = EnergyBank::configure(
            BankKind::Battery,
            report.battery.params(BankKind::Battery, 50.0),
        )
        .expect("sized battery configures");
        assert!(
            battery.e_total_j() / 3600.0 >= report.battery.max_energy_wh,
            "battery holds {} Wh, sized for {} Wh",
            battery.e_total_j() / 3600.0,
            report.battery.max_energy_wh
        );

        // Supercapacitor: 600 s of 540 kW excess requires 108 kWh.
        let report = size_banks(
            &[1540.0; 600],
            1000.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");
        let supercap = EnergyBank::configure(
            BankKind::Supercapacitor,
            report.supercap.params(BankKind::Supercapacitor, 100.0),
        )
        .expect("sized supercap configures");
        assert!(
            supercap.e_total_j() / 3600.0 >= report.supercap.max_energy_wh,
            "supercap holds {} Wh, sized for {} Wh",
            supercap.e_total_j() / 3600.0,
            report.supercap.max_energy_wh
        );
    }

    #[test]
    fn sizing_is_pure() {
        let trace: Vec<f64> = (0..500).map(|t| 1400.0 * (t as f64 / 40.0).sin()).collect();
        let a = size_banks(
            &trace,
            1000.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");
        let b = size_banks(
            &trace,
            1000.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        )
        .expect("valid sizing");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_trace_is_rejected() {
        let err = size_banks(
            &[],
            1000.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn non_finite_sample_is_rejected() {
        let err = size_banks(
            &[100.0, f64::NAN],
            1000.0,
            &battery_cell(),
            &supercap_cell(),
            &SizingOptions::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn bad_threshold_and_options_are_rejected() {
        let trace = [100.0];
        assert!(
            size_banks(
                &trace,
                0.0,
                &battery_cell(),
                &supercap_cell(),
                &SizingOptions::default()
            )
            .is_err()
        );
        assert!(
            size_banks(
                &trace,
                1000.0,
                &battery_cell(),
                &supercap_cell(),
                &SizingOptions {
                    safety_factor: 0.5,
                    ..SizingOptions::default()
                }
            )
            .is_err()
        );
        assert!(
            size_banks(
                &trace,
                1000.0,
                &battery_cell(),
                &supercap_cell(),
                &SizingOptions {
                    dt_s: 0.0,
                    ..SizingOptions::default()
                }
            )
            .is_err()
        );
    }
}
