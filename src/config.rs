//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::banks::{BankKind, BankParams};
use crate::sizing::{BankSizing, CellTopology, SizingOptions};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the `haul_truck` preset. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::haul_truck`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing parameters.
    #[serde(default)]
    pub simulation: SimulationSection,
    /// Supervisory controller parameters.
    #[serde(default)]
    pub controller: ControllerSection,
    /// Battery bank parameters.
    #[serde(default)]
    pub battery: BatterySection,
    /// Supercapacitor bank parameters.
    #[serde(default)]
    pub supercap: SupercapSection,
    /// Bank sizing parameters.
    #[serde(default)]
    pub sizing: SizingSection,
    /// Synthetic duty-cycle parameters.
    #[serde(default)]
    pub profile: ProfileSection,
}

/// Simulation timing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Duration of one timestep in seconds (must be > 0).
    pub dt_s: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self { dt_s: 1.0 }
    }
}

/// Supervisory controller parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerSection {
    /// Power-split threshold (kW, must be > 0).
    pub threshold_kw: f64,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            threshold_kw: 1000.0,
        }
    }
}

/// Battery bank parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySection {
    /// Per-cell capacity (Ah).
    pub c_ah: f64,
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
    /// Minimum state of charge (percent).
    pub soc_min_pct: f64,
    /// Maximum state of charge (percent).
    pub soc_max_pct: f64,
    /// Per-cell current rating (A); defaults to the 6C rate when omitted.
    pub i_cell_max_a: Option<f64>,
}

impl Default for BatterySection {
    fn default() -> Self {
        Self {
            c_ah: 40.0,
            ns: 16,
            np: 3,
            nm: 24,
            vnom: 3.35,
            soc_init_pct: 50.0,
            soc_min_pct: 0.0,
            soc_max_pct: 100.0,
            i_cell_max_a: None,
        }
    }
}

impl BatterySection {
    /// Bank parameters for this section, with variant defaults filled in.
    pub fn params(&self) -> BankParams {
        let kind = BankKind::Battery;
        BankParams {
            soc_min_pct: self.soc_min_pct,
            soc_max_pct: self.soc_max_pct,
            i_cell_max_a: self
                .i_cell_max_a
                .unwrap_or_else(|| kind.default_cell_current_a(self.c_ah)),
            ..BankParams::for_kind(
                kind,
                self.c_ah,
                self.ns,
                self.np,
                self.nm,
                self.vnom,
                self.soc_init_pct,
            )
        }
    }

    /// Fixed cell topology for the sizing engine.
    pub fn topology(&self) -> CellTopology {
        CellTopology {
            c: self.c_ah,
            ns: self.ns,
            nm: self.nm,
            vnom: self.vnom,
        }
    }

    /// Bank parameters for a sized configuration: the solved string count
    /// with this section's SoC window and cell-current override.
    pub fn params_from_sizing(&self, sizing: &BankSizing) -> BankParams {
        BankParams {
            c: sizing.c,
            ns: sizing.ns,
            np: sizing.np,
            nm: sizing.nm,
            vnom: sizing.vnom,
            ..self.params()
        }
    }
}

/// Supercapacitor bank parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupercapSection {
    /// Per-cell capacitance (F).
    pub c_f: f64,
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
    /// Minimum state of charge (percent).
    pub soc_min_pct: f64,
    /// Maximum state of charge (percent).
    pub soc_max_pct: f64,
    /// Per-cell current rating (A); defaults to 280 A when omitted.
    pub i_cell_max_a: Option<f64>,
}

impl Default for SupercapSection {
    fn default() -> Self {
        Self {
            c_f: 3000.0,
            ns: 200,
            np: 10,
            nm: 1,
            vnom: 2.7,
            soc_init_pct: 100.0,
            soc_min_pct: 25.0,
            soc_max_pct: 100.0,
            i_cell_max_a: None,
        }
    }
}

impl SupercapSection {
    /// Bank parameters for this section, with variant defaults filled in.
    pub fn params(&self) -> BankParams {
        let kind = BankKind::Supercapacitor;
        BankParams {
            soc_min_pct: self.soc_min_pct,
            soc_max_pct: self.soc_max_pct,
            i_cell_max_a: self
                .i_cell_max_a
                .unwrap_or_else(|| kind.default_cell_current_a(self.c_f)),
            ..BankParams::for_kind(
                kind,
                self.c_f,
                self.ns,
                self.np,
                self.nm,
                self.vnom,
                self.soc_init_pct,
            )
        }
    }

    /// Fixed cell topology for the sizing engine.
    pub fn topology(&self) -> CellTopology {
        CellTopology {
            c: self.c_f,
            ns: self.ns,
            nm: self.nm,
            vnom: self.vnom,
        }
    }

    /// Bank parameters for a sized configuration: the solved string count
    /// with this section's SoC window and cell-current override.
    pub fn params_from_sizing(&self, sizing: &BankSizing) -> BankParams {
        BankParams {
            c: sizing.c,
            ns: sizing.ns,
            np: sizing.np,
            nm: sizing.nm,
            vnom: sizing.vnom,
            ..self.params()
        }
    }
}

/// Bank sizing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingSection {
    /// When true, size both banks from the demand trace before the run
    /// and simulate with the sized configurations.
    pub auto: bool,
    /// Multiplier applied to the peak cumulative energy.
    pub safety_factor: f64,
    /// Lower bound on supercapacitor parallel strings.
    pub min_parallel_strings: u32,
}

impl Default for SizingSection {
    fn default() -> Self {
        Self {
            auto: false,
            safety_factor: 1.2,
            min_parallel_strings: 3,
        }
    }
}

impl SizingSection {
    /// Sizing options for this section.
    pub fn options(&self, dt_s: f64) -> SizingOptions {
        SizingOptions {
            safety_factor: self.safety_factor,
            min_parallel_strings: self.min_parallel_strings,
            dt_s,
        }
    }
}

/// Synthetic duty-cycle parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSection {
    /// Number of samples to generate.
    pub steps: usize,
    /// Baseline traction power (kW).
    pub base_kw: f64,
    /// Sinusoidal amplitude (kW).
    pub amp_kw: f64,
    /// Sinusoid period (timesteps).
    pub period_steps: usize,
    /// Surge magnitude (kW).
    pub surge_kw: f64,
    /// Spacing between surge windows (timesteps).
    pub surge_period_steps: usize,
    /// Width of each surge window (timesteps).
    pub surge_width_steps: usize,
    /// Gaussian noise standard deviation (kW).
    pub noise_std_kw: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            steps: 3600,
            base_kw: 600.0,
            amp_kw: 300.0,
            period_steps: 600,
            surge_kw: 900.0,
            surge_period_steps: 600,
            surge_width_steps: 60,
            noise_std_kw: 25.0,
            seed: 42,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"controller.threshold_kw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the mining haul-truck scenario (the original recorded-fleet
    /// parameters: 16s24m 40 Ah battery strings, 200s 3000 F
    /// supercapacitor strings, 1 MW split threshold).
    pub fn haul_truck() -> Self {
        Self {
            simulation: SimulationSection::default(),
            controller: ControllerSection::default(),
            battery: BatterySection::default(),
            supercap: SupercapSection::default(),
            sizing: SizingSection::default(),
            profile: ProfileSection::default(),
        }
    }

    /// Returns the commuter-rail preset: lighter vehicle, lower threshold,
    /// smaller banks, denser stop/start surges.
    pub fn commuter_rail() -> Self {
        Self {
            controller: ControllerSection { threshold_kw: 300.0 },
            battery: BatterySection {
                ns: 16,
                np: 2,
                nm: 8,
                ..BatterySection::default()
            },
            supercap: SupercapSection {
                ns: 120,
                np: 6,
                ..SupercapSection::default()
            },
            profile: ProfileSection {
                base_kw: 180.0,
                amp_kw: 90.0,
                period_steps: 300,
                surge_kw: 320.0,
                surge_period_steps: 240,
                surge_width_steps: 40,
                noise_std_kw: 10.0,
                ..ProfileSection::default()
            },
            ..Self::haul_truck()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["haul_truck", "commuter_rail"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "haul_truck" => Ok(Self::haul_truck()),
            "commuter_rail" => Ok(Self::commuter_rail()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.simulation.dt_s.is_finite() && self.simulation.dt_s > 0.0) {
            errors.push(ConfigError {
                field: "simulation.dt_s".into(),
                message: "must be > 0".into(),
            });
        }
        if !(self.controller.threshold_kw.is_finite() && self.controller.threshold_kw > 0.0) {
            errors.push(ConfigError {
                field: "controller.threshold_kw".into(),
                message: "must be > 0".into(),
            });
        }

        validate_bank_section(
            &mut errors,
            "battery",
            self.battery.c_ah,
            self.battery.ns,
            self.battery.np,
            self.battery.nm,
            self.battery.vnom,
            self.battery.soc_init_pct,
            self.battery.soc_min_pct,
            self.battery.soc_max_pct,
        );
        if let Some(i) = self.battery.i_cell_max_a
            && !(i.is_finite() && i > 0.0)
        {
            errors.push(ConfigError {
                field: "battery.i_cell_max_a".into(),
                message: "must be > 0".into(),
            });
        }
        validate_bank_section(
            &mut errors,
            "supercap",
            self.supercap.c_f,
            self.supercap.ns,
            self.supercap.np,
            self.supercap.nm,
            self.supercap.vnom,
            self.supercap.soc_init_pct,
            self.supercap.soc_min_pct,
            self.supercap.soc_max_pct,
        );
        if let Some(i) = self.supercap.i_cell_max_a
            && !(i.is_finite() && i > 0.0)
        {
            errors.push(ConfigError {
                field: "supercap.i_cell_max_a".into(),
                message: "must be > 0".into(),
            });
        }

        if !(self.sizing.safety_factor.is_finite() && self.sizing.safety_factor >= 1.0) {
            errors.push(ConfigError {
                field: "sizing.safety_factor".into(),
                message: "must be >= 1.0".into(),
            });
        }
        if self.sizing.min_parallel_strings == 0 {
            errors.push(ConfigError {
                field: "sizing.min_parallel_strings".into(),
                message: "must be > 0".into(),
            });
        }

        let p = &self.profile;
        if p.steps == 0 {
            errors.push(ConfigError {
                field: "profile.steps".into(),
                message: "must be > 0".into(),
            });
        }
        if p.period_steps == 0 {
            errors.push(ConfigError {
                field: "profile.period_steps".into(),
                message: "must be > 0".into(),
            });
        }
        if p.surge_period_steps == 0 {
            errors.push(ConfigError {
                field: "profile.surge_period_steps".into(),
                message: "must be > 0".into(),
            });
        } else if p.surge_width_steps > p.surge_period_steps / 2 {
            errors.push(ConfigError {
                field: "profile.surge_width_steps".into(),
                message: "must fit in half of profile.surge_period_steps".into(),
            });
        }

        errors
    }
}

#[expect(clippy::too_many_arguments)]
fn validate_bank_section(
    errors: &mut Vec<ConfigError>,
    section: &str,
    c: f64,
    ns: u32,
    np: u32,
    nm: u32,
    vnom: f64,
    soc_init_pct: f64,
    soc_min_pct: f64,
    soc_max_pct: f64,
) {
    let mut push = |field: &str, message: &str| {
        errors.push(ConfigError {
            field: format!("{section}.{field}"),
            message: message.to_string(),
        });
    };

    if !(c.is_finite() && c > 0.0) {
        push("c", "must be > 0");
    }
    if ns == 0 {
        push("ns", "must be > 0");
    }
    if np == 0 {
        push("np", "must be > 0");
    }
    if nm == 0 {
        push("nm", "must be > 0");
    }
    if !(vnom.is_finite() && vnom > 0.0) {
        push("vnom", "must be > 0");
    }
    if !(soc_min_pct.is_finite() && (0.0..=100.0).contains(&soc_min_pct)) {
        push("soc_min_pct", "must be in [0, 100]");
    }
    if !(soc_max_pct.is_finite() && (0.0..=100.0).contains(&soc_max_pct)) {
        push("soc_max_pct", "must be in [0, 100]");
    }
    if soc_min_pct >= soc_max_pct {
        push("soc_min_pct", "must be < soc_max_pct");
    }
    if !(soc_init_pct.is_finite() && soc_init_pct >= soc_min_pct && soc_init_pct <= soc_max_pct) {
        push("soc_init_pct", "must be within [soc_min_pct, soc_max_pct]");
    }
}
