//! Shared helpers for integration tests.

use hess_sim::banks::{BankKind, EnergyBank};
use hess_sim::config::ScenarioConfig;
use hess_sim::sim::controller::SupervisoryController;
use hess_sim::sim::engine::Engine;
use hess_sim::sim::types::SimConfig;

/// Builds an engine from a scenario configuration.
pub fn engine_from_config(cfg: &ScenarioConfig) -> Engine {
    let sim_config = SimConfig::new(cfg.simulation.dt_s).expect("valid dt");
    let controller =
        SupervisoryController::new(cfg.controller.threshold_kw).expect("valid threshold");
    let battery =
        EnergyBank::configure(BankKind::Battery, cfg.battery.params()).expect("valid battery");
    let supercap = EnergyBank::configure(BankKind::Supercapacitor, cfg.supercap.params())
        .expect("valid supercap");
    Engine::new(sim_config, controller, battery, supercap)
}

/// Deterministic demand trace from a scenario's profile section.
pub fn demand_from_config(cfg: &ScenarioConfig) -> Vec<f64> {
    let p = &cfg.profile;
    hess_sim::profile::SyntheticDutyCycle::new(
        p.base_kw,
        p.amp_kw,
        p.period_steps,
        p.surge_kw,
        p.surge_period_steps,
        p.surge_width_steps,
        p.noise_std_kw,
        p.seed,
    )
    .generate(p.steps)
}
