//! HESS simulator entry point — CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use hess_sim::banks::{BankKind, EnergyBank};
use hess_sim::config::ScenarioConfig;
use hess_sim::io::export::export_csv;
use hess_sim::io::profile::load_profile_csv;
use hess_sim::profile::SyntheticDutyCycle;
use hess_sim::sim::controller::SupervisoryController;
use hess_sim::sim::engine::Engine;
use hess_sim::sim::kpi::RunSummary;
use hess_sim::sim::types::SimConfig;
use hess_sim::sizing::{SizingReport, size_banks};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    profile_path: Option<String>,
    size: bool,
    seed_override: Option<u64>,
    telemetry_out: Option<String>,
    print_steps: bool,
}

fn print_help() {
    eprintln!("hess-sim — Hybrid energy-storage system simulator");
    eprintln!();
    eprintln!("Usage: hess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (haul_truck, commuter_rail)");
    eprintln!("  --profile <path>         Load demand trace from CSV (power_kw column)");
    eprintln!("  --size                   Size both banks from the demand trace before the run");
    eprintln!("  --seed <u64>             Override synthetic profile seed");
    eprintln!("  --telemetry-out <path>   Export step results to CSV");
    eprintln!("  --print-steps            Print each step record");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the haul_truck preset is used.");
    eprintln!("If no --profile is given, a synthetic duty cycle is generated.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        profile_path: None,
        size: false,
        seed_override: None,
        telemetry_out: None,
        print_steps: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--profile" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --profile requires a path argument");
                    process::exit(1);
                }
                cli.profile_path = Some(args[i].clone());
            }
            "--size" => {
                cli.size = true;
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            "--print-steps" => {
                cli.print_steps = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Builds the demand trace: CSV file if given, synthetic duty cycle otherwise.
fn build_demand(cfg: &ScenarioConfig, profile_path: Option<&str>) -> Vec<f64> {
    if let Some(path) = profile_path {
        match load_profile_csv(Path::new(path)) {
            Ok(trace) => trace,
            Err(e) => {
                eprintln!("error: failed to load profile: {e}");
                process::exit(1);
            }
        }
    } else {
        let p = &cfg.profile;
        let mut cycle = SyntheticDutyCycle::new(
            p.base_kw,
            p.amp_kw,
            p.period_steps,
            p.surge_kw,
            p.surge_period_steps,
            p.surge_width_steps,
            p.noise_std_kw,
            p.seed,
        );
        cycle.generate(p.steps)
    }
}

/// Sizes both banks from the demand trace and prints the report.
fn run_sizing(cfg: &ScenarioConfig, demand: &[f64]) -> SizingReport {
    let options = cfg.sizing.options(cfg.simulation.dt_s);
    match size_banks(
        demand,
        cfg.controller.threshold_kw,
        &cfg.battery.topology(),
        &cfg.supercap.topology(),
        &options,
    ) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: sizing failed: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then haul_truck
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::haul_truck()
    };

    // Apply seed override
    if let Some(seed) = cli.seed_override {
        scenario.profile.seed = seed;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let demand = build_demand(&scenario, cli.profile_path.as_deref());

    // Bank parameters: from the sizing engine when requested, else from config
    let (battery_params, supercap_params) = if cli.size || scenario.sizing.auto {
        let report = run_sizing(&scenario, &demand);
        println!("{report}\n");
        (
            scenario.battery.params_from_sizing(&report.battery),
            scenario.supercap.params_from_sizing(&report.supercap),
        )
    } else {
        (scenario.battery.params(), scenario.supercap.params())
    };

    // Build and run
    let run = SimConfig::new(scenario.simulation.dt_s)
        .and_then(|sim_config| {
            let controller = SupervisoryController::new(scenario.controller.threshold_kw)?;
            let battery = EnergyBank::configure(BankKind::Battery, battery_params)?;
            let supercap = EnergyBank::configure(BankKind::Supercapacitor, supercap_params)?;
            let mut engine = Engine::new(sim_config, controller, battery, supercap);
            let capacity_kwh = engine.battery().capacity_kwh();
            let results = engine.run(&demand)?;
            Ok((results, capacity_kwh))
        });
    let (results, battery_capacity_kwh) = match run {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Print per-step results
    if cli.print_steps {
        for r in &results {
            println!("{r}");
        }
        println!();
    }

    // Print the run summary
    let summary = RunSummary::from_results(&results, scenario.simulation.dt_s, battery_capacity_kwh);
    println!("{summary}");

    // Export CSV if requested
    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }
}
