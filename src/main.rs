//! Dynamic-demand simulator entry point: CLI wiring, logging and output.

mod cli;

use std::process;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynamic_demand_sim::config::ScenarioConfig;
use dynamic_demand_sim::error::SimError;
use dynamic_demand_sim::io::export::export_csv;
use dynamic_demand_sim::runner::run_scenario;

/// Installs the stderr log subscriber, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    // Load config: --scenario takes priority, then --preset
    let loaded = if let Some(ref path) = opts.scenario {
        ScenarioConfig::from_toml_file(path)
    } else {
        ScenarioConfig::from_preset(opts.preset.as_deref().unwrap_or("load_step"))
    };
    let mut scenario = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(seed) = opts.seed {
        scenario.simulation.seed = seed;
    }

    let run = match run_scenario(&scenario) {
        Ok(run) => run,
        Err(e) => {
            error!("scenario failed");
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Print sampled rows
    for r in run.results.iter().step_by(opts.report_every) {
        println!("{r}");
    }
    if let Some(last) = run
        .results
        .last()
        .filter(|r| r.timestep % opts.report_every != 0)
    {
        println!("{last}");
    }

    println!("\n{}", run.kpi);

    if let Some(ref path) = opts.telemetry_out {
        if let Err(e) = export_csv(&run.results, path).map_err(SimError::from) {
            eprintln!("error: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), rows = run.results.len(), "telemetry written");
    }
}
