//! Shared test fixtures for integration tests.

use dynamic_demand_sim::config::ScenarioConfig;
use dynamic_demand_sim::runner::{SimulationResult, run_scenario};

/// Number of simulated appliances in the reduced fleet.
pub const SMALL_FLEET: usize = 100;

/// Appliances each simulated unit stands for, keeping the fleet at 1.28 million.
pub const SMALL_FLEET_MULTIPLIER: f64 = 12_800.0;

/// The load-step preset on a reduced fleet, run from -20 s to `end_s`.
pub fn short_load_step(end_s: f64) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::load_step();
    cfg.simulation.start_s = -20.0;
    cfg.simulation.end_s = end_s;
    cfg.fleet.size = SMALL_FLEET;
    cfg.fleet.multiplier = SMALL_FLEET_MULTIPLIER;
    cfg
}

/// Runs a scenario that is expected to be valid.
pub fn run(cfg: &ScenarioConfig) -> SimulationResult {
    run_scenario(cfg).expect("scenario should run")
}
