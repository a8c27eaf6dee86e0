//! Scenario assembly: turns a validated [`ScenarioConfig`] into a running engine.

use tracing::info;

use crate::config::ScenarioConfig;
use crate::devices::DishwasherFleet;
use crate::error::SimError;
use crate::io::wind::WindSeries;
use crate::sim::engine::Engine;
use crate::sim::generator::GovernorGenerator;
use crate::sim::grid::GridFrequencyModel;
use crate::sim::kpi::KpiReport;
use crate::sim::types::StepResult;

/// Results and summary of one scenario run.
pub struct SimulationResult {
    pub results: Vec<StepResult>,
    pub kpi: KpiReport,
}

/// Builds an engine from a scenario.
///
/// # Errors
///
/// Returns [`SimError::Config`] listing every validation failure, or
/// [`SimError::Wind`] if the configured wind file cannot be loaded.
pub fn build_engine(cfg: &ScenarioConfig) -> Result<Engine, SimError> {
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(SimError::Config(errors));
    }

    let sim_config = cfg.simulation.sim_config();
    let f_nom = cfg.grid.nominal_hz;

    let mut fleet = DishwasherFleet::with_params(&cfg.fleet.params(sim_config.seed));
    if let Some(hz) = cfg.fleet.turn_off_hz {
        fleet.set_turn_off_threshold(hz);
    }
    if let Some(hz) = cfg.fleet.turn_on_hz {
        fleet.set_turn_on_threshold(hz);
    }

    let b = &cfg.base_generator;
    let base = GovernorGenerator::with_initial_power(
        b.max_power_w,
        b.setpoint_hz,
        f_nom,
        b.droop_pct,
        b.gain,
        b.initial_power_w,
    );

    let r = &cfg.reserve_generator;
    let reserve = GovernorGenerator::with_initial_power(
        r.max_power_w,
        r.setpoint_hz,
        f_nom,
        r.droop_pct,
        r.gain,
        r.initial_power_w,
    );

    let grid = GridFrequencyModel::new(cfg.grid.capacity_w, cfg.grid.inertia_h_s, f_nom);

    let wind = match &cfg.wind.path {
        Some(path) => Some(WindSeries::from_csv_file(path)?),
        None => None,
    };

    info!(
        dishwashers = cfg.fleet.size,
        multiplier = cfg.fleet.multiplier,
        policy = cfg.fleet.policy.name(),
        base_load_w = cfg.grid.base_load_w,
        reserve_w = r.max_power_w,
        seed = sim_config.seed,
        "scenario assembled"
    );

    Ok(Engine::new(
        sim_config,
        fleet,
        cfg.fleet.multiplier,
        cfg.grid.base_load_w,
        base,
        reserve,
        grid,
        wind,
        cfg.events.clone(),
    ))
}

/// Builds and runs a scenario, returning every tick and the KPI report.
///
/// # Errors
///
/// Propagates any error from [`build_engine`].
pub fn run_scenario(cfg: &ScenarioConfig) -> Result<SimulationResult, SimError> {
    let mut engine = build_engine(cfg)?;
    let results = engine.run();
    let kpi = KpiReport::from_results(&results, cfg.simulation.dt_s);
    Ok(SimulationResult { results, kpi })
}
