//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::devices::{DelayPolicy, FleetParams};
use crate::sim::event::{GeneratorId, GridAction, GridEvent};
use crate::sim::types::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the `load_step` scenario's plant.
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::from_preset`] for a built-in scenario.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and master seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Grid inertia and fixed load.
    #[serde(default)]
    pub grid: GridConfig,
    /// Dishwasher fleet parameters.
    #[serde(default)]
    pub fleet: FleetConfig,
    /// Base-load generation.
    #[serde(default)]
    pub base_generator: BaseGeneratorConfig,
    /// Spinning reserve.
    #[serde(default)]
    pub reserve_generator: ReserveGeneratorConfig,
    /// Optional wind infeed.
    #[serde(default)]
    pub wind: WindConfig,
    /// Scheduled grid events.
    #[serde(default)]
    pub events: Vec<GridEvent>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Tick length in seconds (must be > 0).
    pub dt_s: f64,
    /// Time before the first tick (s). Negative values let the fleet settle.
    pub start_s: f64,
    /// End of the run (s).
    pub end_s: f64,
    /// Master random seed; seeds each dishwasher's retry draws.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_s: 0.1,
            start_s: -200.0,
            end_s: 15_000.0,
            seed: 7,
        }
    }
}

impl SimulationConfig {
    /// Timing configuration for the engine.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.dt_s, self.start_s, self.end_s, self.seed)
    }
}

/// Grid inertia and fixed load.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Nominal frequency (Hz).
    pub nominal_hz: f64,
    /// Inertia constant `H` (s).
    pub inertia_h_s: f64,
    /// Capacity used for the grid's moment of inertia (W).
    pub capacity_w: f64,
    /// Fixed, non-dishwasher load (W).
    pub base_load_w: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nominal_hz: 50.0,
            inertia_h_s: 4.0,
            capacity_w: 30e9 + 1.32e9 + 1.32e9,
            base_load_w: 28.68e9,
        }
    }
}

/// Dishwasher fleet parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FleetConfig {
    /// Number of simulated dishwashers.
    pub size: usize,
    /// Percentage running the Eco programme (0 to 100).
    pub eco_pct: f64,
    /// Real appliances represented by each simulated one.
    pub multiplier: f64,
    /// Programme jitter fraction (0 to 1).
    pub randomisation: f64,
    pub policy: DelayPolicy,
    /// Turn-off base frequency; the policy default when absent. 0 disables shedding.
    pub turn_off_hz: Option<f64>,
    /// Turn-on frequency; the policy default when absent.
    pub turn_on_hz: Option<f64>,
    pub selection_seed: u64,
    pub programme_seed: u64,
    /// Cap on accumulated delay per wash cycle (s).
    pub max_delay_s: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        let params = FleetParams::default();
        Self {
            size: params.size,
            eco_pct: params.eco_pct,
            multiplier: 1280.0,
            randomisation: params.randomisation,
            policy: params.policy,
            turn_off_hz: None,
            turn_on_hz: None,
            selection_seed: params.selection_seed,
            programme_seed: params.programme_seed,
            max_delay_s: params.max_delay_s,
        }
    }
}

impl FleetConfig {
    /// Fleet construction parameters, with `runtime_seed` as the per-appliance seed base.
    pub fn params(&self, runtime_seed: u64) -> FleetParams {
        FleetParams {
            size: self.size,
            eco_pct: self.eco_pct,
            randomisation: self.randomisation,
            policy: self.policy,
            selection_seed: self.selection_seed,
            programme_seed: self.programme_seed,
            runtime_seed,
            max_delay_s: self.max_delay_s,
        }
    }
}

/// Base-load generator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseGeneratorConfig {
    /// Maximum output (W).
    pub max_power_w: f64,
    /// Droop setpoint (Hz).
    pub setpoint_hz: f64,
    /// Droop (%).
    pub droop_pct: f64,
    /// Governor gain (1/s).
    pub gain: f64,
    /// Output at the start of the run (W).
    pub initial_power_w: f64,
}

impl Default for BaseGeneratorConfig {
    fn default() -> Self {
        Self {
            max_power_w: 30e9,
            setpoint_hz: 52.0,
            droop_pct: 4.0,
            gain: 0.0067,
            initial_power_w: 30e9,
        }
    }
}

/// Spinning reserve parameters. Same fields as [`BaseGeneratorConfig`],
/// defaulting to a reserve that starts idle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReserveGeneratorConfig {
    pub max_power_w: f64,
    pub setpoint_hz: f64,
    pub droop_pct: f64,
    pub gain: f64,
    pub initial_power_w: f64,
}

impl Default for ReserveGeneratorConfig {
    fn default() -> Self {
        Self {
            max_power_w: 0.0,
            setpoint_hz: 50.0,
            droop_pct: 4.0,
            gain: 0.3,
            initial_power_w: 0.0,
        }
    }
}

/// Wind infeed source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    /// CSV of `time_s,power_mw` rows. Relative paths in a scenario file are
    /// resolved against the file's directory.
    pub path: Option<PathBuf>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.dt_s"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the load-step preset.
    ///
    /// A 1.32 GW unit trips at t = 0 with no spinning reserve; dynamic demand
    /// holds the line until secondary response restores capacity at 120 s.
    pub fn load_step() -> Self {
        Self {
            fleet: reference_fleet(),
            events: trip_and_restore_events(),
            ..Self::default()
        }
    }

    /// Returns the spinning-reserve preset.
    ///
    /// The same trip, covered by 3.3 GW of spinning reserve with dynamic
    /// demand switched off, for comparison with [`load_step`](Self::load_step).
    pub fn spinning_reserve() -> Self {
        Self {
            fleet: FleetConfig {
                turn_off_hz: Some(0.0),
                ..FleetConfig::default()
            },
            reserve_generator: ReserveGeneratorConfig {
                max_power_w: 3.3e9,
                ..ReserveGeneratorConfig::default()
            },
            events: trip_and_restore_events(),
            ..Self::default()
        }
    }

    /// Returns the steady-state preset: no events, a short run.
    pub fn steady_state() -> Self {
        Self {
            simulation: SimulationConfig {
                end_s: 600.0,
                ..SimulationConfig::default()
            },
            fleet: reference_fleet(),
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["load_step", "spinning_reserve", "steady_state"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "load_step" => Ok(Self::load_step()),
            "spinning_reserve" => Ok(Self::spinning_reserve()),
            "steady_state" => Ok(Self::steady_state()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;

        if let (Some(wind), Some(dir)) = (cfg.wind.path.as_mut(), path.parent()) {
            if wind.is_relative() {
                *wind = dir.join(&*wind);
            }
        }
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let s = &self.simulation;
        check(s.dt_s > 0.0, "simulation.dt_s", "must be > 0");
        check(
            s.end_s > s.start_s,
            "simulation.end_s",
            "must be > simulation.start_s",
        );

        let g = &self.grid;
        check(g.nominal_hz > 0.0, "grid.nominal_hz", "must be > 0");
        check(g.inertia_h_s > 0.0, "grid.inertia_h_s", "must be > 0");
        check(g.capacity_w > 0.0, "grid.capacity_w", "must be > 0");

        let fl = &self.fleet;
        check(
            (0.0..=100.0).contains(&fl.eco_pct),
            "fleet.eco_pct",
            "must be in [0, 100]",
        );
        check(
            (0.0..=1.0).contains(&fl.randomisation),
            "fleet.randomisation",
            "must be in [0.0, 1.0]",
        );
        check(fl.multiplier >= 0.0, "fleet.multiplier", "must be >= 0");
        check(fl.max_delay_s >= 0.0, "fleet.max_delay_s", "must be >= 0");
        check(
            fl.turn_on_hz.is_none_or(|hz| hz >= 0.0),
            "fleet.turn_on_hz",
            "must be >= 0",
        );

        let base = &self.base_generator;
        let reserve = &self.reserve_generator;
        for (name, droop_pct, gain, max_power_w) in [
            (
                "base_generator",
                base.droop_pct,
                base.gain,
                base.max_power_w,
            ),
            (
                "reserve_generator",
                reserve.droop_pct,
                reserve.gain,
                reserve.max_power_w,
            ),
        ] {
            check(droop_pct > 0.0, &format!("{name}.droop_pct"), "must be > 0");
            check(gain >= 0.0, &format!("{name}.gain"), "must be >= 0");
            check(
                gain * s.dt_s < 1.0,
                &format!("{name}.gain"),
                "gain * simulation.dt_s must be < 1 for a stable governor",
            );
            check(
                max_power_w >= 0.0,
                &format!("{name}.max_power_w"),
                "must be >= 0",
            );
        }

        for (i, event) in self.events.iter().enumerate() {
            check(
                event.at_s.is_finite(),
                &format!("events[{i}].at_s"),
                "must be a finite time",
            );
        }

        errors
    }
}

/// Default fleet with the 49.8 Hz turn-off and 49.95 Hz turn-on thresholds
/// of the reference trip studies.
fn reference_fleet() -> FleetConfig {
    FleetConfig {
        turn_off_hz: Some(49.8),
        turn_on_hz: Some(49.95),
        ..FleetConfig::default()
    }
}

/// Loss of a 1.32 GW unit at the end of the first tick after t = 0, and the
/// secondary response restoring base capacity two minutes later.
fn trip_and_restore_events() -> Vec<GridEvent> {
    let base = BaseGeneratorConfig::default();
    vec![
        GridEvent::new(
            SimulationConfig::default().dt_s,
            GridAction::Trip {
                generator: GeneratorId::Base,
                lost_w: 1.32e9,
            },
        ),
        GridEvent::new(
            120.0,
            GridAction::SetMaxPower {
                generator: GeneratorId::Base,
                power_w: base.max_power_w,
            },
        ),
    ]
}
