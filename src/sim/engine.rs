//! Simulation engine coupling the dishwasher fleet to the grid frequency model.

use tracing::{debug, info};

use crate::devices::{Device, DeviceContext, DishwasherFleet};
use crate::io::wind::WindSeries;

use super::clock::{Clock, Tick};
use super::event::{EventSchedule, GeneratorId, GridAction, GridEvent};
use super::generator::GovernorGenerator;
use super::grid::GridFrequencyModel;
use super::power_balance::surplus_w;
use super::types::{SimConfig, StepResult};

/// Simulation engine owning the fleet, generators, grid and event schedule.
///
/// Holds typed fields rather than trait objects since the plant set is
/// fixed. Every tick uses the frequency left by the previous tick: demand
/// and governor response are computed first, then the frequency is updated
/// from the resulting surplus.
pub struct Engine {
    config: SimConfig,
    fleet: DishwasherFleet,
    multiplier: f64,
    base_load_w: f64,
    base: GovernorGenerator,
    reserve: GovernorGenerator,
    grid: GridFrequencyModel,
    wind: Option<WindSeries>,
    events: EventSchedule,
}

impl Engine {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation timing
    /// * `fleet` - Simulated dishwasher population
    /// * `multiplier` - Real appliances represented by each simulated one
    /// * `base_load_w` - Fixed, non-dishwasher demand in watts
    /// * `base` - Base-load generator
    /// * `reserve` - Spinning reserve generator
    /// * `grid` - Grid inertia and frequency state
    /// * `wind` - Optional wind infeed series
    /// * `events` - Scheduled grid events
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        config: SimConfig,
        fleet: DishwasherFleet,
        multiplier: f64,
        base_load_w: f64,
        base: GovernorGenerator,
        reserve: GovernorGenerator,
        grid: GridFrequencyModel,
        wind: Option<WindSeries>,
        events: Vec<GridEvent>,
    ) -> Self {
        Self {
            config,
            fleet,
            multiplier,
            base_load_w,
            base,
            reserve,
            grid,
            wind,
            events: EventSchedule::new(events),
        }
    }

    /// Executes one simulation tick and returns the result.
    ///
    /// # Arguments
    ///
    /// * `tick` - Tick index and the simulation time at its end
    pub fn step(&mut self, tick: Tick) -> StepResult {
        let dt = self.config.dt_s;
        let f = self.grid.frequency_hz();
        let f_nom = self.grid.nominal_hz();

        // 1. Demand at the stale frequency
        let context = DeviceContext::new(f, dt);
        let dishwasher_w = self.fleet.power_w(&context) * self.multiplier;
        let load_w = self.base_load_w + dishwasher_w;

        // 2. Supply
        let wind_w = self
            .wind
            .as_mut()
            .map_or(0.0, |w| w.power_at(tick.time_s));
        let base_w = self.base.current_power(f, dt);
        let reserve_w = self.reserve.current_power(f, dt);

        // 3. Damping acts on the fixed load only
        let released_w = self.grid.released_power(self.base_load_w, f, f_nom);

        // 4. Swing equation
        let surplus = surplus_w(base_w + reserve_w, released_w, load_w, wind_w);
        let frequency_hz = self.grid.advance(surplus, dt);

        let result = StepResult {
            timestep: tick.index,
            time_s: tick.time_s,
            frequency_hz,
            surplus_w: surplus,
            released_w,
            reserve_w,
            base_w,
            base_max_w: self.base.max_power_w(),
            base_load_w: self.base_load_w,
            dishwasher_w,
            wind_w,
            pct_heating: self.fleet.pct_on_heating_load(),
            pct_delayed: self.fleet.pct_delayed(),
            max_total_delay_s: self.fleet.max_total_delay_s(),
        };

        // 5. Events take effect from the next tick
        for event in self.events.take_due(tick.time_s) {
            debug!(time_s = tick.time_s, at_s = event.at_s, action = ?event.action, "grid event fired");
            self.apply(event.action);
        }

        result
    }

    fn generator_mut(&mut self, id: GeneratorId) -> &mut GovernorGenerator {
        match id {
            GeneratorId::Base => &mut self.base,
            GeneratorId::Reserve => &mut self.reserve,
        }
    }

    fn apply(&mut self, action: GridAction) {
        match action {
            GridAction::Trip { generator, lost_w } => {
                let g = self.generator_mut(generator);
                let current = (g.current_power_w() - lost_w).max(0.0);
                let max = g.max_power_w() - lost_w;
                g.override_current_power(current);
                g.set_max_power(max);
            }
            GridAction::SetMaxPower { generator, power_w } => {
                self.generator_mut(generator).set_max_power(power_w);
            }
            GridAction::SetSetpoint { generator, hz } => {
                self.generator_mut(generator).set_setpoint(hz);
            }
            GridAction::SetGain { generator, gain } => {
                self.generator_mut(generator).set_gain(gain);
            }
            GridAction::LoadStep { delta_w } => {
                self.base_load_w += delta_w;
            }
        }
    }

    /// Executes all ticks and returns the complete step record vector.
    pub fn run(&mut self) -> Vec<StepResult> {
        let mut clock = Clock::new(
            self.config.start_s,
            self.config.dt_s,
            self.config.total_steps(),
        );
        info!(
            ticks = clock.remaining(),
            dt_s = clock.dt_s(),
            start_s = self.config.start_s,
            end_s = self.config.end_s,
            dishwashers = self.fleet.len(),
            events = self.events.len(),
            wind = self.wind.is_some(),
            "simulation started"
        );

        let mut results = Vec::with_capacity(clock.remaining());
        clock.run(|tick| results.push(self.step(tick)));

        info!(
            final_frequency_hz = self.grid.frequency_hz(),
            "simulation finished"
        );
        results
    }

    pub fn fleet(&self) -> &DishwasherFleet {
        &self.fleet
    }

    pub fn base_generator(&self) -> &GovernorGenerator {
        &self.base
    }

    pub fn reserve_generator(&self) -> &GovernorGenerator {
        &self.reserve
    }

    pub fn grid(&self) -> &GridFrequencyModel {
        &self.grid
    }

    /// Current fixed, non-dishwasher load.
    pub fn base_load_w(&self) -> f64 {
        self.base_load_w
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
