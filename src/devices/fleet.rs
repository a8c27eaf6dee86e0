use crate::devices::dishwasher::{DEFAULT_MAX_DELAY_S, Dishwasher};
use crate::devices::policy::DelayPolicy;
use crate::devices::programme::{ECO_PROGRAMME, STANDARD_PROGRAMME, WashProgramme};
use crate::devices::types::{Device, DeviceContext};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

/// Load above which an appliance counts as heating in fleet telemetry.
const HEATING_REPORT_W: f64 = 200.0;

/// Construction parameters for a [`DishwasherFleet`].
#[derive(Debug, Clone, PartialEq)]
pub struct FleetParams {
    /// Number of simulated appliances.
    pub size: usize,
    /// Percentage (0 to 100) of appliances running the Eco programme.
    pub eco_pct: f64,
    /// Programme jitter fraction.
    pub randomisation: f64,
    pub policy: DelayPolicy,
    /// Seed for programme choice and starting positions.
    pub selection_seed: u64,
    /// Seed for programme jitter draws.
    pub programme_seed: u64,
    /// Base seed for per-appliance retry draws; appliance `n` uses `runtime_seed + n`.
    pub runtime_seed: u64,
    pub max_delay_s: f64,
}

impl Default for FleetParams {
    fn default() -> Self {
        Self {
            size: 1000,
            eco_pct: 40.0,
            randomisation: 0.2,
            policy: DelayPolicy::PropFreqRandomDelay,
            selection_seed: 987_654_321,
            programme_seed: 42,
            runtime_seed: 7,
            max_delay_s: DEFAULT_MAX_DELAY_S,
        }
    }
}

/// A population of dishwashers advanced in lockstep.
///
/// Appliances are spread across their programmes at construction so the
/// fleet starts in a steady mix of heating and non-heating steps. Telemetry
/// is recomputed on every [`calc_load`](Self::calc_load).
#[derive(Debug, Clone)]
pub struct DishwasherFleet {
    dishwashers: Vec<Dishwasher>,
    loads_w: Vec<f64>,
    pct_on_heating_load: f64,
    pct_delayed: f64,
    max_total_delay_s: f64,
}

impl DishwasherFleet {
    /// Builds a fleet with default jitter, policy and seeds.
    pub fn new(size: usize, eco_pct: f64) -> Self {
        Self::with_params(&FleetParams {
            size,
            eco_pct,
            ..FleetParams::default()
        })
    }

    /// Builds a fleet from an explicit parameter set.
    ///
    /// For each appliance, in order: one selection draw picks the programme
    /// (Eco when `U * 100 < eco_pct`), the programme is jittered from the
    /// programme stream, and a second selection draw places the appliance
    /// uniformly within its programme.
    pub fn with_params(params: &FleetParams) -> Self {
        let mut selection_rng = StdRng::seed_from_u64(params.selection_seed);
        let mut programme_rng = StdRng::seed_from_u64(params.programme_seed);

        let mut eco_count = 0usize;
        let dishwashers: Vec<Dishwasher> = (0..params.size)
            .map(|n| {
                let eco = selection_rng.random::<f64>() * 100.0 < params.eco_pct;
                let pairs: &[(u32, u32)] = if eco {
                    eco_count += 1;
                    &ECO_PROGRAMME
                } else {
                    &STANDARD_PROGRAMME
                };
                let programme =
                    WashProgramme::randomised(pairs, params.randomisation, &mut programme_rng);
                let total_s = programme.total_run_time_s() as f64;

                let mut dw = Dishwasher::new(
                    programme,
                    params.policy,
                    params.runtime_seed.wrapping_add(n as u64),
                );
                dw.set_max_delay(params.max_delay_s);
                dw.seed_position(selection_rng.random::<f64>() * total_s);
                dw
            })
            .collect();

        debug!(
            size = params.size,
            eco = eco_count,
            policy = params.policy.name(),
            "dishwasher fleet built"
        );

        Self {
            loads_w: vec![0.0; dishwashers.len()],
            dishwashers,
            pct_on_heating_load: 0.0,
            pct_delayed: 0.0,
            max_total_delay_s: 0.0,
        }
    }

    /// Advances every appliance by `dt_s` and returns the summed demand in watts.
    ///
    /// # Arguments
    ///
    /// * `dt_s` - Tick length in seconds
    /// * `frequency_hz` - Grid frequency seen by every appliance this tick
    pub fn calc_load(&mut self, dt_s: f64, frequency_hz: f64) -> f64 {
        let mut total_w = 0.0;
        let mut heating = 0usize;
        let mut delayed = 0usize;
        let mut max_delay_s: f64 = 0.0;

        for (dw, load_w) in self.dishwashers.iter_mut().zip(self.loads_w.iter_mut()) {
            *load_w = dw.advance(frequency_hz, dt_s);
            total_w += *load_w;
            if *load_w > HEATING_REPORT_W {
                heating += 1;
            }
            if dw.is_delayed() {
                delayed += 1;
            }
            max_delay_s = max_delay_s.max(dw.total_delay_s());
        }

        let n = self.dishwashers.len();
        if n == 0 {
            self.pct_on_heating_load = 0.0;
            self.pct_delayed = 0.0;
        } else {
            self.pct_on_heating_load = 100.0 * heating as f64 / n as f64;
            self.pct_delayed = 100.0 * delayed as f64 / n as f64;
        }
        self.max_total_delay_s = max_delay_s;

        total_w
    }

    /// Sets the turn-off base frequency on every appliance.
    pub fn set_turn_off_threshold(&mut self, hz: f64) {
        for dw in &mut self.dishwashers {
            dw.set_turn_off_threshold(hz);
        }
    }

    /// Sets the turn-on frequency on every appliance.
    pub fn set_turn_on_threshold(&mut self, hz: f64) {
        for dw in &mut self.dishwashers {
            dw.set_turn_on_threshold(hz);
        }
    }

    /// Sets the per-cycle delay cap on every appliance.
    pub fn set_max_delay(&mut self, seconds: f64) {
        for dw in &mut self.dishwashers {
            dw.set_max_delay(seconds);
        }
    }

    /// Percentage of appliances drawing more than 200 W on the last tick.
    pub fn pct_on_heating_load(&self) -> f64 {
        self.pct_on_heating_load
    }

    /// Percentage of appliances delayed after the last tick.
    pub fn pct_delayed(&self) -> f64 {
        self.pct_delayed
    }

    /// Largest accumulated delay of any appliance after the last tick.
    pub fn max_total_delay_s(&self) -> f64 {
        self.max_total_delay_s
    }

    /// Per-appliance loads from the last tick.
    pub fn loads_w(&self) -> &[f64] {
        &self.loads_w
    }

    pub fn dishwashers(&self) -> &[Dishwasher] {
        &self.dishwashers
    }

    pub fn len(&self) -> usize {
        self.dishwashers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishwashers.is_empty()
    }
}

impl Device for DishwasherFleet {
    fn power_w(&mut self, context: &DeviceContext) -> f64 {
        self.calc_load(context.dt_s, context.frequency_hz)
    }

    fn device_type(&self) -> &'static str {
        "DishwasherFleet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_fleet_reports_zero() {
        let mut fleet = DishwasherFleet::new(0, 40.0);
        assert!(fleet.is_empty());
        assert_eq!(fleet.calc_load(0.1, 49.0), 0.0);
        assert_eq!(fleet.pct_on_heating_load(), 0.0);
        assert_eq!(fleet.pct_delayed(), 0.0);
        assert_eq!(fleet.max_total_delay_s(), 0.0);
    }

    #[test]
    fn eco_share_follows_percentage() {
        let all_eco = DishwasherFleet::new(50, 100.0);
        assert!(all_eco.dishwashers().iter().all(|d| d.programme().len() == 5));

        let no_eco = DishwasherFleet::new(50, 0.0);
        assert!(no_eco.dishwashers().iter().all(|d| d.programme().len() == 17));
    }

    #[test]
    fn starting_positions_lie_within_programme() {
        let fleet = DishwasherFleet::new(200, 40.0);
        for dw in fleet.dishwashers() {
            let total = dw.programme().total_run_time_s() as f64;
            assert!(dw.total_runtime_s() >= 0.0 && dw.total_runtime_s() < total);
            assert!(dw.step_index() < dw.programme().len());
        }
    }

    #[test]
    fn construction_is_reproducible() {
        let mut a = DishwasherFleet::new(100, 40.0);
        let mut b = DishwasherFleet::new(100, 40.0);
        for _ in 0..2000 {
            assert_eq!(a.calc_load(1.0, 49.7), b.calc_load(1.0, 49.7));
        }
        assert_eq!(a.pct_delayed(), b.pct_delayed());
    }

    #[test]
    fn load_is_sum_of_unit_loads() {
        let mut fleet = DishwasherFleet::new(30, 40.0);
        let total = fleet.calc_load(0.1, 50.0);
        let sum: f64 = fleet.loads_w().iter().sum();
        assert_relative_eq!(total, sum);
        assert_eq!(fleet.loads_w().len(), 30);
    }

    #[test]
    fn nominal_frequency_delays_nobody() {
        let mut fleet = DishwasherFleet::new(100, 40.0);
        for _ in 0..600 {
            fleet.calc_load(1.0, 50.0);
            assert_eq!(fleet.pct_delayed(), 0.0);
        }
        assert!(fleet.pct_on_heating_load() > 0.0);
    }

    #[test]
    fn low_frequency_sheds_heating_load() {
        let mut fleet = DishwasherFleet::new(200, 40.0);
        let before = fleet.calc_load(1.0, 50.0);
        let during = fleet.calc_load(1.0, 49.0);
        assert!(during < before);
        assert!(fleet.pct_delayed() > 0.0);
        assert!(fleet.max_total_delay_s() >= 0.0);
    }

    #[test]
    fn broadcast_setters_reach_every_unit() {
        let mut fleet = DishwasherFleet::new(20, 40.0);
        fleet.set_turn_off_threshold(0.0);
        fleet.set_turn_on_threshold(49.9);
        fleet.set_max_delay(600.0);
        for dw in fleet.dishwashers() {
            assert_eq!(dw.turn_off_hz(), 0.0);
            assert_eq!(dw.turn_on_hz(), 49.9);
            assert_eq!(dw.max_delay_s(), 600.0);
        }
        for _ in 0..1000 {
            fleet.calc_load(1.0, 48.0);
            assert_eq!(fleet.pct_delayed(), 0.0);
        }
    }

    #[test]
    fn custom_params_apply_policy() {
        let fleet = DishwasherFleet::with_params(&FleetParams {
            size: 10,
            policy: DelayPolicy::FixedDelay,
            max_delay_s: 900.0,
            ..FleetParams::default()
        });
        assert!(
            fleet
                .dishwashers()
                .iter()
                .all(|d| d.policy() == DelayPolicy::FixedDelay && d.max_delay_s() == 900.0)
        );
    }
}
