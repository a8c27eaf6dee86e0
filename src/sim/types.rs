//! Core simulation types: timing configuration and per-tick records.

use std::fmt;

/// Centralized simulation timing configuration.
///
/// # Examples
///
/// ```
/// use dynamic_demand_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(0.1, -200.0, 100.0, 7);
/// assert_eq!(cfg.total_steps(), 3000);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Tick length in seconds.
    pub dt_s: f64,
    /// Simulation time before the first tick, in seconds. Negative values
    /// give the fleet a settling period before events at t = 0.
    pub start_s: f64,
    /// Simulation time at which the run stops, in seconds.
    pub end_s: f64,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Panics
    ///
    /// Panics if `dt_s` is not positive or `end_s` is not after `start_s`.
    pub fn new(dt_s: f64, start_s: f64, end_s: f64, seed: u64) -> Self {
        assert!(dt_s > 0.0, "dt_s must be > 0");
        assert!(end_s > start_s, "end_s must be after start_s");
        Self {
            dt_s,
            start_s,
            end_s,
            seed,
        }
    }

    /// Number of ticks between `start_s` and `end_s`.
    pub fn total_steps(&self) -> usize {
        ((self.end_s - self.start_s) / self.dt_s).round() as usize
    }
}

/// Complete record of one simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Tick index.
    pub timestep: usize,
    /// Simulation time at the end of the tick (s).
    pub time_s: f64,
    /// Grid frequency after the tick (Hz).
    pub frequency_hz: f64,
    /// Accelerating power applied during the tick (W; negative = deficit).
    pub surplus_w: f64,
    /// Released demand (W).
    pub released_w: f64,
    /// Spinning reserve output (W).
    pub reserve_w: f64,
    /// Base generator output (W).
    pub base_w: f64,
    /// Base generator maximum output at the end of the tick (W).
    pub base_max_w: f64,
    /// Fixed, non-dishwasher load (W).
    pub base_load_w: f64,
    /// Scaled dishwasher demand (W).
    pub dishwasher_w: f64,
    /// Wind infeed (W).
    pub wind_w: f64,
    /// Percent of simulated dishwashers drawing heating load.
    pub pct_heating: f64,
    /// Percent of simulated dishwashers currently delayed.
    pub pct_delayed: f64,
    /// Largest accumulated delay of any dishwasher (s).
    pub max_total_delay_s: f64,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>9.1}s | f={:>8.4} Hz  surplus={:>9.2} MW | base={:>9.2}  rsv={:>8.2}  \
             dw={:>8.2}  wind={:>8.2} MW | heating={:>5.1}%  delayed={:>5.1}%  maxdelay={:>6.1}s",
            self.time_s,
            self.frequency_hz,
            self.surplus_w / 1e6,
            self.base_w / 1e6,
            self.reserve_w / 1e6,
            self.dishwasher_w / 1e6,
            self.wind_w / 1e6,
            self.pct_heating,
            self.pct_delayed,
            self.max_total_delay_s,
        )
    }
}
