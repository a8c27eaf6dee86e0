//! Aggregate grid inertia and the swing-equation frequency update.

use std::f64::consts::TAU;

/// Default inertia constant: seconds of full-output energy stored at nominal speed.
pub const DEFAULT_INERTIA_H_S: f64 = 4.0;

/// Lumped rotating mass of the whole grid.
///
/// The moment of inertia is fixed at construction from the grid capacity
/// and inertia constant `H`:
///
/// ```text
/// I = 2 * capacity * H / (2 * pi * f_nom)^2
/// ```
///
/// Frequency then evolves by conserving rotational kinetic energy,
/// `omega' = sqrt(omega^2 + 2 * Ps * dt / I)`. A deficit large enough to
/// drive the radicand negative yields NaN; nothing here guards against it.
#[derive(Debug, Clone)]
pub struct GridFrequencyModel {
    inertia: f64,
    nominal_hz: f64,
    frequency_hz: f64,
}

impl GridFrequencyModel {
    /// Creates a grid running at its nominal frequency.
    ///
    /// # Arguments
    ///
    /// * `capacity_w` - Total generating capacity in watts
    /// * `inertia_h_s` - Inertia constant `H` in seconds
    /// * `nominal_hz` - Nominal frequency
    pub fn new(capacity_w: f64, inertia_h_s: f64, nominal_hz: f64) -> Self {
        let omega = TAU * nominal_hz;
        Self {
            inertia: 2.0 * capacity_w * inertia_h_s / (omega * omega),
            nominal_hz,
            frequency_hz: nominal_hz,
        }
    }

    /// Load released by frequency-dependent machines (damping constant 1).
    ///
    /// Positive when frequency is below nominal: slowing motors draw less,
    /// which acts like extra generation.
    pub fn released_power(&self, load_w: f64, frequency_hz: f64, nominal_hz: f64) -> f64 {
        -load_w * (frequency_hz - nominal_hz) / nominal_hz
    }

    /// Accelerating power: generation plus released demand minus load.
    pub fn surplus_power(&self, generated_w: f64, released_w: f64, load_w: f64) -> f64 {
        generated_w + released_w - load_w
    }

    /// Frequency after applying `surplus_w` for `dt_s` seconds starting from `frequency_hz`.
    pub fn new_frequency(&self, frequency_hz: f64, surplus_w: f64, dt_s: f64) -> f64 {
        let energy = 2.0 * surplus_w * dt_s / self.inertia;
        if energy == 0.0 {
            return frequency_hz;
        }
        let omega = TAU * frequency_hz;
        (omega * omega + energy).sqrt() / TAU
    }

    /// Advances the stored frequency by one step and returns it.
    pub fn advance(&mut self, surplus_w: f64, dt_s: f64) -> f64 {
        self.frequency_hz = self.new_frequency(self.frequency_hz, surplus_w, dt_s);
        self.frequency_hz
    }

    /// Moment of inertia in kg·m².
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn nominal_hz(&self) -> f64 {
        self.nominal_hz
    }

    /// Current grid frequency.
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }
}
