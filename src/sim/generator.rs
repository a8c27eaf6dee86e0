//! Droop-governed generator with a first-order response lag.

/// A generator whose output follows a droop characteristic.
///
/// The governor computes a target from the frequency deviation and the
/// output then moves toward it with a first-order lag:
///
/// ```text
/// target  = clamp((setpoint - f) / (droop * f_nom) * max_power, 0, max_power)
/// current = current + (target - current) * gain * dt
/// ```
///
/// The lag is integrated with explicit Euler and is only stable while
/// `gain * dt < 1`; callers are responsible for that.
///
/// # Examples
///
/// ```
/// use dynamic_demand_sim::sim::generator::GovernorGenerator;
///
/// let g = GovernorGenerator::new(1.0e9, 52.0, 50.0, 4.0, 0.3);
/// assert_eq!(g.target_power(50.0), 1.0e9);
/// assert_eq!(g.target_power(52.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GovernorGenerator {
    max_power_w: f64,
    setpoint_hz: f64,
    nominal_hz: f64,
    /// Droop as a fraction (4% is stored as 0.04).
    droop: f64,
    gain: f64,
    current_power_w: f64,
    target_power_w: f64,
}

impl GovernorGenerator {
    /// Creates a generator that starts with zero output.
    ///
    /// # Arguments
    ///
    /// * `max_power_w` - Maximum output in watts
    /// * `setpoint_hz` - Frequency at which the droop target reaches zero
    /// * `nominal_hz` - Grid nominal frequency
    /// * `droop_pct` - Droop characteristic in percent
    /// * `gain` - Governor gain in 1/s
    pub fn new(
        max_power_w: f64,
        setpoint_hz: f64,
        nominal_hz: f64,
        droop_pct: f64,
        gain: f64,
    ) -> Self {
        Self::with_initial_power(max_power_w, setpoint_hz, nominal_hz, droop_pct, gain, 0.0)
    }

    /// Creates a generator already producing `initial_power_w`.
    pub fn with_initial_power(
        max_power_w: f64,
        setpoint_hz: f64,
        nominal_hz: f64,
        droop_pct: f64,
        gain: f64,
        initial_power_w: f64,
    ) -> Self {
        Self {
            max_power_w,
            setpoint_hz,
            nominal_hz,
            droop: droop_pct / 100.0,
            gain,
            current_power_w: initial_power_w,
            target_power_w: initial_power_w,
        }
    }

    /// Droop target at `frequency_hz`, bounded to `[0, max_power]`.
    pub fn target_power(&self, frequency_hz: f64) -> f64 {
        let target = (self.setpoint_hz - frequency_hz) / (self.droop * self.nominal_hz)
            * self.max_power_w;
        target.min(self.max_power_w).max(0.0)
    }

    /// Moves the output one lag step toward the droop target and returns it.
    ///
    /// # Arguments
    ///
    /// * `frequency_hz` - Grid frequency seen by the governor
    /// * `dt_s` - Step length in seconds
    pub fn current_power(&mut self, frequency_hz: f64, dt_s: f64) -> f64 {
        self.target_power_w = self.target_power(frequency_hz);
        self.current_power_w += (self.target_power_w - self.current_power_w) * self.gain * dt_s;
        self.current_power_w
    }

    /// Replaces the maximum output. Current output is left alone.
    pub fn set_max_power(&mut self, max_power_w: f64) {
        self.max_power_w = max_power_w;
    }

    pub fn set_setpoint(&mut self, setpoint_hz: f64) {
        self.setpoint_hz = setpoint_hz;
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    /// Sets the current output instantaneously, bypassing the lag.
    pub fn override_current_power(&mut self, power_w: f64) {
        self.current_power_w = power_w;
    }

    pub fn max_power_w(&self) -> f64 {
        self.max_power_w
    }

    pub fn setpoint_hz(&self) -> f64 {
        self.setpoint_hz
    }

    pub fn nominal_hz(&self) -> f64 {
        self.nominal_hz
    }

    /// Droop as a fraction.
    pub fn droop(&self) -> f64 {
        self.droop
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Output after the most recent [`current_power`](Self::current_power) call.
    pub fn current_power_w(&self) -> f64 {
        self.current_power_w
    }

    /// Target from the most recent [`current_power`](Self::current_power) call.
    pub fn target_power_w(&self) -> f64 {
        self.target_power_w
    }
}
