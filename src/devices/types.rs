//! Common types and traits for frequency-responsive loads.

/// Grid conditions handed to a device for one simulation tick.
///
/// # Fields
/// * `frequency_hz` - Grid frequency settled at the end of the previous tick
/// * `dt_s` - Length of this tick in seconds
#[derive(Debug, Clone, Copy)]
pub struct DeviceContext {
    pub frequency_hz: f64,
    pub dt_s: f64,
}

impl DeviceContext {
    /// Creates a new DeviceContext for one tick.
    pub fn new(frequency_hz: f64, dt_s: f64) -> Self {
        Self {
            frequency_hz,
            dt_s,
        }
    }
}

/// Trait defining a load that reacts to grid frequency.
///
/// Implementors advance their internal state by one tick and report the
/// electrical demand for that tick, so the engine can treat a single
/// appliance and a whole fleet the same way.
pub trait Device {
    /// Advances the device by `context.dt_s` and returns its demand in watts.
    ///
    /// # Arguments
    ///
    /// * `context` - Grid frequency and tick length for this step
    ///
    /// # Returns
    ///
    /// Power drawn from the grid in watts (W) during this tick
    fn power_w(&mut self, context: &DeviceContext) -> f64;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}
