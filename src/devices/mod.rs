//! Frequency-responsive appliance models.

/// Dishwasher state machine with frequency-triggered delays.
pub mod dishwasher;
/// Population of dishwashers with aggregate telemetry.
pub mod fleet;
/// Delay strategies and their thresholds and waits.
pub mod policy;
/// Wash programme step tables and jitter.
pub mod programme;
pub mod types;

// Re-export the main types for convenience
pub use dishwasher::Dishwasher;
pub use fleet::{DishwasherFleet, FleetParams};
pub use policy::DelayPolicy;
pub use programme::{ProgrammeStep, WashProgramme};
pub use types::Device;
pub use types::DeviceContext;
