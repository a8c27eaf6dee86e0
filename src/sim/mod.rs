/// Simulation clock for timestep management.
pub mod clock;
pub mod engine;
/// Scheduled grid events (trips, secondary response, load steps).
pub mod event;
/// Droop-governed generator model.
pub mod generator;
/// Grid inertia and frequency model.
pub mod grid;
pub mod kpi;
pub mod power_balance;
pub mod types;
