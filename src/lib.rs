//! Grid frequency simulator with frequency-responsive dishwasher demand.
//!
//! A fleet of simulated dishwashers postpones heating while grid frequency
//! is low. The fleet is coupled to droop-governed generators and a lumped
//! inertia model of the grid, so the effect of that dynamic demand on a
//! frequency excursion can be compared against conventional spinning reserve.

/// TOML scenario configuration and presets.
pub mod config;
pub mod devices;
pub mod error;
/// Wind series input and CSV telemetry output.
pub mod io;
/// Scenario assembly and execution.
pub mod runner;
/// Simulation engine, generators, grid model and events.
pub mod sim;
