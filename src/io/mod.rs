//! File input and output: wind series in, telemetry out.

/// CSV export of per-tick results.
pub mod export;
/// Wind infeed series loaded from CSV.
pub mod wind;
