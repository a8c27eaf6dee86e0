//! CSV export for simulation step results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepResult;

/// Column header for CSV telemetry export. Powers are in MW.
const HEADER: &str = "time_s,frequency_hz,surplus_mw,released_mw,reserve_mw,\
                      base_mw,base_max_mw,dishwasher_mw,wind_mw,\
                      pct_heating,pct_delayed,max_total_delay_s";

/// Exports simulation results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per tick. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            format!("{:.1}", r.time_s),
            format!("{:.6}", r.frequency_hz),
            format!("{:.3}", r.surplus_w / 1e6),
            format!("{:.3}", r.released_w / 1e6),
            format!("{:.3}", r.reserve_w / 1e6),
            format!("{:.3}", r.base_w / 1e6),
            format!("{:.3}", r.base_max_w / 1e6),
            format!("{:.3}", r.dishwasher_w / 1e6),
            format!("{:.3}", r.wind_w / 1e6),
            format!("{:.2}", r.pct_heating),
            format!("{:.2}", r.pct_delayed),
            format!("{:.1}", r.max_total_delay_s),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
