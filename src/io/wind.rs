//! Wind power time series read from CSV.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::WindDataError;

/// One wind sample: infeed that applies from `time_s` onward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    pub time_s: f64,
    pub power_w: f64,
}

/// A stepwise wind infeed played back in simulation time.
///
/// The series advances at most one sample per call to
/// [`power_at`](Self::power_at), so data sampled more finely than the
/// simulation step falls behind rather than being skipped.
#[derive(Debug, Clone)]
pub struct WindSeries {
    samples: Vec<WindSample>,
    cursor: usize,
}

impl WindSeries {
    /// Builds a series from samples already in time order.
    ///
    /// Returns `None` when `samples` is empty.
    pub fn new(samples: Vec<WindSample>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self { samples, cursor: 0 })
        }
    }

    /// Reads `time_s,power_mw` rows from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns a [`WindDataError`] if the file cannot be opened, a row does
    /// not hold two numbers, or no samples are found.
    pub fn from_csv_file(path: &Path) -> Result<Self, WindDataError> {
        let file = File::open(path).map_err(|source| WindDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(file, path)
    }

    /// Reads `time_s,power_mw` rows from any reader. `path` only labels errors.
    ///
    /// There is no header row. A first row whose time field is not a number
    /// is taken to be a header and skipped.
    pub fn from_csv_reader(reader: impl Read, path: &Path) -> Result<Self, WindDataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let malformed = |row: usize, message: String| WindDataError::Malformed {
            path: path.to_path_buf(),
            row,
            message,
        };

        let mut samples = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let row = index + 1;
            let record = record.map_err(|e| malformed(row, e.to_string()))?;

            let time_field = record.get(0).unwrap_or("");
            let time_s = match time_field.parse::<f64>() {
                Ok(t) => t,
                Err(_) if index == 0 => continue,
                Err(e) => return Err(malformed(row, format!("time \"{time_field}\": {e}"))),
            };

            let power_field = record
                .get(1)
                .ok_or_else(|| malformed(row, "missing power column".to_string()))?;
            let power_mw = power_field
                .parse::<f64>()
                .map_err(|e| malformed(row, format!("power \"{power_field}\": {e}")))?;

            samples.push(WindSample {
                time_s,
                power_w: power_mw * 1e6,
            });
        }

        Self::new(samples).ok_or_else(|| WindDataError::Empty {
            path: PathBuf::from(path),
        })
    }

    /// Wind infeed in watts at simulation time `time_s`.
    ///
    /// Steps to the next sample when `time_s` has passed the current
    /// sample's time. Past the last sample the last value holds.
    pub fn power_at(&mut self, time_s: f64) -> f64 {
        if time_s > self.samples[self.cursor].time_s && self.cursor + 1 < self.samples.len() {
            self.cursor += 1;
        }
        self.samples[self.cursor].power_w
    }

    pub fn samples(&self) -> &[WindSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
