//! Post-hoc KPI computation from simulation results.

use std::fmt;

use super::types::StepResult;

/// Frequency below which time is counted as a low-frequency excursion.
pub const LOW_FREQUENCY_HZ: f64 = 49.5;

/// Aggregate key performance indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<StepResult>` to ensure consistency between
/// step data and reported metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    /// Lowest frequency reached (Hz).
    pub nadir_hz: f64,
    /// Time of the nadir (s).
    pub nadir_time_s: f64,
    /// Highest frequency reached (Hz).
    pub peak_hz: f64,
    /// Frequency after the last tick (Hz).
    pub final_hz: f64,
    /// Total time spent below [`LOW_FREQUENCY_HZ`] (s).
    pub seconds_below_49_5: f64,
    /// Smallest scaled dishwasher demand (W).
    pub min_dishwasher_w: f64,
    /// Largest scaled dishwasher demand (W).
    pub max_dishwasher_w: f64,
    /// Largest spinning reserve output (W).
    pub peak_reserve_w: f64,
    /// Largest percentage of dishwashers delayed at once.
    pub peak_pct_delayed: f64,
    /// Largest accumulated delay of any dishwasher (s).
    pub max_total_delay_s: f64,
}

impl KpiReport {
    /// Computes all KPIs from the complete step record vector.
    ///
    /// # Arguments
    ///
    /// * `results` - Complete simulation step results
    /// * `dt_s` - Tick length in seconds
    ///
    /// # Returns
    ///
    /// A `KpiReport` with all fields populated, all zero for an empty run.
    pub fn from_results(results: &[StepResult], dt_s: f64) -> Self {
        let Some(first) = results.first() else {
            return Self {
                nadir_hz: 0.0,
                nadir_time_s: 0.0,
                peak_hz: 0.0,
                final_hz: 0.0,
                seconds_below_49_5: 0.0,
                min_dishwasher_w: 0.0,
                max_dishwasher_w: 0.0,
                peak_reserve_w: 0.0,
                peak_pct_delayed: 0.0,
                max_total_delay_s: 0.0,
            };
        };

        let mut report = Self {
            nadir_hz: first.frequency_hz,
            nadir_time_s: first.time_s,
            peak_hz: first.frequency_hz,
            final_hz: first.frequency_hz,
            seconds_below_49_5: 0.0,
            min_dishwasher_w: first.dishwasher_w,
            max_dishwasher_w: first.dishwasher_w,
            peak_reserve_w: first.reserve_w,
            peak_pct_delayed: first.pct_delayed,
            max_total_delay_s: first.max_total_delay_s,
        };

        for r in results {
            if r.frequency_hz < report.nadir_hz {
                report.nadir_hz = r.frequency_hz;
                report.nadir_time_s = r.time_s;
            }
            report.peak_hz = report.peak_hz.max(r.frequency_hz);
            if r.frequency_hz < LOW_FREQUENCY_HZ {
                report.seconds_below_49_5 += dt_s;
            }
            report.min_dishwasher_w = report.min_dishwasher_w.min(r.dishwasher_w);
            report.max_dishwasher_w = report.max_dishwasher_w.max(r.dishwasher_w);
            report.peak_reserve_w = report.peak_reserve_w.max(r.reserve_w);
            report.peak_pct_delayed = report.peak_pct_delayed.max(r.pct_delayed);
            report.max_total_delay_s = report.max_total_delay_s.max(r.max_total_delay_s);
            report.final_hz = r.frequency_hz;
        }

        report
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(
            f,
            "Frequency nadir:       {:.4} Hz at t={:.1} s",
            self.nadir_hz, self.nadir_time_s
        )?;
        writeln!(f, "Peak frequency:        {:.4} Hz", self.peak_hz)?;
        writeln!(f, "Final frequency:       {:.4} Hz", self.final_hz)?;
        writeln!(f, "Time below 49.5 Hz:    {:.1} s", self.seconds_below_49_5)?;
        writeln!(
            f,
            "Dishwasher demand:     {:.2} - {:.2} MW",
            self.min_dishwasher_w / 1e6,
            self.max_dishwasher_w / 1e6
        )?;
        writeln!(f, "Peak reserve output:   {:.2} MW", self.peak_reserve_w / 1e6)?;
        writeln!(f, "Peak delayed:          {:.1}%", self.peak_pct_delayed)?;
        write!(f, "Max total delay:       {:.1} s", self.max_total_delay_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_result(k: usize, frequency_hz: f64, dishwasher_w: f64) -> StepResult {
        StepResult {
            timestep: k,
            time_s: k as f64,
            frequency_hz,
            surplus_w: 0.0,
            released_w: 0.0,
            reserve_w: 1e8 * k as f64,
            base_w: 30e9,
            base_max_w: 30e9,
            base_load_w: 28.68e9,
            dishwasher_w,
            wind_w: 0.0,
            pct_heating: 40.0,
            pct_delayed: k as f64,
            max_total_delay_s: 10.0 * k as f64,
        }
    }

    #[test]
    fn empty_results_give_zeros() {
        let kpi = KpiReport::from_results(&[], 0.1);
        assert_eq!(kpi.nadir_hz, 0.0);
        assert_eq!(kpi.seconds_below_49_5, 0.0);
        assert_eq!(kpi.max_total_delay_s, 0.0);
    }

    #[test]
    fn nadir_peak_and_final() {
        let results = vec![
            make_result(0, 50.0, 1.3e9),
            make_result(1, 49.4, 1.1e9),
            make_result(2, 49.2, 0.9e9),
            make_result(3, 49.7, 1.0e9),
            make_result(4, 50.1, 1.4e9),
        ];
        let kpi = KpiReport::from_results(&results, 1.0);
        assert_eq!(kpi.nadir_hz, 49.2);
        assert_eq!(kpi.nadir_time_s, 2.0);
        assert_eq!(kpi.peak_hz, 50.1);
        assert_eq!(kpi.final_hz, 50.1);
        assert_relative_eq!(kpi.seconds_below_49_5, 2.0);
        assert_eq!(kpi.min_dishwasher_w, 0.9e9);
        assert_eq!(kpi.max_dishwasher_w, 1.4e9);
        assert_relative_eq!(kpi.peak_reserve_w, 4e8);
        assert_eq!(kpi.peak_pct_delayed, 4.0);
        assert_eq!(kpi.max_total_delay_s, 40.0);
    }

    #[test]
    fn display_contains_all_sections() {
        let kpi = KpiReport::from_results(&[make_result(0, 49.9, 1e9)], 0.1);
        let s = format!("{kpi}");
        assert!(s.contains("KPI Report"));
        assert!(s.contains("Frequency nadir"));
        assert!(s.contains("Max total delay"));
    }
}
