//! Dynamic-demand delay policies.
//!
//! Each policy decides two things for a [`Dishwasher`](super::Dishwasher):
//! the frequency below which a heating step is suspended, and how long the
//! appliance waits before looking at the frequency again. The state machine
//! itself lives in the dishwasher; everything here is a pure function of its
//! arguments so the four strategies cannot drift apart mechanically.

use serde::Deserialize;

/// Default frequency at or above which a delayed appliance resumes heating.
pub const DEFAULT_TURN_ON_HZ: f64 = 49.95;

/// Fixed wait used by [`DelayPolicy::FixedDelay`].
const FIXED_OFF_TIME_S: f64 = 1200.0;
/// Shortest single delay for [`DelayPolicy::SingleRandomDelay`].
const SINGLE_MIN_OFF_TIME_S: f64 = 300.0;
/// Random span added on top of the minimum single delay.
const SINGLE_MAX_OFF_TIME_S: f64 = 7200.0;
/// Upper bound of one randomised wait for [`DelayPolicy::PropRandomDelay`].
const PROP_MAX_OFF_TIME_S: f64 = 1200.0;
/// Upper bound of one randomised wait for [`DelayPolicy::PropFreqRandomDelay`].
const PROP_FREQ_MAX_OFF_TIME_S: f64 = 600.0;
/// Width of the sliding turn-off band for [`DelayPolicy::PropFreqRandomDelay`].
const PROP_FREQ_BAND_HZ: f64 = 0.1;

/// Strategy an appliance follows when grid frequency sags.
///
/// `progress` in the methods below is the heating-progress proxy
/// `elapsed_in_step / duration(step 0)`. It is measured against the first
/// step's length, not the current step's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayPolicy {
    /// Suspend for a fixed 1200 s, re-test, repeat.
    FixedDelay,
    /// Suspend once for a random 300 to 7500 s, then resume without re-testing.
    SingleRandomDelay,
    /// Suspend for a random wait that shrinks as heating progresses, re-test, repeat.
    PropRandomDelay,
    /// Like `PropRandomDelay`, but the turn-off threshold also slides with progress.
    PropFreqRandomDelay,
}

impl DelayPolicy {
    /// All policies, in declaration order.
    pub const ALL: [DelayPolicy; 4] = [
        DelayPolicy::FixedDelay,
        DelayPolicy::SingleRandomDelay,
        DelayPolicy::PropRandomDelay,
        DelayPolicy::PropFreqRandomDelay,
    ];

    /// Turn-off base frequency an appliance starts with.
    pub fn default_turn_off_hz(self) -> f64 {
        match self {
            DelayPolicy::FixedDelay | DelayPolicy::SingleRandomDelay => 49.2,
            DelayPolicy::PropRandomDelay => 49.8,
            DelayPolicy::PropFreqRandomDelay => 49.5,
        }
    }

    /// Frequency below which a heating step is suspended.
    ///
    /// For every policy except `PropFreqRandomDelay` this is `base_hz`. The
    /// sliding variant raises it by up to 0.1 Hz early in the heating step,
    /// so a cold machine sheds sooner than one that is nearly up to temperature.
    pub fn turn_off_threshold_hz(self, base_hz: f64, progress: f64) -> f64 {
        match self {
            DelayPolicy::PropFreqRandomDelay => base_hz + PROP_FREQ_BAND_HZ * (1.0 - progress),
            _ => base_hz,
        }
    }

    /// Whether computing a wait for this policy consumes a random draw.
    pub fn draws_random_wait(self) -> bool {
        !matches!(self, DelayPolicy::FixedDelay)
    }

    /// Wait before the first frequency re-test after a delay begins.
    ///
    /// `u` is a uniform [0, 1) draw; ignored by `FixedDelay`.
    pub fn initial_wait_s(self, u: f64, progress: f64) -> f64 {
        match self {
            DelayPolicy::FixedDelay => FIXED_OFF_TIME_S,
            DelayPolicy::SingleRandomDelay => u * SINGLE_MAX_OFF_TIME_S + SINGLE_MIN_OFF_TIME_S,
            DelayPolicy::PropRandomDelay => u * PROP_MAX_OFF_TIME_S * (1.0 - progress),
            DelayPolicy::PropFreqRandomDelay => u * PROP_FREQ_MAX_OFF_TIME_S * (1.0 - progress),
        }
    }

    /// Whether the policy looks at the frequency again once a wait expires.
    pub fn retests_frequency(self) -> bool {
        !matches!(self, DelayPolicy::SingleRandomDelay)
    }

    /// Wait after a re-test finds the frequency still low.
    ///
    /// Returns `None` for `SingleRandomDelay`, which never re-tests and
    /// resumes as soon as its single wait has elapsed.
    pub fn retry_wait_s(self, u: f64, progress: f64) -> Option<f64> {
        match self {
            DelayPolicy::SingleRandomDelay => None,
            other => Some(other.initial_wait_s(u, progress)),
        }
    }

    /// Short name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            DelayPolicy::FixedDelay => "fixed_delay",
            DelayPolicy::SingleRandomDelay => "single_random_delay",
            DelayPolicy::PropRandomDelay => "prop_random_delay",
            DelayPolicy::PropFreqRandomDelay => "prop_freq_random_delay",
        }
    }
}
