//! Wash programmes: ordered (duration, power) step tables.

use rand::Rng;

/// "Eco" 50C programme: cold pre-wash, main wash, cold rinse, hot rinse, drying.
pub const ECO_PROGRAMME: [(u32, u32); 5] = [
    (23 * 60, 100),
    (14 * 60, 2200),
    (28 * 60, 100),
    (15 * 60, 2200),
    (15 * 60, 0),
];

/// Standard 65C programme: pre-wash, main wash, two warm rinses, hot rinse, drying.
pub const STANDARD_PROGRAMME: [(u32, u32); 17] = [
    (10 * 60, 100),
    (12 * 60, 2200),
    (4 * 60, 100),
    (5 * 60, 2200),
    (5 * 60, 100),
    (4 * 60, 2200),
    (3 * 60, 100),
    (4 * 60, 2200),
    (3 * 60, 100),
    (15 * 60, 2200),
    (2 * 60, 100),
    (60, 2200),
    (2 * 60, 100),
    (60, 2200),
    (2 * 60, 100),
    (60, 2200),
    (15 * 60, 0),
];

/// A single step of a wash programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammeStep {
    /// Step length in seconds.
    pub duration_s: u32,
    /// Power drawn during the step in watts.
    pub power_w: u32,
}

/// An immutable wash programme template.
///
/// Each step's duration and power may be jittered once at construction time;
/// after that the programme never changes. Playback position is tracked by
/// the owning [`Dishwasher`](super::Dishwasher), not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WashProgramme {
    steps: Vec<ProgrammeStep>,
    total_run_time_s: u64,
}

impl WashProgramme {
    /// Builds a programme exactly as given, with no jitter.
    pub fn fixed(pairs: &[(u32, u32)]) -> Self {
        let steps: Vec<ProgrammeStep> = pairs
            .iter()
            .map(|&(duration_s, power_w)| ProgrammeStep {
                duration_s,
                power_w,
            })
            .collect();
        Self::from_steps(steps)
    }

    /// Builds a programme with each field jittered by up to `±randomisation/2`.
    ///
    /// For every pair the duration is jittered first, then the power, each
    /// with a fresh uniform draw from `rng`:
    ///
    /// ```text
    /// v' = v - v * r/2 + v * r * U,   U ~ [0, 1)
    /// ```
    ///
    /// and rounded to the nearest integer inside `[v(1 - r/2), v(1 + r/2)]`.
    /// A `randomisation` of zero takes no draws and reproduces `pairs`.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Ordered `(duration_s, power_w)` pairs
    /// * `randomisation` - Jitter fraction `r` (0.2 means ±10%)
    /// * `rng` - Generator shared by every programme built from the same source
    pub fn randomised<R: Rng>(pairs: &[(u32, u32)], randomisation: f64, rng: &mut R) -> Self {
        if randomisation == 0.0 {
            return Self::fixed(pairs);
        }

        let steps: Vec<ProgrammeStep> = pairs
            .iter()
            .map(|&(duration_s, power_w)| {
                let duration_s = jitter(duration_s, randomisation, rng.random::<f64>());
                let power_w = jitter(power_w, randomisation, rng.random::<f64>());
                ProgrammeStep {
                    duration_s,
                    power_w,
                }
            })
            .collect();
        Self::from_steps(steps)
    }

    fn from_steps(steps: Vec<ProgrammeStep>) -> Self {
        let total_run_time_s = steps.iter().map(|s| u64::from(s.duration_s)).sum();
        Self {
            steps,
            total_run_time_s,
        }
    }

    /// Returns the programme steps in order.
    pub fn steps(&self) -> &[ProgrammeStep] {
        &self.steps
    }

    /// Returns the step at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn step(&self, index: usize) -> ProgrammeStep {
        self.steps[index]
    }

    /// Number of steps in the programme.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` for a programme with no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step durations in seconds.
    pub fn total_run_time_s(&self) -> u64 {
        self.total_run_time_s
    }
}

/// Applies the symmetric jitter to one integer field.
fn jitter(nominal: u32, randomisation: f64, u: f64) -> u32 {
    let v = f64::from(nominal);
    let half = v * randomisation / 2.0;
    let lo = (v - half).max(0.0).ceil();
    let hi = (v + half).floor();
    let jittered = (v - half + v * randomisation * u).round();
    jittered.clamp(lo, hi) as u32
}
