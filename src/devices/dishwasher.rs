use crate::devices::policy::{DEFAULT_TURN_ON_HZ, DelayPolicy};
use crate::devices::programme::{ProgrammeStep, WashProgramme};
use crate::devices::types::{Device, DeviceContext};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

/// Step power above which a step counts as heating and may be delayed.
pub const MIN_HEAT_LOAD_W: f64 = 1000.0;

/// Default cap on the accumulated delay within one wash cycle, in seconds.
pub const DEFAULT_MAX_DELAY_S: f64 = 1800.0;

/// A single dishwasher that plays its programme in a loop and sheds heating
/// steps while grid frequency is low.
///
/// The appliance is either RUNNING (the programme cursor advances with time)
/// or DELAYED (the cursor is frozen and the appliance draws nothing while it
/// waits to re-test the frequency). Only heating steps can be delayed, and
/// the total delay within one pass of the programme is capped by
/// `max_delay_s`.
///
/// # Power Flow Convention
/// Returns **positive** values (consumption).
#[derive(Debug, Clone)]
pub struct Dishwasher {
    programme: WashProgramme,
    policy: DelayPolicy,

    step_index: usize,
    elapsed_in_step_s: f64,
    total_runtime_s: f64,

    delayed: bool,
    heating: bool,
    wait_elapsed_s: f64,
    retry_threshold_s: f64,
    total_delay_s: f64,
    max_delay_s: f64,

    turn_off_hz: f64,
    turn_on_hz: f64,

    rng: StdRng,
}

impl Dishwasher {
    /// Creates a dishwasher at the start of its programme.
    ///
    /// Thresholds start at the policy defaults and the delay cap at
    /// [`DEFAULT_MAX_DELAY_S`].
    ///
    /// # Arguments
    ///
    /// * `programme` - Programme the appliance repeats
    /// * `policy` - Delay strategy
    /// * `seed` - Seed for the appliance's own retry-wait draws
    ///
    /// # Panics
    ///
    /// Panics if `programme` has no steps.
    pub fn new(programme: WashProgramme, policy: DelayPolicy, seed: u64) -> Self {
        assert!(!programme.is_empty(), "programme must have at least one step");

        Self {
            programme,
            policy,
            step_index: 0,
            elapsed_in_step_s: 0.0,
            total_runtime_s: 0.0,
            delayed: false,
            heating: false,
            wait_elapsed_s: 0.0,
            retry_threshold_s: 0.0,
            total_delay_s: 0.0,
            max_delay_s: DEFAULT_MAX_DELAY_S,
            turn_off_hz: policy.default_turn_off_hz(),
            turn_on_hz: DEFAULT_TURN_ON_HZ,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advances the appliance by `dt_s` and returns its demand in watts.
    ///
    /// `frequency_hz` is the grid frequency seen during this tick. Once the
    /// cycle's delay budget is spent no new delay starts until the programme
    /// wraps back to step 0.
    pub fn advance(&mut self, frequency_hz: f64, dt_s: f64) -> f64 {
        if self.delayed {
            self.advance_delayed(frequency_hz, dt_s)
        } else {
            self.advance_running(frequency_hz, dt_s)
        }
    }

    fn advance_running(&mut self, frequency_hz: f64, dt_s: f64) -> f64 {
        self.elapsed_in_step_s += dt_s;
        self.total_runtime_s += dt_s;
        let progress_before = self.progress();

        if self.elapsed_in_step_s > f64::from(self.current_step().duration_s) {
            self.step_index += 1;
            self.elapsed_in_step_s = 0.0;
            if self.step_index >= self.programme.len() {
                self.step_index = 0;
                self.total_delay_s = 0.0;
            }
        }

        let power_w = self.current_power_w();
        self.heating = power_w > MIN_HEAT_LOAD_W;

        let threshold_hz = self
            .policy
            .turn_off_threshold_hz(self.turn_off_hz, progress_before);

        if self.heating && frequency_hz < threshold_hz && self.total_delay_s < self.max_delay_s {
            let progress = match self.policy {
                DelayPolicy::PropFreqRandomDelay => progress_before,
                _ => self.progress(),
            };
            let u = self.draw();
            self.retry_threshold_s = self.policy.initial_wait_s(u, progress);
            self.wait_elapsed_s = 0.0;
            self.delayed = true;
            self.heating = false;
            trace!(
                policy = self.policy.name(),
                step = self.step_index,
                frequency_hz,
                retry_s = self.retry_threshold_s,
                "dishwasher delayed"
            );
            return f64::from(self.programme.step(0).power_w);
        }

        power_w
    }

    fn advance_delayed(&mut self, frequency_hz: f64, dt_s: f64) -> f64 {
        self.wait_elapsed_s += dt_s;
        self.total_delay_s += dt_s;

        if self.total_delay_s >= self.max_delay_s {
            return self.resume("delay budget spent");
        }

        if self.wait_elapsed_s > self.retry_threshold_s {
            if frequency_hz < self.turn_on_hz && self.policy.retests_frequency() {
                let u = self.draw();
                if let Some(wait_s) = self.policy.retry_wait_s(u, 0.0) {
                    self.wait_elapsed_s = 0.0;
                    self.retry_threshold_s = wait_s;
                    return 0.0;
                }
            }
            return self.resume("wait expired");
        }

        0.0
    }

    fn resume(&mut self, reason: &'static str) -> f64 {
        self.delayed = false;
        let power_w = self.current_power_w();
        self.heating = power_w > MIN_HEAT_LOAD_W;
        trace!(
            policy = self.policy.name(),
            step = self.step_index,
            total_delay_s = self.total_delay_s,
            reason,
            "dishwasher resumed"
        );
        power_w
    }

    /// Heating-progress proxy, measured against the first step's length.
    fn progress(&self) -> f64 {
        let first_s = f64::from(self.programme.step(0).duration_s);
        if first_s > 0.0 {
            self.elapsed_in_step_s / first_s
        } else {
            1.0
        }
    }

    fn draw(&mut self) -> f64 {
        if self.policy.draws_random_wait() {
            self.rng.random::<f64>()
        } else {
            0.0
        }
    }

    fn current_step(&self) -> ProgrammeStep {
        self.programme.step(self.step_index)
    }

    fn current_power_w(&self) -> f64 {
        f64::from(self.current_step().power_w)
    }

    /// Places the cursor `elapsed_s` seconds into the programme.
    ///
    /// The cursor lands on the first step whose cumulative end time exceeds
    /// `elapsed_s`. Positions at or beyond the programme's total run time
    /// leave the cursor on step 0 with the overshoot as elapsed time.
    pub fn seed_position(&mut self, elapsed_s: f64) {
        self.total_runtime_s = elapsed_s;

        let mut start_s = 0.0;
        for (index, step) in self.programme.steps().iter().enumerate() {
            let end_s = start_s + f64::from(step.duration_s);
            if elapsed_s < end_s {
                self.step_index = index;
                self.elapsed_in_step_s = elapsed_s - start_s;
                return;
            }
            start_s = end_s;
        }

        self.step_index = 0;
        self.elapsed_in_step_s = elapsed_s - start_s;
    }

    /// Replaces the turn-off base frequency.
    pub fn set_turn_off_threshold(&mut self, hz: f64) {
        self.turn_off_hz = hz;
    }

    /// Replaces the frequency at or above which a re-test resumes heating.
    pub fn set_turn_on_threshold(&mut self, hz: f64) {
        self.turn_on_hz = hz;
    }

    /// Replaces the cap on accumulated delay per wash cycle.
    pub fn set_max_delay(&mut self, seconds: f64) {
        self.max_delay_s = seconds;
    }

    pub fn programme(&self) -> &WashProgramme {
        &self.programme
    }

    pub fn policy(&self) -> DelayPolicy {
        self.policy
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn elapsed_in_step_s(&self) -> f64 {
        self.elapsed_in_step_s
    }

    pub fn total_runtime_s(&self) -> f64 {
        self.total_runtime_s
    }

    pub fn is_delayed(&self) -> bool {
        self.delayed
    }

    pub fn is_heating(&self) -> bool {
        self.heating
    }

    pub fn wait_elapsed_s(&self) -> f64 {
        self.wait_elapsed_s
    }

    pub fn retry_threshold_s(&self) -> f64 {
        self.retry_threshold_s
    }

    /// Delay accumulated since the programme last wrapped to step 0.
    pub fn total_delay_s(&self) -> f64 {
        self.total_delay_s
    }

    pub fn max_delay_s(&self) -> f64 {
        self.max_delay_s
    }

    pub fn turn_off_hz(&self) -> f64 {
        self.turn_off_hz
    }

    pub fn turn_on_hz(&self) -> f64 {
        self.turn_on_hz
    }
}

impl Device for Dishwasher {
    fn power_w(&mut self, context: &DeviceContext) -> f64 {
        self.advance(context.frequency_hz, context.dt_s)
    }

    fn device_type(&self) -> &'static str {
        "Dishwasher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::programme::ECO_PROGRAMME;
    use rstest::rstest;

    fn heat_after_idle() -> WashProgramme {
        WashProgramme::fixed(&[(100, 0), (100, 2200)])
    }

    fn run(dw: &mut Dishwasher, frequency_hz: f64, ticks: usize) -> Vec<f64> {
        (0..ticks).map(|_| dw.advance(frequency_hz, 1.0)).collect()
    }

    #[test]
    fn fixed_delay_walks_through_delay_retry_and_budget() {
        let mut dw = Dishwasher::new(heat_after_idle(), DelayPolicy::FixedDelay, 0);
        let loads = run(&mut dw, 49.0, 2002);

        // Ticks 1..=100 idle in step 0.
        assert!(loads[..100].iter().all(|&w| w == 0.0));
        // Tick 101 rolls into the heating step and is shed immediately.
        assert_eq!(loads[100], 0.0);

        let mut walker = Dishwasher::new(heat_after_idle(), DelayPolicy::FixedDelay, 0);
        run(&mut walker, 49.0, 101);
        assert!(walker.is_delayed());
        assert!(!walker.is_heating());
        assert_eq!(walker.step_index(), 1);
        assert_eq!(walker.retry_threshold_s(), 1200.0);

        // First re-test at tick 1302 finds the frequency still low.
        run(&mut walker, 49.0, 1201);
        assert!(walker.is_delayed());
        assert_eq!(walker.wait_elapsed_s(), 0.0);
        assert_eq!(walker.total_delay_s(), 1201.0);

        // Budget runs out at tick 1901.
        assert!(loads[101..1900].iter().all(|&w| w == 0.0));
        assert_eq!(loads[1900], 2200.0);

        // With the budget spent the heating step runs to the end.
        assert!(loads[1901..2001].iter().all(|&w| w == 2200.0));
        // Tick 2002 wraps to step 0 and clears the budget.
        assert_eq!(loads[2001], 0.0);
        assert!(!dw.is_delayed());
        assert_eq!(dw.step_index(), 0);
        assert_eq!(dw.total_delay_s(), 0.0);
    }

    /// Heating for 1000 s, so progress through step 0 is `elapsed / 1000`.
    fn long_heat() -> WashProgramme {
        WashProgramme::fixed(&[(1000, 2200), (100, 100)])
    }

    #[rstest]
    #[case(DelayPolicy::PropRandomDelay, 1200.0)]
    #[case(DelayPolicy::PropFreqRandomDelay, 600.0)]
    fn first_wait_scales_with_progress_and_retries_use_full_scale(
        #[case] policy: DelayPolicy,
        #[case] max_wait_s: f64,
    ) {
        let first_bound_s = max_wait_s * (1.0 - 0.9);
        let mut longest_retry_s: f64 = 0.0;

        for seed in 0..200 {
            let mut dw = Dishwasher::new(long_heat(), policy, seed);
            dw.seed_position(900.0);
            dw.advance(49.0, 1.0);
            assert!(dw.is_delayed());
            assert!(
                dw.retry_threshold_s() <= first_bound_s + 1e-9,
                "seed {seed}: first wait {} above {first_bound_s}",
                dw.retry_threshold_s()
            );

            let mut retry_s = None;
            for _ in 0..200 {
                dw.advance(49.0, 1.0);
                if dw.is_delayed() && dw.wait_elapsed_s() == 0.0 {
                    retry_s = Some(dw.retry_threshold_s());
                    break;
                }
            }
            let retry_s = retry_s.expect("low frequency should trigger a retry");
            assert!(retry_s <= max_wait_s);
            longest_retry_s = longest_retry_s.max(retry_s);
        }

        assert!(
            longest_retry_s > first_bound_s,
            "retries never exceeded {first_bound_s} (longest {longest_retry_s})"
        );
    }

    /// Seeds the cursor half a second before the end of a heating step 0 so
    /// the next one-second tick rolls into the heating step 1. Progress is
    /// then 1.005 before the roll and 0 after it.
    fn delay_across_step_boundary(policy: DelayPolicy) -> Dishwasher {
        let mut dw = Dishwasher::new(WashProgramme::fixed(&[(100, 2200), (1000, 2200)]), policy, 3);
        dw.seed_position(99.5);
        dw.advance(49.0, 1.0);
        assert!(dw.is_delayed());
        assert_eq!(dw.step_index(), 1);
        dw
    }

    #[test]
    fn prop_random_first_wait_uses_progress_after_step_change() {
        let dw = delay_across_step_boundary(DelayPolicy::PropRandomDelay);
        assert!(dw.retry_threshold_s() > 0.0);
    }

    #[test]
    fn prop_freq_first_wait_uses_progress_before_step_change() {
        let dw = delay_across_step_boundary(DelayPolicy::PropFreqRandomDelay);
        assert!(dw.retry_threshold_s() <= 0.0);
    }

    #[rstest]
    #[case(DelayPolicy::FixedDelay)]
    #[case(DelayPolicy::SingleRandomDelay)]
    #[case(DelayPolicy::PropRandomDelay)]
    #[case(DelayPolicy::PropFreqRandomDelay)]
    fn steps_at_or_below_min_heat_are_never_shed(#[case] policy: DelayPolicy) {
        let mut dw = Dishwasher::new(WashProgramme::fixed(&[(50, 1000), (50, 100)]), policy, 1);
        let loads = run(&mut dw, 45.0, 300);
        assert!(loads.iter().all(|&w| w == 1000.0 || w == 100.0));
        assert!(!dw.is_delayed());
    }

    #[rstest]
    #[case(DelayPolicy::FixedDelay)]
    #[case(DelayPolicy::SingleRandomDelay)]
    #[case(DelayPolicy::PropRandomDelay)]
    #[case(DelayPolicy::PropFreqRandomDelay)]
    fn nominal_frequency_never_delays(#[case] policy: DelayPolicy) {
        let mut dw = Dishwasher::new(WashProgramme::fixed(&ECO_PROGRAMME), policy, 2);
        for _ in 0..20_000 {
            dw.advance(50.0, 1.0);
            assert!(!dw.is_delayed());
        }
    }

    #[test]
    fn delayed_and_heating_are_exclusive() {
        let mut dw = Dishwasher::new(
            WashProgramme::fixed(&ECO_PROGRAMME),
            DelayPolicy::PropRandomDelay,
            9,
        );
        for k in 0..40_000 {
            let f = if (k / 700) % 2 == 0 { 49.6 } else { 50.0 };
            dw.advance(f, 1.0);
            assert!(!(dw.is_delayed() && dw.is_heating()));
            assert!(dw.total_delay_s() <= dw.max_delay_s());
        }
    }

    #[test]
    fn recovered_frequency_resumes_at_retest() {
        let mut dw = Dishwasher::new(heat_after_idle(), DelayPolicy::FixedDelay, 0);
        run(&mut dw, 49.0, 101);
        assert!(dw.is_delayed());

        let loads = run(&mut dw, 50.0, 1201);
        assert!(loads[..1200].iter().all(|&w| w == 0.0));
        assert_eq!(loads[1200], 2200.0);
        assert!(!dw.is_delayed());
        assert!(dw.is_heating());
    }

    #[test]
    fn single_random_delay_resumes_without_retest() {
        let mut dw = Dishwasher::new(
            WashProgramme::fixed(&[(100_000, 2200)]),
            DelayPolicy::SingleRandomDelay,
            4,
        );
        dw.set_max_delay(20_000.0);
        assert_eq!(dw.advance(49.0, 1.0), 2200.0);
        assert!(dw.is_delayed());
        let wait = dw.retry_threshold_s();
        assert!((300.0..7500.0).contains(&wait));

        let mut ticks = 0;
        while dw.is_delayed() {
            dw.advance(49.0, 1.0);
            ticks += 1;
        }
        assert_eq!(ticks as f64, wait.floor() + 1.0);
    }

    #[test]
    fn sliding_threshold_sheds_early_in_step() {
        let programme = WashProgramme::fixed(&[(100, 2200)]);

        let mut early = Dishwasher::new(programme.clone(), DelayPolicy::PropFreqRandomDelay, 5);
        early.advance(49.55, 1.0);
        assert!(early.is_delayed());

        let mut late = Dishwasher::new(programme.clone(), DelayPolicy::PropFreqRandomDelay, 5);
        late.seed_position(80.0);
        late.advance(49.55, 1.0);
        assert!(!late.is_delayed());

        let mut above = Dishwasher::new(programme, DelayPolicy::PropFreqRandomDelay, 5);
        above.advance(49.65, 1.0);
        assert!(!above.is_delayed());
    }

    #[test]
    fn zero_turn_off_threshold_disables_shedding() {
        let mut dw = Dishwasher::new(heat_after_idle(), DelayPolicy::PropRandomDelay, 3);
        dw.set_turn_off_threshold(0.0);
        run(&mut dw, 48.0, 1000);
        assert!(!dw.is_delayed());
        assert_eq!(dw.total_delay_s(), 0.0);
    }

    #[rstest]
    #[case(0.0, 0, 0.0)]
    #[case(1379.0, 0, 1379.0)]
    #[case(1380.0, 1, 0.0)]
    #[case(2500.0, 2, 280.0)]
    #[case(5699.0, 4, 899.0)]
    fn seed_position_finds_step(#[case] t: f64, #[case] step: usize, #[case] elapsed: f64) {
        let mut dw = Dishwasher::new(
            WashProgramme::fixed(&ECO_PROGRAMME),
            DelayPolicy::FixedDelay,
            0,
        );
        dw.seed_position(t);
        assert_eq!(dw.step_index(), step);
        assert_eq!(dw.elapsed_in_step_s(), elapsed);
        assert_eq!(dw.total_runtime_s(), t);
    }

    #[test]
    fn seed_position_past_end_keeps_overshoot_on_first_step() {
        let mut dw = Dishwasher::new(
            WashProgramme::fixed(&ECO_PROGRAMME),
            DelayPolicy::FixedDelay,
            0,
        );
        dw.seed_position(5800.0);
        assert_eq!(dw.step_index(), 0);
        assert_eq!(dw.elapsed_in_step_s(), 100.0);
    }

    #[test]
    fn device_trait_advances_state() {
        let mut dw = Dishwasher::new(heat_after_idle(), DelayPolicy::FixedDelay, 0);
        let ctx = DeviceContext::new(50.0, 1.0);
        for _ in 0..101 {
            dw.power_w(&ctx);
        }
        assert_eq!(dw.step_index(), 1);
        assert_eq!(dw.device_type(), "Dishwasher");
    }
}
