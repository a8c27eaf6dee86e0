//! Fleet and grid properties that hold independently of any scenario.

use approx::assert_relative_eq;
use dynamic_demand_sim::devices::{DelayPolicy, DishwasherFleet, FleetParams};
use dynamic_demand_sim::sim::generator::GovernorGenerator;
use dynamic_demand_sim::sim::grid::GridFrequencyModel;
use dynamic_demand_sim::sim::power_balance::surplus_w;

#[test]
fn larger_fleet_extends_a_smaller_one() {
    let mut small = DishwasherFleet::new(10, 40.0);
    let mut large = DishwasherFleet::new(20, 40.0);

    for _ in 0..600 {
        small.calc_load(1.0, 49.0);
        large.calc_load(1.0, 49.0);
        assert_eq!(small.loads_w(), &large.loads_w()[..10]);
    }
}

#[test]
fn heating_share_counts_only_loads_above_200_w() {
    let mut fleet = DishwasherFleet::new(1000, 0.0);
    for _ in 0..50 {
        fleet.calc_load(6.0, 50.0);
        let heating = fleet.loads_w().iter().filter(|&&w| w > 200.0).count();
        assert_relative_eq!(
            fleet.pct_on_heating_load(),
            100.0 * heating as f64 / 1000.0,
            epsilon = 1e-9
        );
    }
}

#[test]
fn nominal_frequency_fleet_never_delays() {
    for policy in DelayPolicy::ALL {
        let mut fleet = DishwasherFleet::with_params(&FleetParams {
            size: 50,
            policy,
            ..FleetParams::default()
        });
        for _ in 0..200 {
            fleet.calc_load(1.0, 50.0);
            assert_eq!(fleet.pct_delayed(), 0.0, "{} delayed at 50 Hz", policy.name());
        }
        assert_eq!(fleet.max_total_delay_s(), 0.0);
    }
}

#[test]
fn low_frequency_delays_heating_appliances() {
    let mut fleet = DishwasherFleet::new(200, 40.0);
    fleet.calc_load(0.1, 50.0);
    let heating_before = fleet.pct_on_heating_load();
    assert!(heating_before > 0.0);

    fleet.calc_load(0.1, 48.0);
    assert!(fleet.pct_delayed() > 0.0);
    assert!(fleet.pct_on_heating_load() < heating_before);
}

#[test]
fn balanced_grid_holds_nominal_frequency() {
    let mut grid = GridFrequencyModel::new(31.0e9, 4.0, 50.0);
    for _ in 0..100 {
        assert_eq!(grid.advance(0.0, 0.1), 50.0);
    }
}

#[test]
fn deficit_lowers_and_surplus_raises_frequency() {
    let grid = GridFrequencyModel::new(31.0e9, 4.0, 50.0);
    assert!(grid.new_frequency(50.0, -1.0e9, 0.1) < 50.0);
    assert!(grid.new_frequency(50.0, 1.0e9, 0.1) > 50.0);
}

#[test]
fn governor_and_grid_settle_after_a_deficit() {
    let mut grid = GridFrequencyModel::new(31.0e9, 4.0, 50.0);
    let mut generator = GovernorGenerator::with_initial_power(30.0e9, 52.0, 50.0, 4.0, 0.3, 28.0e9);
    let load_w = 28.5e9;

    let mut f = grid.frequency_hz();
    for _ in 0..6000 {
        let generated = generator.current_power(f, 0.1);
        let released = grid.released_power(load_w, f, 50.0);
        f = grid.advance(surplus_w(generated, released, load_w, 0.0), 0.1);
    }

    // Droop and damping share the imbalance, so frequency settles just above 50 Hz.
    assert!(f > 50.0 && f < 50.1, "settled at {f}");
    assert_relative_eq!(generator.current_power_w(), generator.target_power(f), max_relative = 1e-3);
}
