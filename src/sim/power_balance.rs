//! Grid power balance computation.

/// Computes the accelerating power on the grid.
///
/// All inputs are in watts and already carry their physical sign:
/// - `generated_w` - Sum of governed generator output (positive)
/// - `released_w` - Released demand (positive below nominal frequency)
/// - `load_w` - Total demand including dishwashers (positive)
/// - `injected_w` - Uncontrolled infeed such as wind (positive, 0 when absent)
///
/// This function performs pure summation with **no sign flipping**.
///
/// # Returns
///
/// Surplus power in watts (positive accelerates the grid, negative slows it)
pub fn surplus_w(generated_w: f64, released_w: f64, load_w: f64, injected_w: f64) -> f64 {
    generated_w + released_w + injected_w - load_w
}
