//! Round-half-to-even rounding to a fixed number of decimal places, as used when rebasing
//! elution volumes.

/// Round `x` to 4 decimal places, ties to even.
///
/// `f64::round()` in the standard library always rounds halves away from zero, which does not
/// match the banker's-rounding behavior the source instrument's export format uses for volume
/// axes. This reimplements ties-to-even on the scaled value.
pub fn round4(x: f64) -> f64 {
    round_to(x, 4)
}

fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    round_half_even(x * factor) / factor
}

fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if (diff - 0.5).abs() < f64::EPSILON * x.abs().max(1.0) {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else if diff < 0.5 {
        floor
    } else {
        floor + 1.0
    }
}
