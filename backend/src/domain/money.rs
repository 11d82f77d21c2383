/// Amounts closer than this are treated as equal
pub const CENT_EPSILON: f64 = 0.005;

/// Round to two decimal places
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Round to two decimal places, never going above `amount`
pub fn floor_cents(amount: f64) -> f64 {
    let rounded = round_cents(amount);
    if rounded > amount {
        round_cents(rounded - 0.01)
    } else {
        rounded
    }
}
