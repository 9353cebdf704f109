//! Derived roast quality metrics

use rust_decimal::Decimal;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Calculate weight loss percentage, rounded to 2 decimal places
///
/// weight_loss = ((green - roasted) / green) × 100
///
/// Returns zero when the green weight is zero. A roasted weight above the
/// green weight yields a negative percentage; flagging that is up to the
/// caller. Rounding is half-to-even.
pub fn compute_weight_loss(green_kg: Decimal, roasted_kg: Decimal) -> Decimal {
    if green_kg.is_zero() {
        return Decimal::ZERO;
    }

    // Ratios outside Decimal's range collapse to zero like the zero-weight guard.
    (green_kg - roasted_kg)
        .checked_div(green_kg)
        .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
        .map(|percent| percent.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}
