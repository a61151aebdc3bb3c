/// Decimal places kept when converting capital to a quantity.
pub const QTY_PRECISION: i32 = 3;

/// Quantity that spends `capital` at `price`, leaving room for fees.
///
/// Capital is reduced by three times the fee rate, divided by price and
/// floored to `QTY_PRECISION` decimals.
pub fn size_to_qty(capital: f64, price: f64, fee_rate: f64) -> f64 {
    if price.is_nan() || price <= 0.0 || !capital.is_finite() || capital <= 0.0 {
        return 0.0;
    }
    let usable = if fee_rate != 0.0 {
        capital * (1.0 - fee_rate * 3.0)
    } else {
        capital
    };
    floor_with_precision(usable / price, QTY_PRECISION).max(0.0)
}

/// Nudged by 1e-9 so 9.97 does not floor to 9.969.
fn floor_with_precision(value: f64, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    (value * scale + 1e-9).floor() / scale
}
