//! Money arithmetic for order totals.
//!
//! Amounts are currency-free decimals. An order's total is the sum of
//! `unit price x quantity` over its lines, computed once at order time and
//! frozen; later catalog price changes never alter historical totals.

use rust_decimal::Decimal;

/// Compute an order total from `(unit_price, quantity)` lines.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use khaja_core::order_total;
///
/// let total = order_total([("10.50".parse().unwrap(), 2), ("5.00".parse().unwrap(), 1)]);
/// assert_eq!(total, "26.00".parse::<Decimal>().unwrap());
/// ```
#[must_use]
pub fn order_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i64)>,
{
    lines
        .into_iter()
        .map(|(price, qty)| price * Decimal::from(qty))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal")
    }

    #[test]
    fn test_total_single_line() {
        assert_eq!(order_total([(dec("10.50"), 2)]), dec("21.00"));
    }

    #[test]
    fn test_total_multiple_lines() {
        let total = order_total([(dec("10.50"), 2), (dec("3.25"), 4), (dec("0.75"), 1)]);
        assert_eq!(total, dec("34.75"));
    }

    #[test]
    fn test_total_empty_is_zero() {
        assert_eq!(order_total(Vec::<(Decimal, i64)>::new()), Decimal::ZERO);
    }

    #[test]
    fn test_total_keeps_decimal_precision() {
        // No float drift: 0.1 * 3 is exactly 0.3
        assert_eq!(order_total([(dec("0.1"), 3)]), dec("0.3"));
    }
}
