//! Boundary rounding helpers. Internal math keeps full precision; results
//! cross the API boundary with currency at 2 dp and percentages at 1 dp.

pub(crate) fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round_pct(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_rounds_to_two_places() {
        assert_eq!(round_currency(411.38751), 411.39);
        assert_eq!(round_currency(0.004), 0.0);
        assert_eq!(round_currency(2.71828), 2.72);
    }

    #[test]
    fn pct_rounds_to_one_place() {
        assert_eq!(round_pct(8.284), 8.3);
        assert_eq!(round_pct(0.04), 0.0);
    }
}
