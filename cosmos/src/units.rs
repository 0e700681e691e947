//! Conversion of on-chain integer amounts into display values.
//!
//! Balances on a Cosmos chain (and on the bridged Ethereum side) are
//! integers in the base unit, e.g. `uatom`. Dashboards want the display
//! unit, e.g. `atom`, which is `raw / 10^exponent`. Amounts routinely exceed
//! 2^53, so the division is done on arbitrary-precision decimals and only
//! the quotient is narrowed to `f64`.

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{FromPrimitive, ToPrimitive};

/// A denom together with the divisor that turns base units into display
/// units.
///
/// `base` is the denom amounts are held in on chain (`uatom`), which is what
/// bank balances and staking entries carry. `denom` is the configured or
/// display denom (`atom`) and only names the unit the values are scaled to.
///
/// The coefficient is expected to be nonzero. A zero coefficient is a
/// misconfiguration: conversions then yield `+Inf` (or `NaN` for a zero
/// amount) instead of failing.
#[derive(Clone, Debug, PartialEq)]
pub struct Denomination {
    /// Configured or display denom.
    pub denom: String,
    /// On-chain base denom.
    pub base: String,
    /// Divisor applied to raw integer amounts, usually `10^exponent`.
    pub coefficient: f64,
}

impl Denomination {
    /// A denom that is its own base, e.g. a configured `acudos`.
    pub fn new(denom: impl Into<String>, coefficient: f64) -> Self {
        let denom = denom.into();
        Self {
            base: denom.clone(),
            denom,
            coefficient,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Converts a raw integer amount into the display unit.
    pub fn to_scaled_value(&self, raw: &BigUint) -> f64 {
        let divisor = match BigDecimal::from_f64(self.coefficient) {
            Some(divisor) if self.coefficient != 0.0 => divisor,
            // Zero, NaN or infinite coefficients fall back to float division.
            _ => return to_float(raw) / self.coefficient,
        };

        let amount = BigDecimal::from(BigInt::from(raw.clone()));
        (amount / divisor).to_f64().unwrap_or(f64::NAN)
    }

    /// Scales a value that was already decoded as a float, such as a
    /// `DecCoin` amount.
    pub fn scale(&self, value: f64) -> f64 {
        value / self.coefficient
    }
}

/// Narrows a raw integer amount to `f64` without scaling.
///
/// Used for totals that are exported in base units (staking pool, supply).
pub fn to_float(raw: &BigUint) -> f64 {
    raw.to_f64().unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_value_divides_by_coefficient() {
        let atom = Denomination::new("atom", 10_000_000_000.0);
        let raw = BigUint::from(10_000_000_000u64);

        assert_eq!(atom.to_scaled_value(&raw), 1.0);
    }

    #[test]
    fn scaled_value_keeps_precision_above_f64_mantissa() {
        // 18-decimal token balance well above 2^53.
        let token = Denomination::new("acudos", 1e18);
        let raw: BigUint = "123456789012345678901234567".parse().expect("valid integer");

        let value = token.to_scaled_value(&raw);
        assert!((value - 123_456_789.012_345_68).abs() < 1e-6);
    }

    #[test]
    fn scaled_value_matches_plain_division_for_small_amounts() {
        let denom = Denomination::new("osmo", 1_000_000.0);
        for v in [0u64, 1, 999, 1_000_000, 5_000_000, 123_456_789] {
            let expected = v as f64 / 1_000_000.0;
            let got = denom.to_scaled_value(&BigUint::from(v));
            assert!((got - expected).abs() <= f64::EPSILON * expected.max(1.0));
        }
    }

    #[test]
    fn zero_coefficient_yields_infinity() {
        let broken = Denomination::new("uatom", 0.0);

        assert_eq!(broken.to_scaled_value(&BigUint::from(42u32)), f64::INFINITY);
        assert!(broken.to_scaled_value(&BigUint::from(0u32)).is_nan());
    }

    #[test]
    fn to_float_does_not_scale() {
        assert_eq!(to_float(&BigUint::from(5_000_000u64)), 5_000_000.0);
    }
}
