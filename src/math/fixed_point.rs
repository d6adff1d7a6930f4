// Exact bridging between rust_decimal and BigInt.
//
// A Decimal is mantissa / 10^scale with a 96-bit mantissa. Lifting several of them to a
// shared scale gives plain integers that can be multiplied without rounding, which is what
// the closed-form optimizer needs. Coming back down, fractional digits are shed until the
// mantissa fits again.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::{ArbError, Result};

/// Largest scale a Decimal can carry.
pub const MAX_SCALE: u32 = 28;

#[inline]
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// Smallest scale at which every value is an integer.
pub fn common_scale(values: &[Decimal]) -> u32 {
    values.iter().map(|v| v.scale()).max().unwrap_or(0)
}

/// `value * 10^scale` as an integer. Exact whenever `scale >= value.scale()`, truncated otherwise.
pub fn to_scaled_int(value: Decimal, scale: u32) -> BigInt {
    let mantissa = BigInt::from(value.mantissa());
    let own = value.scale();
    if scale >= own {
        mantissa * pow10(scale - own)
    } else {
        mantissa / pow10(own - scale)
    }
}

/// `value / 10^scale` as a Decimal.
///
/// Truncates toward zero one digit at a time until the mantissa fits in 96 bits. Fails only
/// when the integer part alone is out of range.
pub fn from_scaled_int(value: &BigInt, scale: u32, context: &'static str) -> Result<Decimal> {
    let mut v = value.clone();
    let mut s = scale;
    if s > MAX_SCALE {
        v = v / pow10(s - MAX_SCALE);
        s = MAX_SCALE;
    }
    loop {
        if let Some(m) = v.to_i128() {
            if let Ok(d) = Decimal::try_from_i128_with_scale(m, s) {
                return Ok(d.normalize());
            }
        }
        if s == 0 {
            return Err(ArbError::NumericOverflow(context));
        }
        v = v / 10u32;
        s -= 1;
    }
}

/// Raw integer token units -> human amount.
#[inline]
pub fn from_raw(amount: u128, decimals: u8) -> Result<Decimal> {
    from_scaled_int(&BigInt::from(amount), u32::from(decimals), "raw token amount")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal literal")
    }

    #[test]
    fn scaled_int_lifts_exactly() {
        assert_eq!(to_scaled_int(d("1.5"), 3), BigInt::from(1500));
        assert_eq!(to_scaled_int(d("-0.25"), 2), BigInt::from(-25));
        assert_eq!(to_scaled_int(d("1.999"), 1), BigInt::from(19));
        assert_eq!(common_scale(&[d("1"), d("0.003"), d("2.5")]), 3);
    }

    #[test]
    fn usdc_and_eighteen_decimal_raw_amounts() {
        assert_eq!(from_raw(1_000_000_000_000, 6).unwrap(), d("1000000"));
        assert_eq!(from_raw(1_500_000_000_000_000_000, 18).unwrap(), d("1.5"));
        assert_eq!(from_raw(0, 18).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn uint112_max_reserve_sheds_fraction_digits() {
        // getReserves() returns uint112; the largest value has 34 digits.
        let max_reserve: u128 = (1u128 << 112) - 1;
        let human = from_raw(max_reserve, 18).unwrap();
        assert_eq!(human.trunc(), d("5192296858534827"));
        assert!(human.scale() < 18);
    }

    #[test]
    fn integer_part_out_of_range_is_overflow() {
        let huge = pow10(30);
        assert_eq!(
            from_scaled_int(&huge, 0, "test"),
            Err(ArbError::NumericOverflow("test"))
        );
        // The same digits with enough fractional room are fine.
        assert_eq!(from_scaled_int(&huge, 10, "test").unwrap(), d("100000000000000000000"));
    }
}
