use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::pow::Pow;
use once_cell::sync::Lazy;

/// Cached powers of ten up to 10^24, avoiding repeated `BigInt`
/// exponentiation on the hot accounting path.
static POW10: Lazy<Vec<BigDecimal>> = Lazy::new(|| {
    (0..=24)
        .map(|exp| BigDecimal::new(BigInt::from(10u8).pow(exp), 0))
        .collect()
});

/// `10^exp` as a `BigDecimal`, served from a small cache for the common
/// token-decimals range and computed directly beyond it.
pub fn big_pow10(exp: i64) -> BigDecimal {
    if (0..=24).contains(&exp) {
        POW10[exp as usize].clone()
    } else {
        BigDecimal::new(BigInt::from(10u8).pow(exp as u32), 0)
    }
}

/// `to_decimal(n, d) = n / 10^d`, rescaling an integer token amount by its
/// declared decimals into a human/USD-comparable decimal value.
pub fn to_decimal(n: &BigInt, decimals: u32) -> BigDecimal {
    BigDecimal::new(n.clone(), 0) / big_pow10(decimals as i64)
}

/// `price(a, b) = a/b` if `b != 0`, else `0` — used throughout C6/C7 so a
/// pair with one empty reserve never produces a division-by-zero panic.
pub fn price(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    if b == &BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        a / b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn to_decimal_rescales_by_decimals() {
        let n = BigInt::from(1_500_000_000_000_000_000i64);
        assert_eq!(to_decimal(&n, 18), BigDecimal::from_str("1.5").unwrap());
    }

    #[test]
    fn price_of_zero_denominator_is_zero() {
        let a = BigDecimal::from_str("10").unwrap();
        let b = BigDecimal::from(0);
        assert_eq!(price(&a, &b), BigDecimal::from(0));
    }

    #[test]
    fn price_divides_normally() {
        let a = BigDecimal::from_str("10").unwrap();
        let b = BigDecimal::from_str("4").unwrap();
        assert_eq!(price(&a, &b), BigDecimal::from_str("2.5").unwrap());
    }
}
