//! Overflow-safe helpers for U256 arithmetic.

use primitive_types::U256;

/// `a * b / denom` rounded down, computed through a 512-bit intermediate so
/// the product cannot overflow. `None` if the denominator is zero or the
/// quotient does not fit a U256.
pub fn mul_div_down(a: U256, b: U256, denom: U256) -> Option<U256> {
    if denom.is_zero() {
        return None;
    }
    let wide = a.full_mul(b) / denom;
    U256::try_from(wide).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_down() {
        assert_eq!(
            mul_div_down(U256::from(10), U256::from(10), U256::from(3)),
            Some(U256::from(33)),
        );
    }

    #[test]
    fn survives_intermediate_overflow() {
        assert_eq!(
            mul_div_down(U256::MAX, U256::from(2), U256::from(4)),
            Some(U256::MAX / 2),
        );
    }

    #[test]
    fn rejects_zero_denominator() {
        assert_eq!(mul_div_down(U256::one(), U256::one(), U256::zero()), None);
    }

    #[test]
    fn rejects_oversized_quotient() {
        assert_eq!(mul_div_down(U256::MAX, U256::from(3), U256::from(2)), None);
    }
}
