pub use primitive_types::{H160, U256, U512};

/// An address identifying an account: an auction bidder, the engine owner,
/// a market, or the pool registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub H160);

impl Address {
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<H160> for Address {
    fn from(value: H160) -> Self {
        Self(value)
    }
}

/// An address identifying an asset that markets lend out and bidders escrow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAddress(pub H160);

impl From<H160> for TokenAddress {
    fn from(value: H160) -> Self {
        Self(value)
    }
}

/// Opaque identifier of a lending pool, externally assigned and stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(pub H160);

impl From<H160> for PoolId {
    fn from(value: H160) -> Self {
        Self(value)
    }
}

/// An asset amount in the asset's native precision.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    derive_more::From,
    derive_more::Into,
)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

/// A common-unit value, normalized to 18 fractional digits regardless of the
/// underlying asset's native precision.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    derive_more::From,
    derive_more::Into,
)]
pub struct Value(pub U256);

impl Value {
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

/// A block height. The engine never consults wall-clock time; every window
/// is measured in blocks of this externally supplied counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockNumber(pub u64);

impl From<u64> for BlockNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Basis points, units of 1/100th of a percent. All auction percentages are
/// expressed in this scale, with [`Bps::MAX`] representing 100%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bps(pub u16);

impl Bps {
    pub const MAX: Self = Self(10_000);

    pub fn as_u256(self) -> U256 {
        U256::from(self.0)
    }

    /// `amount * self / MAX`, rounded down.
    pub fn apply_to(self, amount: U256) -> U256 {
        let wide = amount.full_mul(U256::from(self.0)) / U256::from(Self::MAX.0);
        // For self <= MAX the result never exceeds `amount`.
        U256::try_from(wide).expect("bps scaling arithmetic error")
    }

    /// `amount` reduced by this many basis points, rounded down.
    pub fn discount_from(self, amount: U256) -> U256 {
        Self(Self::MAX.0.saturating_sub(self.0)).apply_to(amount)
    }

    /// `amount` grown by this many basis points, rounded down. `None` if the
    /// grown amount no longer fits.
    pub fn premium_on(self, amount: U256) -> Option<U256> {
        let wide = amount.full_mul(U256::from(Self::MAX.0 + self.0)) / U256::from(Self::MAX.0);
        U256::try_from(wide).ok()
    }

    /// The basis points closest to `ratio`, saturating at [`Bps::MAX`].
    pub fn clamp_from(ratio: U256) -> Self {
        if ratio >= Self::MAX.as_u256() {
            Self::MAX
        } else {
            Self(ratio.low_u64() as u16)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applying_bps_rounds_down() {
        assert_eq!(
            Bps(1730).apply_to(U256::from(10_001)),
            // 10001 * 0.173 = 1730.173
            U256::from(1730),
        );
        assert_eq!(Bps::MAX.apply_to(U256::from(77)), U256::from(77));
        assert_eq!(Bps(0).apply_to(U256::from(77)), U256::zero());
    }

    #[test]
    fn applying_bps_does_not_overflow() {
        assert_eq!(Bps(5_000).apply_to(U256::MAX), U256::MAX / 2);
    }

    #[test]
    fn discount_and_premium() {
        let amount = U256::from(10_000u64) * U256::exp10(18);
        assert_eq!(
            Bps(1_000).discount_from(amount),
            U256::from(9_000u64) * U256::exp10(18),
        );
        assert_eq!(
            Bps(1_000).premium_on(amount),
            Some(U256::from(11_000u64) * U256::exp10(18)),
        );
        assert_eq!(Bps(1_000).premium_on(U256::MAX), None);
    }

    #[test]
    fn clamping_saturates() {
        assert_eq!(Bps::clamp_from(U256::from(123)), Bps(123));
        assert_eq!(Bps::clamp_from(U256::from(10_000)), Bps::MAX);
        assert_eq!(Bps::clamp_from(U256::MAX), Bps::MAX);
    }
}
