//! In-memory fakes for the auction engine's external collaborators, plus a
//! few literal-building helpers. Everything here trades robustness for
//! convenience and must only be used from tests.

pub mod blocks;
pub mod ledger;
pub mod oracle;
pub mod pool;

use shortfall::eth;

pub fn address(tag: u64) -> eth::Address {
    eth::Address(eth::H160::from_low_u64_be(tag))
}

pub fn token(tag: u64) -> eth::TokenAddress {
    eth::TokenAddress(eth::H160::from_low_u64_be(tag))
}

pub fn pool_id(tag: u64) -> eth::PoolId {
    eth::PoolId(eth::H160::from_low_u64_be(tag))
}

/// `value` (a decimal literal like `"21000.34"`) scaled by `10^exponent`.
pub fn units(value: &str, exponent: u32) -> eth::U256 {
    let (integer, fraction) = value.split_once('.').unwrap_or((value, ""));
    assert!(
        fraction.len() as u32 <= exponent,
        "{value} has more than {exponent} fractional digits",
    );
    let digits = format!("{integer}{fraction}");
    let scale = exponent - fraction.len() as u32;
    eth::U256::from_dec_str(&digits).expect("decimal literal")
        * eth::U256::exp10(scale as usize)
}
