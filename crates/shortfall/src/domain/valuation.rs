//! Pricing of heterogeneous pool assets in a common unit.

use {
    crate::{domain::eth, util::math},
    thiserror::Error,
};

/// The price of one whole unit of an asset.
///
/// Prices are scaled such that multiplying a native-precision amount by the
/// price and dividing by 1e18 yields an 18-digit [`eth::Value`]: for an
/// asset with `d` native decimals the oracle reports the unit price times
/// `10^(36 - d)`. The oracle owns the decimals bookkeeping; the engine never
/// needs to know an asset's precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(pub eth::U256);

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("no price available for asset {0:?}")]
    UnpricedAsset(eth::TokenAddress),
    #[error("valuation arithmetic overflow")]
    Overflow,
}

/// Values assets in the common unit. Must be able to price every asset used
/// by every market of a pool under auction; a missing price fails the whole
/// operation that needed it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Valuating: Send + Sync {
    async fn price(&self, asset: eth::TokenAddress) -> Result<Price, ValuationError>;

    /// The common-unit value of a native-precision amount, rounded down.
    async fn appraise(
        &self,
        asset: eth::TokenAddress,
        amount: eth::TokenAmount,
    ) -> Result<eth::Value, ValuationError> {
        let price = self.price(asset).await?;
        math::mul_div_down(amount.0, price.0, eth::U256::exp10(18))
            .map(eth::Value)
            .ok_or(ValuationError::Overflow)
    }
}
