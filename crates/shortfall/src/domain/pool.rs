//! The engine's view of a lending pool: its registry, its listed markets
//! and the reserve fund backing it.

use {
    crate::domain::{eth, settlement::TransferError},
    std::sync::Arc,
};

/// A listed market of a lending pool, one per lendable asset. The engine
/// only ever reads a market's outstanding bad debt and delivers the terminal
/// debt-recovered notification during settlement.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Market: Send + Sync {
    /// The market's own account. Escrowed bid funds are forwarded here when
    /// an auction settles.
    fn address(&self) -> eth::Address;

    /// The asset this market lends out.
    fn asset(&self) -> eth::TokenAddress;

    /// Outstanding unrecoverable debt, in the asset's native precision.
    async fn bad_debt(&self) -> eth::TokenAmount;

    /// Notifies the market that `amount` of its bad debt has been resolved
    /// by a settled auction. Called exactly once per settled auction.
    async fn debt_recovered(&self, amount: eth::TokenAmount);
}

/// Pool registration data. Registration itself happens elsewhere; the
/// engine only resolves a pool's current market listing through this.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PoolRegistering: Send + Sync {
    /// All markets listed for the pool. Unknown pools have no markets.
    async fn pool_markets(&self, pool: eth::PoolId) -> Vec<Arc<dyn Market>>;
}

/// The reserve fund earmarked per pool to backstop bad debt.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReserveFunding: Send + Sync {
    /// Reserve currently earmarked for the pool, in common units.
    async fn pool_reserve(&self, pool: eth::PoolId) -> eth::Value;

    /// Moves `amount` of the pool's reserve to `to`.
    async fn payout(
        &self,
        pool: eth::PoolId,
        to: eth::Address,
        amount: eth::Value,
    ) -> Result<(), TransferError>;
}
