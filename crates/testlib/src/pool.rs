use {
    shortfall::{eth, Market, PoolRegistering, ReserveFunding, TransferError},
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

/// A market with an externally assigned bad-debt figure and a journal of
/// received recovery notifications.
pub struct FakeMarket {
    address: eth::Address,
    asset: eth::TokenAddress,
    bad_debt: Mutex<eth::TokenAmount>,
    recovered: Mutex<Vec<eth::TokenAmount>>,
}

impl FakeMarket {
    pub fn new(
        address: eth::Address,
        asset: eth::TokenAddress,
        bad_debt: eth::TokenAmount,
    ) -> Arc<Self> {
        Arc::new(Self {
            address,
            asset,
            bad_debt: Mutex::new(bad_debt),
            recovered: Mutex::new(Vec::new()),
        })
    }

    pub fn set_bad_debt(&self, amount: eth::TokenAmount) {
        *self.bad_debt.lock().unwrap() = amount;
    }

    /// Every recovery notification received so far, in order.
    pub fn recovered(&self) -> Vec<eth::TokenAmount> {
        self.recovered.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Market for FakeMarket {
    fn address(&self) -> eth::Address {
        self.address
    }

    fn asset(&self) -> eth::TokenAddress {
        self.asset
    }

    async fn bad_debt(&self) -> eth::TokenAmount {
        *self.bad_debt.lock().unwrap()
    }

    async fn debt_recovered(&self, amount: eth::TokenAmount) {
        self.recovered.lock().unwrap().push(amount);
    }
}

/// A registry serving static market listings.
#[derive(Default)]
pub struct Registry(Mutex<HashMap<eth::PoolId, Vec<Arc<dyn Market>>>>);

impl Registry {
    pub fn list(&self, pool: eth::PoolId, markets: Vec<Arc<dyn Market>>) {
        self.0.lock().unwrap().insert(pool, markets);
    }
}

#[async_trait::async_trait]
impl PoolRegistering for Registry {
    async fn pool_markets(&self, pool: eth::PoolId) -> Vec<Arc<dyn Market>> {
        self.0.lock().unwrap().get(&pool).cloned().unwrap_or_default()
    }
}

/// A reserve fund with per-pool balances and a payout journal.
#[derive(Default)]
pub struct Reserve {
    balances: Mutex<HashMap<eth::PoolId, eth::U256>>,
    payouts: Mutex<Vec<(eth::PoolId, eth::Address, eth::Value)>>,
}

impl Reserve {
    pub fn fund(&self, pool: eth::PoolId, amount: eth::Value) {
        *self.balances.lock().unwrap().entry(pool).or_default() += amount.0;
    }

    pub fn balance(&self, pool: eth::PoolId) -> eth::Value {
        eth::Value(
            self.balances
                .lock()
                .unwrap()
                .get(&pool)
                .copied()
                .unwrap_or_default(),
        )
    }

    /// Every payout performed so far, in order.
    pub fn payouts(&self) -> Vec<(eth::PoolId, eth::Address, eth::Value)> {
        self.payouts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ReserveFunding for Reserve {
    async fn pool_reserve(&self, pool: eth::PoolId) -> eth::Value {
        self.balance(pool)
    }

    async fn payout(
        &self,
        pool: eth::PoolId,
        to: eth::Address,
        amount: eth::Value,
    ) -> Result<(), TransferError> {
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(&pool).copied().unwrap_or_default();
        if available < amount.0 {
            return Err(TransferError(format!(
                "pool {pool:?} reserve holds {available}, needs {}",
                amount.0,
            )));
        }
        balances.insert(pool, available - amount.0);
        self.payouts.lock().unwrap().push((pool, to, amount));
        Ok(())
    }
}
