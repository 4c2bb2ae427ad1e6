use {
    shortfall::{eth, TokenTransferring, TransferError},
    std::{collections::HashMap, sync::Mutex},
};

/// An in-memory multi-asset ledger. The engine's escrow lives in a
/// dedicated custody account.
pub struct Ledger {
    custody: eth::Address,
    balances: Mutex<HashMap<(eth::TokenAddress, eth::Address), eth::U256>>,
}

impl Ledger {
    pub fn new(custody: eth::Address) -> Self {
        Self {
            custody,
            balances: Mutex::new(HashMap::new()),
        }
    }

    pub fn mint(&self, asset: eth::TokenAddress, to: eth::Address, amount: eth::U256) {
        *self
            .balances
            .lock()
            .unwrap()
            .entry((asset, to))
            .or_default() += amount;
    }

    pub fn balance_of(&self, asset: eth::TokenAddress, holder: eth::Address) -> eth::U256 {
        self.balances
            .lock()
            .unwrap()
            .get(&(asset, holder))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &self,
        asset: eth::TokenAddress,
        from: eth::Address,
        to: eth::Address,
        amount: eth::U256,
    ) -> Result<(), TransferError> {
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(&(asset, from)).copied().unwrap_or_default();
        if available < amount {
            return Err(TransferError(format!(
                "{from:?} holds {available} of {asset:?}, needs {amount}",
            )));
        }
        balances.insert((asset, from), available - amount);
        *balances.entry((asset, to)).or_default() += amount;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TokenTransferring for Ledger {
    async fn deposit(
        &self,
        asset: eth::TokenAddress,
        from: eth::Address,
        amount: eth::TokenAmount,
    ) -> Result<(), TransferError> {
        self.transfer(asset, from, self.custody, amount.0)
    }

    async fn withdraw(
        &self,
        asset: eth::TokenAddress,
        to: eth::Address,
        amount: eth::TokenAmount,
    ) -> Result<(), TransferError> {
        self.transfer(asset, self.custody, to, amount.0)
    }
}
