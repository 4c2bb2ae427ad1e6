use {
    shortfall::{eth, Price, Valuating, ValuationError},
    std::{collections::HashMap, sync::Mutex},
};

/// A price oracle backed by a fixed table.
#[derive(Debug, Default)]
pub struct Oracle(Mutex<HashMap<eth::TokenAddress, Price>>);

impl Oracle {
    pub fn with_price(self, asset: eth::TokenAddress, price: Price) -> Self {
        self.0.lock().unwrap().insert(asset, price);
        self
    }

    pub fn set_price(&self, asset: eth::TokenAddress, price: Price) {
        self.0.lock().unwrap().insert(asset, price);
    }
}

#[async_trait::async_trait]
impl Valuating for Oracle {
    async fn price(&self, asset: eth::TokenAddress) -> Result<Price, ValuationError> {
        self.0
            .lock()
            .unwrap()
            .get(&asset)
            .copied()
            .ok_or(ValuationError::UnpricedAsset(asset))
    }
}
