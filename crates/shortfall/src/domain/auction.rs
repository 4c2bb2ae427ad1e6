//! The per-pool auction record and its bid arithmetic.

use {
    crate::domain::{eth, pool::Market},
    std::{fmt, sync::Arc},
};

/// The auction mode, selected at start from the reserve/debt comparison and
/// immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The reserve cannot cover the pool's debt. The whole reserve is
    /// seized and bidders compete on how large a debt fraction they repay
    /// for it: higher bids are better for the pool.
    Reserve,
    /// The reserve is ample. The debt value plus an incentive premium is
    /// seized and bidders compete on how small a fraction of it they accept
    /// for repaying the full debt: lower bids are better for the pool.
    Debt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Started,
    Closed,
}

/// The best bid recorded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub bidder: eth::Address,
    pub bps: eth::Bps,
    /// Block height the bid was placed at; the closability window counts
    /// from here.
    pub block: eth::BlockNumber,
}

/// A market's debt position frozen at auction start. The live market is
/// only touched again for the terminal settlement notification.
#[derive(Clone)]
pub struct SeizedMarket {
    pub market: Arc<dyn Market>,
    pub asset: eth::TokenAddress,
    /// Bad debt at start time, in the asset's native precision.
    pub debt: eth::TokenAmount,
    /// This market's share of the pool's total debt value, rounded down.
    pub weight: eth::Bps,
}

impl fmt::Debug for SeizedMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeizedMarket")
            .field("market", &self.market.address())
            .field("asset", &self.asset)
            .field("debt", &self.debt)
            .field("weight", &self.weight)
            .finish()
    }
}

/// One auction per pool. A record stays queryable after closing until a new
/// start for the same pool replaces it.
#[derive(Debug, Clone)]
pub struct Auction {
    pub pool: eth::PoolId,
    pub kind: Kind,
    pub status: Status,
    pub start_block: eth::BlockNumber,
    /// Reserve committed to the winning bidder, in common units.
    pub seized_reserve: eth::Value,
    /// The minimum acceptable first bid.
    pub start_bid: eth::Bps,
    /// Frozen debt positions, in registry order.
    pub markets: Vec<SeizedMarket>,
    pub bid: Option<Bid>,
}

impl Auction {
    pub fn is_started(&self) -> bool {
        self.status == Status::Started
    }

    /// Whether `bid` is more favorable to the pool than the current best.
    /// The first bid may match the start bid exactly; every later bid must
    /// strictly improve on the standing one.
    pub fn improves(&self, bid: eth::Bps) -> bool {
        match (self.kind, &self.bid) {
            (Kind::Reserve, Some(current)) => bid > current.bps,
            (Kind::Reserve, None) => bid >= self.start_bid,
            (Kind::Debt, Some(current)) => bid < current.bps,
            (Kind::Debt, None) => bid <= self.start_bid,
        }
    }

    /// The amount a bidder escrows for one market at the given bid level,
    /// in the market's native precision.
    pub fn escrow_amount(&self, market: &SeizedMarket, bid: eth::Bps) -> eth::TokenAmount {
        match self.kind {
            Kind::Reserve => eth::TokenAmount(bid.apply_to(market.debt.0)),
            Kind::Debt => market.debt,
        }
    }

    /// The reserve paid to the winner at the given bid level.
    pub fn reserve_payout(&self, bid: eth::Bps) -> eth::Value {
        match self.kind {
            Kind::Reserve => self.seized_reserve,
            Kind::Debt => eth::Value(bid.apply_to(self.seized_reserve.0)),
        }
    }
}
