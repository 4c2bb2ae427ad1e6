//! The bad-debt auction engine.
//!
//! One auction at a time per pool: started against the pool's frozen bad
//! debt, improved by competing bids, and closed once the leading bid has
//! gone unimproved for a configured number of blocks. Settlement moves the
//! seized reserve to the winner and reports the frozen debt of every market
//! as recovered.

use {
    crate::{
        domain::{
            auction::{Auction, Bid, Kind, SeizedMarket, Status},
            eth,
            pool::{PoolRegistering, ReserveFunding},
            settlement::{Plan, Step, TokenTransferring, TransferError},
            valuation::{Valuating, ValuationError},
        },
        util::math,
    },
    dashmap::DashMap,
    itertools::Itertools,
    std::sync::{Arc, RwLock},
    thiserror::Error,
    tokio::sync::Mutex,
};

/// The externally supplied monotonic block-height counter. Windows are
/// measured against this, never against wall-clock time, which keeps the
/// closability check deterministic and replay-safe.
#[cfg_attr(test, mockall::automock)]
pub trait BlockNumbering: Send + Sync {
    fn current(&self) -> eth::BlockNumber;
}

/// Process-wide auction tuning. Mutated through the owner-gated setters
/// only.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity of the pool registry collaborator. Besides the owner, this
    /// is the only caller allowed to trigger auction starts.
    pub pool_registry: Option<eth::Address>,
    /// No auction starts while the pool's total debt value is below this.
    pub minimum_pool_bad_debt: eth::Value,
    /// Blocks a leading bid must go unimproved before the auction becomes
    /// closable.
    pub next_bidder_block_limit: u64,
    /// The premium granted on top of the debt value when the reserve is
    /// ample, and the discount taken from the reserve value when it is
    /// scarce.
    pub incentive: eth::Bps,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool_registry: None,
            minimum_pool_bad_debt: eth::Value::default(),
            next_bidder_block_limit: 10,
            incentive: eth::Bps(1_000),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("caller is not authorized, or an auction is already running")]
    NotAuthorized,
    #[error("pool bad debt {debt:?} is below the auctionable minimum {minimum:?}")]
    BelowThreshold {
        debt: eth::Value,
        minimum: eth::Value,
    },
    #[error("no auction in progress for this pool")]
    NoActiveAuction,
    #[error("bid does not improve on the current best")]
    InvalidBid,
    #[error("the bidding window is open for {wait} more block(s)")]
    TooEarly { wait: u64 },
    #[error("the zero address is not a valid identity")]
    InvalidAddress,
    #[error(transparent)]
    TransferFailure(#[from] TransferError),
    #[error(transparent)]
    Pricing(#[from] ValuationError),
}

/// Previous and new value of an updated configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update<T> {
    pub old: T,
    pub new: T,
}

/// Outcome of a successful close.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub pool: eth::PoolId,
    /// `None` when the auction lapsed without a bid.
    pub winner: Option<eth::Address>,
    /// Reserve paid out to the winner.
    pub payout: eth::Value,
    /// Bad debt reported as recovered, one entry per market.
    pub recovered: Vec<(eth::Address, eth::TokenAmount)>,
}

/// The auction engine. All state transitions for one pool serialize on that
/// pool's slot; distinct pools interleave freely.
pub struct Shortfall {
    owner: eth::Address,
    config: RwLock<Config>,
    registry: Arc<dyn PoolRegistering>,
    valuation: Arc<dyn Valuating>,
    reserve: Arc<dyn ReserveFunding>,
    tokens: Arc<dyn TokenTransferring>,
    blocks: Arc<dyn BlockNumbering>,
    auctions: DashMap<eth::PoolId, Arc<Mutex<Option<Auction>>>>,
}

impl Shortfall {
    pub fn new(
        owner: eth::Address,
        config: Config,
        registry: Arc<dyn PoolRegistering>,
        valuation: Arc<dyn Valuating>,
        reserve: Arc<dyn ReserveFunding>,
        tokens: Arc<dyn TokenTransferring>,
        blocks: Arc<dyn BlockNumbering>,
    ) -> Self {
        Self {
            owner,
            config: RwLock::new(config),
            registry,
            valuation,
            reserve,
            tokens,
            blocks,
            auctions: DashMap::new(),
        }
    }

    fn slot(&self, pool: eth::PoolId) -> Arc<Mutex<Option<Auction>>> {
        self.auctions.entry(pool).or_default().value().clone()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.config.read().unwrap().clone()
    }

    /// Snapshot of the pool's live or last closed auction.
    pub async fn auction(&self, pool: eth::PoolId) -> Option<Auction> {
        self.slot(pool).lock().await.clone()
    }

    /// Starts an auction for the pool's outstanding bad debt. Only the
    /// owner and the configured pool registry may trigger this, and only
    /// while no auction is running for the pool.
    pub async fn start_auction(
        &self,
        caller: eth::Address,
        pool: eth::PoolId,
    ) -> Result<Auction, Error> {
        let config = self.config();
        if caller != self.owner && Some(caller) != config.pool_registry {
            return Err(Error::NotAuthorized);
        }

        let slot = self.slot(pool);
        let mut record = slot.lock().await;
        if matches!(record.as_ref(), Some(auction) if auction.is_started()) {
            return Err(Error::NotAuthorized);
        }

        // Freeze every market's debt position and value it in the common
        // unit. A single unpriceable asset fails the whole start.
        let mut positions = Vec::new();
        let mut total = eth::U256::zero();
        for market in self.registry.pool_markets(pool).await {
            let asset = market.asset();
            let debt = market.bad_debt().await;
            let value = self.valuation.appraise(asset, debt).await?;
            total = total
                .checked_add(value.0)
                .ok_or(ValuationError::Overflow)?;
            positions.push((market, asset, debt, value));
        }
        let total_debt_value = eth::Value(total);
        if total.is_zero() || total_debt_value < config.minimum_pool_bad_debt {
            return Err(Error::BelowThreshold {
                debt: total_debt_value,
                minimum: config.minimum_pool_bad_debt,
            });
        }

        let reserve_value = self.reserve.pool_reserve(pool).await;
        let (kind, seized_reserve, start_bid) = if reserve_value.0 < total {
            // The reserve cannot cover the debt: seize all of it and open
            // the bidding at the debt fraction it pays for, discounted to
            // compensate the winner for the uncovered remainder.
            let discounted = config.incentive.discount_from(reserve_value.0);
            let ratio = math::mul_div_down(discounted, eth::Bps::MAX.as_u256(), total)
                .expect("total debt is non-zero");
            (Kind::Reserve, reserve_value, eth::Bps::clamp_from(ratio))
        } else {
            // The reserve is ample: seize the debt value plus the incentive
            // premium, capped by what the reserve actually holds, and open
            // the bidding at the seized share of the reserve.
            let seized = config
                .incentive
                .premium_on(total)
                .ok_or(ValuationError::Overflow)?
                .min(reserve_value.0);
            let ratio = math::mul_div_down(seized, eth::Bps::MAX.as_u256(), reserve_value.0)
                .expect("ample reserve is non-zero");
            (Kind::Debt, eth::Value(seized), eth::Bps::clamp_from(ratio))
        };

        let markets = positions
            .into_iter()
            .map(|(market, asset, debt, value)| SeizedMarket {
                market,
                asset,
                debt,
                weight: eth::Bps::clamp_from(
                    math::mul_div_down(value.0, eth::Bps::MAX.as_u256(), total)
                        .expect("total debt is non-zero"),
                ),
            })
            .collect_vec();

        let auction = Auction {
            pool,
            kind,
            status: Status::Started,
            start_block: self.blocks.current(),
            seized_reserve,
            start_bid,
            markets,
            bid: None,
        };
        tracing::info!(
            ?pool,
            ?kind,
            seized_reserve = ?auction.seized_reserve,
            start_bid = auction.start_bid.0,
            "auction started"
        );
        *record = Some(auction.clone());
        Ok(auction)
    }

    /// Validates and records a bid, escrowing the bidder's funds and
    /// refunding the previously leading bidder.
    pub async fn place_bid(
        &self,
        bidder: eth::Address,
        pool: eth::PoolId,
        bid: eth::Bps,
    ) -> Result<Bid, Error> {
        let slot = self.slot(pool);
        let mut record = slot.lock().await;
        let auction = match record.as_mut() {
            Some(auction) if auction.is_started() => auction,
            _ => return Err(Error::NoActiveAuction),
        };
        if bid > eth::Bps::MAX || !auction.improves(bid) {
            return Err(Error::InvalidBid);
        }

        // Escrow the new bid in full before releasing the refund, so a
        // failure can never leave the auction without an escrowed bid.
        let mut plan = Plan::default();
        for market in &auction.markets {
            plan.push(Step::Deposit {
                asset: market.asset,
                from: bidder,
                amount: auction.escrow_amount(market, bid),
            });
        }
        if let Some(previous) = auction.bid {
            for market in &auction.markets {
                plan.push(Step::Withdraw {
                    asset: market.asset,
                    to: previous.bidder,
                    amount: auction.escrow_amount(market, previous.bps),
                });
            }
        }
        plan.execute(self.tokens.as_ref(), self.reserve.as_ref())
            .await?;

        let accepted = Bid {
            bidder,
            bps: bid,
            block: self.blocks.current(),
        };
        auction.bid = Some(accepted);
        tracing::info!(?pool, ?bidder, bps = bid.0, "new leading bid");
        Ok(accepted)
    }

    /// Closes the auction once the leading bid has gone unimproved for the
    /// configured block window, settling reserve and debt recovery. Without
    /// any bid the auction lapses after the same window from its start.
    pub async fn close_auction(&self, pool: eth::PoolId) -> Result<Settlement, Error> {
        let config = self.config();
        let slot = self.slot(pool);
        let mut record = slot.lock().await;
        let auction = match record.as_mut() {
            Some(auction) if auction.is_started() => auction,
            _ => return Err(Error::NoActiveAuction),
        };

        let now = self.blocks.current();
        let reference = auction
            .bid
            .map(|bid| bid.block)
            .unwrap_or(auction.start_block);
        let elapsed = now.0.saturating_sub(reference.0);
        if elapsed < config.next_bidder_block_limit {
            return Err(Error::TooEarly {
                wait: config.next_bidder_block_limit - elapsed,
            });
        }

        let Some(winning) = auction.bid else {
            // Nobody bid: the auction lapses with no fund movement.
            auction.status = Status::Closed;
            tracing::info!(?pool, "auction lapsed without bids");
            return Ok(Settlement {
                pool,
                winner: None,
                payout: eth::Value::default(),
                recovered: Vec::new(),
            });
        };

        // Forward every market's escrow first, then the irreversible
        // reserve payout; a failure anywhere rolls the transfers back and
        // leaves the auction open for a retry.
        let mut plan = Plan::default();
        for market in &auction.markets {
            plan.push(Step::Withdraw {
                asset: market.asset,
                to: market.market.address(),
                amount: auction.escrow_amount(market, winning.bps),
            });
        }
        let payout = auction.reserve_payout(winning.bps);
        plan.push(Step::Payout {
            pool,
            to: winning.bidder,
            amount: payout,
        });
        plan.execute(self.tokens.as_ref(), self.reserve.as_ref())
            .await?;

        // The pool's recorded bad debt is cleared in full at settlement;
        // the gap between a market's escrow and its debt is the market's
        // write-off.
        for market in &auction.markets {
            market.market.debt_recovered(market.debt).await;
        }
        let recovered = auction
            .markets
            .iter()
            .map(|market| (market.market.address(), market.debt))
            .collect_vec();
        auction.status = Status::Closed;
        tracing::info!(
            ?pool,
            winner = ?winning.bidder,
            payout = ?payout,
            "auction closed"
        );
        Ok(Settlement {
            pool,
            winner: Some(winning.bidder),
            payout,
            recovered,
        })
    }

    /// Points the engine at a new pool registry identity. Owner only; the
    /// zero address is rejected.
    pub fn set_pool_registry(
        &self,
        caller: eth::Address,
        registry: eth::Address,
    ) -> Result<Update<Option<eth::Address>>, Error> {
        if caller != self.owner {
            return Err(Error::NotAuthorized);
        }
        if registry.is_zero() {
            return Err(Error::InvalidAddress);
        }
        let mut config = self.config.write().unwrap();
        let update = Update {
            old: config.pool_registry,
            new: Some(registry),
        };
        config.pool_registry = Some(registry);
        tracing::info!(old = ?update.old, new = ?registry, "pool registry updated");
        Ok(update)
    }

    /// Replaces the debt threshold below which no auction may start. Owner
    /// only.
    pub fn update_minimum_pool_bad_debt(
        &self,
        caller: eth::Address,
        minimum: eth::Value,
    ) -> Result<Update<eth::Value>, Error> {
        if caller != self.owner {
            return Err(Error::NotAuthorized);
        }
        let mut config = self.config.write().unwrap();
        let update = Update {
            old: config.minimum_pool_bad_debt,
            new: minimum,
        };
        config.minimum_pool_bad_debt = minimum;
        tracing::info!(old = ?update.old, new = ?minimum, "minimum pool bad debt updated");
        Ok(update)
    }
}
