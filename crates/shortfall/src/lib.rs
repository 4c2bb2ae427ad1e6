//! Resolution of insolvent lending pools by auctioning their reserve fund
//! against the unrecoverable debt accrued by their markets.
//!
//! The [`domain::Shortfall`] engine owns the per-pool auction lifecycle:
//! eligibility, auction-type selection, start-bid computation, competitive
//! bidding bounded by block heights, and atomic multi-asset settlement.
//! Everything the engine needs from the outside world (asset prices, the
//! reserve fund, the markets themselves, token custody and the block
//! counter) is reached through narrow capability traits so deployments and
//! tests inject their own implementations.

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    auction::{Auction, Bid, Kind, Status},
    eth,
    pool::{Market, PoolRegistering, ReserveFunding},
    settlement::{TokenTransferring, TransferError},
    shortfall::{BlockNumbering, Config, Error, Settlement, Shortfall, Update},
    valuation::{Price, Valuating, ValuationError},
};
