pub mod auction;
pub mod eth;
pub mod pool;
pub mod settlement;
pub mod shortfall;
pub mod valuation;

pub use {
    auction::Auction,
    shortfall::{Config, Error, Settlement, Shortfall},
};
