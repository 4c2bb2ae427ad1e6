use {
    shortfall::{eth, BlockNumbering},
    std::sync::atomic::{AtomicU64, Ordering},
};

/// A manually advanced block counter.
#[derive(Debug, Default)]
pub struct Blocks(AtomicU64);

impl Blocks {
    pub fn at(height: u64) -> Self {
        Self(AtomicU64::new(height))
    }

    pub fn advance(&self, blocks: u64) {
        self.0.fetch_add(blocks, Ordering::SeqCst);
    }
}

impl BlockNumbering for Blocks {
    fn current(&self) -> eth::BlockNumber {
        eth::BlockNumber(self.0.load(Ordering::SeqCst))
    }
}
