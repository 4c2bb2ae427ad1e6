//! Engine configuration loaded from a TOML file.

use {
    crate::domain::{eth, shortfall},
    anyhow::{Context, Result},
    serde::Deserialize,
    std::path::Path,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// Common-unit value below which no auction may start, as a decimal
    /// string of the 18-digit representation.
    minimum_pool_bad_debt: String,
    /// Blocks a leading bid must go unimproved before an auction becomes
    /// closable.
    #[serde(default = "default_next_bidder_block_limit")]
    next_bidder_block_limit: u64,
    /// Auction incentive in basis points: the premium on the debt value
    /// when the reserve is ample, the discount on the reserve value when it
    /// is scarce.
    #[serde(default = "default_incentive_bps")]
    incentive_bps: u16,
}

fn default_next_bidder_block_limit() -> u64 {
    10
}

fn default_incentive_bps() -> u16 {
    1_000
}

/// Reads the engine configuration from `path`. The pool registry identity
/// is not part of the file; it is set at runtime through the owner-gated
/// setter.
pub fn load(path: &Path) -> Result<shortfall::Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {path:?}"))?;
    parse(&data)
}

fn parse(data: &str) -> Result<shortfall::Config> {
    let file: File = toml::from_str(data).context("invalid configuration")?;
    anyhow::ensure!(
        file.incentive_bps <= eth::Bps::MAX.0,
        "incentive-bps must not exceed {}",
        eth::Bps::MAX.0,
    );
    let minimum = eth::U256::from_dec_str(&file.minimum_pool_bad_debt)
        .context("minimum-pool-bad-debt is not a decimal number")?;
    Ok(shortfall::Config {
        pool_registry: None,
        minimum_pool_bad_debt: eth::Value(minimum),
        next_bidder_block_limit: file.next_bidder_block_limit,
        incentive: eth::Bps(file.incentive_bps),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_file() {
        let config = parse(
            r#"
                minimum-pool-bad-debt = "10000000000000000000000"
                next-bidder-block-limit = 100
                incentive-bps = 500
            "#,
        )
        .unwrap();
        assert_eq!(
            config.minimum_pool_bad_debt,
            eth::Value(eth::U256::from(10_000u64) * eth::U256::exp10(18)),
        );
        assert_eq!(config.next_bidder_block_limit, 100);
        assert_eq!(config.incentive, eth::Bps(500));
        assert_eq!(config.pool_registry, None);
    }

    #[test]
    fn applies_defaults() {
        let config = parse(r#"minimum-pool-bad-debt = "1000""#).unwrap();
        assert_eq!(config.next_bidder_block_limit, 10);
        assert_eq!(config.incentive, eth::Bps(1_000));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(parse(
            r#"
                minimum-pool-bad-debt = "1000"
                bidder-block-limit = 100
            "#,
        )
        .is_err());
    }

    #[test]
    fn rejects_oversized_incentives() {
        assert!(parse(
            r#"
                minimum-pool-bad-debt = "1000"
                incentive-bps = 10001
            "#,
        )
        .is_err());
    }
}
