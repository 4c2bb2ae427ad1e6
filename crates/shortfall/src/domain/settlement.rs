//! Multi-asset fund movement for escrow and settlement.
//!
//! Escrow and settlement touch several independent collaborators (one token
//! contract per market, plus the reserve fund). A [`Plan`] collects every
//! movement up front and executes them in order; when a step fails, the
//! already-executed prefix is compensated in reverse order so a failed
//! operation leaves no partial custody state behind and the caller can
//! retry.

use {
    crate::domain::{eth, pool::ReserveFunding},
    thiserror::Error,
};

/// A transfer the responsible collaborator refused or could not complete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transfer failed: {0}")]
pub struct TransferError(pub String);

/// Moves asset amounts between external accounts and the engine's custody.
/// Escrowed funds are owned exclusively by the engine until refunded or
/// settled.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenTransferring: Send + Sync {
    /// Pulls `amount` of `asset` out of `from` into engine custody.
    async fn deposit(
        &self,
        asset: eth::TokenAddress,
        from: eth::Address,
        amount: eth::TokenAmount,
    ) -> Result<(), TransferError>;

    /// Releases `amount` of `asset` from engine custody to `to`.
    async fn withdraw(
        &self,
        asset: eth::TokenAddress,
        to: eth::Address,
        amount: eth::TokenAmount,
    ) -> Result<(), TransferError>;
}

/// A single fund movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Escrow: pull bidder funds into custody.
    Deposit {
        asset: eth::TokenAddress,
        from: eth::Address,
        amount: eth::TokenAmount,
    },
    /// Release custody funds: refund an outbid bidder or forward escrow to
    /// a market at settlement.
    Withdraw {
        asset: eth::TokenAddress,
        to: eth::Address,
        amount: eth::TokenAmount,
    },
    /// Pay the auction winner from the pool's reserve. Irreversible, so a
    /// plan must order it after every compensable step.
    Payout {
        pool: eth::PoolId,
        to: eth::Address,
        amount: eth::Value,
    },
}

/// An ordered list of fund movements executed as one logical transaction.
#[derive(Debug, Default)]
pub struct Plan(Vec<Step>);

impl Plan {
    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    /// Executes the steps in order. If one fails, the executed prefix is
    /// compensated in reverse order and the original error is returned.
    /// Compensation is best effort: a collaborator refusing the reversal is
    /// logged and skipped.
    pub async fn execute(
        self,
        tokens: &dyn TokenTransferring,
        reserve: &dyn ReserveFunding,
    ) -> Result<(), TransferError> {
        let mut executed: Vec<Step> = Vec::with_capacity(self.0.len());
        for step in self.0 {
            if let Err(err) = apply(&step, tokens, reserve).await {
                tracing::warn!(?step, ?err, "settlement step failed, compensating");
                for done in executed.iter().rev() {
                    if let Err(err) = compensate(done, tokens).await {
                        tracing::error!(?done, ?err, "failed to compensate settlement step");
                    }
                }
                return Err(err);
            }
            executed.push(step);
        }
        Ok(())
    }
}

async fn apply(
    step: &Step,
    tokens: &dyn TokenTransferring,
    reserve: &dyn ReserveFunding,
) -> Result<(), TransferError> {
    match step {
        Step::Deposit {
            asset,
            from,
            amount,
        } => tokens.deposit(*asset, *from, *amount).await,
        Step::Withdraw { asset, to, amount } => tokens.withdraw(*asset, *to, *amount).await,
        Step::Payout { pool, to, amount } => reserve.payout(*pool, *to, *amount).await,
    }
}

async fn compensate(step: &Step, tokens: &dyn TokenTransferring) -> Result<(), TransferError> {
    match step {
        Step::Deposit {
            asset,
            from,
            amount,
        } => tokens.withdraw(*asset, *from, *amount).await,
        Step::Withdraw { asset, to, amount } => tokens.deposit(*asset, *to, *amount).await,
        // Plans order the payout last, so there is never an executed payout
        // to reverse by the time a step fails.
        Step::Payout { .. } => Err(TransferError("reserve payouts cannot be reversed".into())),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::pool::MockReserveFunding,
        hex_literal::hex,
        std::sync::Arc,
    };

    fn asset() -> eth::TokenAddress {
        eth::TokenAddress(eth::H160(hex!("00000000000000000000000000000000000000aa")))
    }

    fn bidder() -> eth::Address {
        eth::Address(eth::H160(hex!("00000000000000000000000000000000000000bb")))
    }

    #[tokio::test]
    async fn executes_steps_in_order() {
        let mut tokens = MockTokenTransferring::new();
        let mut sequence = mockall::Sequence::new();
        tokens
            .expect_deposit()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(()));
        tokens
            .expect_withdraw()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(()));
        let reserve = MockReserveFunding::new();

        let mut plan = Plan::default();
        plan.push(Step::Deposit {
            asset: asset(),
            from: bidder(),
            amount: eth::TokenAmount::from(10u128),
        });
        plan.push(Step::Withdraw {
            asset: asset(),
            to: bidder(),
            amount: eth::TokenAmount::from(10u128),
        });
        assert!(plan.execute(&tokens, &reserve).await.is_ok());
    }

    #[tokio::test]
    async fn compensates_executed_prefix_on_failure() {
        let deposited = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut tokens = MockTokenTransferring::new();
        let log = deposited.clone();
        tokens.expect_deposit().returning(move |_, from, amount| {
            log.lock().unwrap().push((from, amount));
            Ok(())
        });
        // The refund to the previous bidder fails; the fresh deposit has to
        // be returned.
        tokens
            .expect_withdraw()
            .withf(|_, to, _| *to != bidder())
            .returning(|_, _, _| Err(TransferError("rejected".into())));
        tokens
            .expect_withdraw()
            .withf(|_, to, _| *to == bidder())
            .times(1)
            .returning(|_, _, _| Ok(()));
        let reserve = MockReserveFunding::new();

        let mut plan = Plan::default();
        plan.push(Step::Deposit {
            asset: asset(),
            from: bidder(),
            amount: eth::TokenAmount::from(10u128),
        });
        plan.push(Step::Withdraw {
            asset: asset(),
            to: eth::Address::default(),
            amount: eth::TokenAmount::from(10u128),
        });
        assert!(plan.execute(&tokens, &reserve).await.is_err());
        assert_eq!(deposited.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn payout_failure_reverses_market_transfers() {
        let mut tokens = MockTokenTransferring::new();
        tokens.expect_withdraw().times(1).returning(|_, _, _| Ok(()));
        // Compensation of the executed withdrawal.
        tokens.expect_deposit().times(1).returning(|_, _, _| Ok(()));
        let mut reserve = MockReserveFunding::new();
        reserve
            .expect_payout()
            .times(1)
            .returning(|_, _, _| Err(TransferError("reserve unavailable".into())));

        let mut plan = Plan::default();
        plan.push(Step::Withdraw {
            asset: asset(),
            to: bidder(),
            amount: eth::TokenAmount::from(10u128),
        });
        plan.push(Step::Payout {
            pool: eth::PoolId::default(),
            to: bidder(),
            amount: eth::Value::from(10u128),
        });
        assert!(plan.execute(&tokens, &reserve).await.is_err());
    }
}
