// Execution engine - takes custody, authorizes the router, invokes it and
// compensates the caller when the router reverts
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use tracing::{info, warn};

use crate::chain::{Chain, Event, NATIVE};
use crate::errors::GatewayError;
use crate::metrics;
use crate::router::router::{RouterAdapter, RouterConfig, RouterHandle};
use crate::router::routes::{AssetIn, RouterVersion, SwapRequest};
use crate::router::validation::SwapPlan;

/// Output of a successful swap, held in custody by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub asset_out: Address,
    pub amount_out: U256,
    pub version: RouterVersion,
}

/// Swap execution engine bound to the custody address of the gateway.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    adapter: RouterAdapter,
    custodian: Address,
}

impl ExecutionEngine {
    pub fn new(adapter: RouterAdapter, custodian: Address) -> Self {
        Self { adapter, custodian }
    }

    pub fn adapter(&self) -> &RouterAdapter {
        &self.adapter
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// Run one validated swap.
    ///
    /// Native input must already sit with the custodian (attached value).
    /// On a router revert the input is returned to `refund_to` and
    /// [`GatewayError::SwapFailed`] is returned; the router's own effects are
    /// discarded. Any other error leaves cleanup to the caller's rollback.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip_all, fields(version = %request.version(), native_in = asset_in.is_native()))]
    pub fn execute(
        &self,
        chain: &mut Chain,
        config: &RouterConfig,
        caller: Address,
        asset_in: AssetIn,
        request: &SwapRequest,
        plan: &SwapPlan,
        refund_to: Address,
    ) -> Result<SwapOutcome, GatewayError> {
        let handle = self.adapter.resolve(config, request.version())?;
        let version = handle.version();
        let amount_in = request.amount_in();

        self.take_custody(chain, asset_in, plan, amount_in, caller)?;
        if plan.custody_asset != NATIVE {
            chain.approve(plan.custody_asset, self.custodian, handle.address(), amount_in);
        }

        let router_out = if plan.unwrap_output {
            config.wrapped_native()?
        } else {
            plan.settle_asset
        };
        let held_before = chain.balance_of(router_out, self.custodian);

        let checkpoint = chain.checkpoint();
        let result = self.adapter.swap(
            chain,
            config,
            &handle,
            self.custodian,
            request,
            asset_in.is_native(),
        );
        let amount_out = match result {
            Ok(amount_out) => {
                chain.commit(checkpoint);
                amount_out
            }
            Err(revert) => {
                chain.revert_to(checkpoint);
                metrics::SWAPS
                    .with_label_values(&[version.as_str(), "reverted"])
                    .inc();
                warn!(
                    router = %handle.address(),
                    reason = %revert,
                    refund_to = %refund_to,
                    "router reverted; refunding input"
                );
                self.refund(chain, &handle, plan, amount_in, refund_to)?;
                return Err(GatewayError::SwapFailed {
                    version,
                    reason: revert.0,
                });
            }
        };

        if plan.custody_asset != NATIVE {
            chain.approve(plan.custody_asset, self.custodian, handle.address(), U256::ZERO);
        }

        let received = chain
            .balance_of(router_out, self.custodian)
            .saturating_sub(held_before);
        if received < amount_out {
            warn!(
                reported = %amount_out,
                received = %received,
                "router reported more output than it delivered"
            );
        }

        if plan.unwrap_output {
            chain.withdraw(router_out, self.custodian, amount_out)?;
        }

        chain.emit(Event::SwapExecuted {
            asset_in: asset_in.asset(),
            asset_out: plan.settle_asset,
            amount_in,
            amount_out,
            version,
        });
        metrics::SWAPS
            .with_label_values(&[version.as_str(), "ok"])
            .inc();
        info!(
            router = %handle.address(),
            amount_in = %amount_in,
            amount_out = %amount_out,
            asset_out = %plan.settle_asset,
            "swap executed"
        );

        Ok(SwapOutcome {
            asset_out: plan.settle_asset,
            amount_out,
            version,
        })
    }

    fn take_custody(
        &self,
        chain: &mut Chain,
        asset_in: AssetIn,
        plan: &SwapPlan,
        amount_in: U256,
        caller: Address,
    ) -> Result<(), GatewayError> {
        match asset_in {
            AssetIn::Native if plan.wrap_input => {
                chain.deposit(plan.custody_asset, self.custodian, amount_in)?;
            }
            AssetIn::Native => {}
            AssetIn::Token(token) => {
                chain.transfer_from(token, self.custodian, caller, self.custodian, amount_in)?;
            }
        }
        Ok(())
    }

    /// Compensating action for a reverted router call.
    fn refund(
        &self,
        chain: &mut Chain,
        handle: &RouterHandle,
        plan: &SwapPlan,
        amount_in: U256,
        refund_to: Address,
    ) -> Result<(), GatewayError> {
        if plan.custody_asset != NATIVE {
            chain.approve(plan.custody_asset, self.custodian, handle.address(), U256::ZERO);
        }
        let kind = if plan.wrap_input {
            chain.withdraw(plan.custody_asset, self.custodian, amount_in)?;
            chain.transfer(NATIVE, self.custodian, refund_to, amount_in)?;
            "wrapped_native"
        } else if plan.custody_asset == NATIVE {
            chain.transfer(NATIVE, self.custodian, refund_to, amount_in)?;
            "native"
        } else {
            chain.transfer(plan.custody_asset, self.custodian, refund_to, amount_in)?;
            "token"
        };
        metrics::REFUNDS.with_label_values(&[kind]).inc();
        Ok(())
    }
}
