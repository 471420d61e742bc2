// Gateway - order creation entry points, privileged configuration and queries
// This file ties the asset registry, the swap execution engine, settlement and
// the order ledger together and runs every entry point as one atomic unit
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use serde::Serialize;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::chain::{Chain, Event, NATIVE};
use crate::control::ReentrancyGuard;
use crate::errors::{GatewayError, ValidationError};
use crate::ledger::{Order, OrderLedger};
use crate::metrics;
use crate::registry::AssetRegistry;
use crate::router::{
    validate_swap, AssetIn, EstimateRequest, ExecutionEngine, RouterAdapter, RouterConfig,
    RouterVersion, SwapRequest,
};
use crate::settlement::{self, OrderTerms};
use crate::venues::Venues;

/// Caller identity and attached native value of an entry-point call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub caller: Address,
    pub value: U256,
}

impl Call {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Result of a swap-based order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
    pub order_id: u64,
    pub asset_out: Address,
    pub amount_out: U256,
    pub version: RouterVersion,
}

/// Read-only configuration view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub path_router: Address,
    pub concentrated_router: Address,
    pub quoter: Address,
    pub wrapped_native: Address,
    pub total_orders: u64,
}

#[derive(Debug, Default)]
struct GatewayState {
    config: RouterConfig,
    registry: AssetRegistry,
    ledger: OrderLedger,
}

pub struct Gateway {
    address: Address,
    owner: Address,
    engine: ExecutionEngine,
    guard: ReentrancyGuard,
    state: RwLock<GatewayState>,
}

impl Gateway {
    /// Gateway custodying funds at `address`, administered by `owner`.
    pub fn new(address: Address, owner: Address, venues: Venues) -> Self {
        Self {
            address,
            owner,
            engine: ExecutionEngine::new(RouterAdapter::new(venues), address),
            guard: ReentrancyGuard::new(),
            state: RwLock::new(GatewayState::default()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Create an order from an asset the caller already holds.
    ///
    /// Tokens are pulled with the caller's allowance; native value must be
    /// attached and equal `amount`. The fee is taken from `amount`.
    pub fn create_order(
        &self,
        chain: &mut Chain,
        call: Call,
        token: Address,
        amount: U256,
        terms: OrderTerms,
    ) -> Result<u64, GatewayError> {
        let _permit = self.guard.enter()?;
        self.check_direct(call, token, amount, &terms)
            .inspect_err(|err| reject("create_order", err))?;

        self.atomically(chain, "create_order", |chain| {
            self.receive_value(chain, call)?;
            if token != NATIVE {
                chain.transfer_from(token, self.address, call.caller, self.address, amount)?;
            }
            let id = settlement::settle(
                chain,
                &mut self.write().ledger,
                self.address,
                call.caller,
                token,
                amount,
                &terms,
            )?;
            metrics::ORDERS_CREATED.with_label_values(&["direct"]).inc();
            Ok(id)
        })
    }

    /// Swap the caller's input through a router and settle the output.
    ///
    /// The fee is taken from the swap output. If the router reverts, the
    /// input goes back to `terms.refund_address`, no order is recorded and
    /// the call fails with [`GatewayError::SwapFailed`].
    pub fn create_order_with_swap(
        &self,
        chain: &mut Chain,
        call: Call,
        asset_in: AssetIn,
        request: SwapRequest,
        terms: OrderTerms,
    ) -> Result<SwapReceipt, GatewayError> {
        let _permit = self.guard.enter()?;
        let (config, plan) = {
            let state = self.read();
            let checked = terms.validate().map_err(GatewayError::from).and_then(|_| {
                validate_swap(&state.config, &state.registry, asset_in, &request, call.value)
            });
            match checked {
                Ok(plan) => (state.config, plan),
                Err(err) => {
                    reject("create_order_with_swap", &err);
                    return Err(err);
                }
            }
        };

        self.atomically(chain, "create_order_with_swap", |chain| {
            self.receive_value(chain, call)?;
            let outcome = self.engine.execute(
                chain,
                &config,
                call.caller,
                asset_in,
                &request,
                &plan,
                terms.refund_address,
            )?;
            let order_id = settlement::settle(
                chain,
                &mut self.write().ledger,
                self.address,
                call.caller,
                outcome.asset_out,
                outcome.amount_out,
                &terms,
            )?;
            metrics::ORDERS_CREATED
                .with_label_values(&[outcome.version.as_str()])
                .inc();
            Ok(SwapReceipt {
                order_id,
                asset_out: outcome.asset_out,
                amount_out: outcome.amount_out,
                version: outcome.version,
            })
        })
    }

    pub fn set_path_router(
        &self,
        chain: &mut Chain,
        caller: Address,
        router: Address,
    ) -> Result<(), GatewayError> {
        self.configure(caller, router, "path router")?;
        self.write().config.path_router = router;
        chain.emit(Event::RouterUpdated {
            version: RouterVersion::V2,
            router,
        });
        info!(%router, "path router updated");
        Ok(())
    }

    pub fn set_concentrated_router(
        &self,
        chain: &mut Chain,
        caller: Address,
        router: Address,
    ) -> Result<(), GatewayError> {
        self.configure(caller, router, "concentrated-liquidity router")?;
        self.write().config.concentrated_router = router;
        chain.emit(Event::RouterUpdated {
            version: RouterVersion::V3,
            router,
        });
        info!(%router, "concentrated-liquidity router updated");
        Ok(())
    }

    pub fn set_quoter(
        &self,
        chain: &mut Chain,
        caller: Address,
        quoter: Address,
    ) -> Result<(), GatewayError> {
        self.configure(caller, quoter, "quoter")?;
        self.write().config.quoter = quoter;
        chain.emit(Event::QuoterUpdated { quoter });
        info!(%quoter, "quoter updated");
        Ok(())
    }

    pub fn set_wrapped_native(
        &self,
        chain: &mut Chain,
        caller: Address,
        wrapped_native: Address,
    ) -> Result<(), GatewayError> {
        self.configure(caller, wrapped_native, "wrapped native asset")?;
        self.write().config.wrapped_native = wrapped_native;
        chain.emit(Event::WrappedNativeUpdated { wrapped_native });
        info!(%wrapped_native, "wrapped native asset updated");
        Ok(())
    }

    /// Validity window (seconds) passed as the path-array router deadline.
    pub fn set_deadline_window(&self, caller: Address, seconds: u64) -> Result<(), GatewayError> {
        self.only_owner(caller)?;
        if seconds == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }
        self.write().config.deadline_window_secs = seconds;
        Ok(())
    }

    pub fn set_asset_support(
        &self,
        chain: &mut Chain,
        caller: Address,
        asset: Address,
        supported: bool,
    ) -> Result<(), GatewayError> {
        self.configure(caller, asset, "asset")?;
        self.write().registry.set(asset, supported);
        chain.emit(Event::AssetSupportUpdated { asset, supported });
        Ok(())
    }

    /// Set many support flags at once. Nothing is applied unless every entry
    /// is valid.
    pub fn batch_set_asset_support(
        &self,
        chain: &mut Chain,
        caller: Address,
        assets: &[Address],
        supported: &[bool],
    ) -> Result<(), GatewayError> {
        self.only_owner(caller)?;
        if assets.len() != supported.len() {
            return Err(ValidationError::LengthMismatch {
                left_name: "assets",
                left: assets.len(),
                right_name: "flags",
                right: supported.len(),
            }
            .into());
        }
        if assets.iter().any(|asset| asset.is_zero()) {
            return Err(ValidationError::ZeroAddress("asset").into());
        }
        let mut state = self.write();
        for (asset, flag) in assets.iter().zip(supported) {
            state.registry.set(*asset, *flag);
            chain.emit(Event::AssetSupportUpdated {
                asset: *asset,
                supported: *flag,
            });
        }
        info!(count = assets.len(), "asset support updated");
        Ok(())
    }

    /// Move any held asset out of custody, outside of order accounting.
    pub fn emergency_withdraw(
        &self,
        chain: &mut Chain,
        caller: Address,
        asset: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), GatewayError> {
        self.only_owner(caller)?;
        if asset.is_zero() {
            return Err(ValidationError::ZeroAddress("asset").into());
        }
        if to.is_zero() {
            return Err(ValidationError::ZeroAddress("recipient").into());
        }
        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }
        self.atomically(chain, "emergency_withdraw", |chain| {
            chain.transfer(asset, self.address, to, amount)?;
            warn!(%asset, %to, %amount, "emergency withdrawal");
            Ok(())
        })
    }

    pub fn order(&self, id: u64) -> Option<Order> {
        self.read().ledger.get(id).cloned()
    }

    pub fn order_count(&self) -> u64 {
        self.read().ledger.count()
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        let state = self.read();
        ConfigSnapshot {
            path_router: state.config.path_router,
            concentrated_router: state.config.concentrated_router,
            quoter: state.config.quoter,
            wrapped_native: state.config.wrapped_native,
            total_orders: state.ledger.count(),
        }
    }

    pub fn is_asset_supported(&self, asset: Address) -> bool {
        self.read().registry.is_supported(asset)
    }

    pub fn batch_is_supported(&self, assets: &[Address]) -> Vec<bool> {
        self.read().registry.check_many(assets)
    }

    pub fn estimate(&self, chain: &Chain, request: &EstimateRequest) -> Result<U256, GatewayError> {
        let config = self.read().config;
        self.engine.adapter().estimate(chain, &config, request)
    }

    pub fn estimate_v2_pair(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, GatewayError> {
        self.estimate(
            chain,
            &EstimateRequest::V2Pair {
                token_in,
                token_out,
                amount_in,
            },
        )
    }

    pub fn estimate_v2_path(
        &self,
        chain: &Chain,
        path: Vec<Address>,
        amount_in: U256,
    ) -> Result<U256, GatewayError> {
        self.estimate(chain, &EstimateRequest::V2Path { path, amount_in })
    }

    pub fn estimate_v3_single(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        fee_tier: u32,
        amount_in: U256,
    ) -> Result<U256, GatewayError> {
        self.estimate(
            chain,
            &EstimateRequest::V3Single {
                token_in,
                token_out,
                fee_tier,
                amount_in,
            },
        )
    }

    pub fn estimate_v3_path(
        &self,
        chain: &Chain,
        encoded_path: alloy_primitives::Bytes,
        amount_in: U256,
    ) -> Result<U256, GatewayError> {
        self.estimate(
            chain,
            &EstimateRequest::V3Path {
                encoded_path,
                amount_in,
            },
        )
    }

    fn read(&self) -> RwLockReadGuard<'_, GatewayState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GatewayState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn only_owner(&self, caller: Address) -> Result<(), GatewayError> {
        if caller != self.owner {
            warn!(%caller, "unprivileged configuration attempt");
            return Err(GatewayError::Unauthorized(caller));
        }
        Ok(())
    }

    fn configure(&self, caller: Address, value: Address, what: &'static str) -> Result<(), GatewayError> {
        self.only_owner(caller)?;
        if value.is_zero() {
            return Err(ValidationError::ZeroAddress(what).into());
        }
        Ok(())
    }

    fn check_direct(
        &self,
        call: Call,
        token: Address,
        amount: U256,
        terms: &OrderTerms,
    ) -> Result<(), GatewayError> {
        terms.validate()?;
        if token.is_zero() {
            return Err(ValidationError::ZeroAddress("token").into());
        }
        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }
        let expected = if token == NATIVE { amount } else { U256::ZERO };
        if call.value != expected {
            return Err(ValidationError::ValueMismatch {
                expected,
                attached: call.value,
            }
            .into());
        }
        self.read().registry.ensure_supported(token)?;
        Ok(())
    }

    /// Attached value moves to the gateway before the body runs.
    fn receive_value(&self, chain: &mut Chain, call: Call) -> Result<(), GatewayError> {
        if !call.value.is_zero() {
            chain.transfer(NATIVE, call.caller, self.address, call.value)?;
        }
        Ok(())
    }

    /// Run `body` as one unit of work. On error everything it did is
    /// reverted, except after a swap failure, whose compensating refund is
    /// the outcome of the call.
    fn atomically<T>(
        &self,
        chain: &mut Chain,
        entry: &'static str,
        body: impl FnOnce(&mut Chain) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let checkpoint = chain.checkpoint();
        match body(chain) {
            Ok(value) => {
                chain.commit(checkpoint);
                Ok(value)
            }
            Err(err @ GatewayError::SwapFailed { .. }) => {
                chain.commit(checkpoint);
                reject(entry, &err);
                Err(err)
            }
            Err(err) => {
                chain.revert_to(checkpoint);
                reject(entry, &err);
                Err(err)
            }
        }
    }
}

fn reject(entry: &'static str, err: &GatewayError) {
    metrics::REJECTED_CALLS
        .with_label_values(&[err.kind()])
        .inc();
    warn!(entry, error = %err, "call rejected");
}
