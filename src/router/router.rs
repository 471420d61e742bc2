// Router adapter
// This file resolves the configured routers and drives either routing protocol
// through one entry point, including the native-value differences between them
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, Bytes, U256};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::chain::{Chain, NATIVE};
use crate::errors::{GatewayError, ValidationError};
use crate::path;
use crate::router::routes::{EstimateRequest, RouterVersion, SwapRequest};
use crate::venues::{
    CallContext, ConcentratedRouter, ExactInputParams, ExactInputSingleParams, PathRouter,
    Quoter, RouterRevert, Venues,
};

/// Default validity window handed to the path-array router.
pub const DEFAULT_DEADLINE_WINDOW_SECS: u64 = 300;

/// Router-related configuration held by the gateway. Zero means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    pub path_router: Address,
    pub concentrated_router: Address,
    pub quoter: Address,
    pub wrapped_native: Address,
    pub deadline_window_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            path_router: Address::ZERO,
            concentrated_router: Address::ZERO,
            quoter: Address::ZERO,
            wrapped_native: Address::ZERO,
            deadline_window_secs: DEFAULT_DEADLINE_WINDOW_SECS,
        }
    }
}

impl RouterConfig {
    pub fn wrapped_native(&self) -> Result<Address, GatewayError> {
        if self.wrapped_native.is_zero() {
            Err(GatewayError::Configuration("wrapped native asset not set"))
        } else {
            Ok(self.wrapped_native)
        }
    }

    /// Map the native sentinel onto the wrapped-native token.
    fn router_token(&self, asset: Address) -> Result<Address, GatewayError> {
        if asset == NATIVE {
            self.wrapped_native()
        } else {
            Ok(asset)
        }
    }

    /// Packed path with native-sentinel ends rewritten to the wrapped-native
    /// token. Paths without a native end are returned unchanged.
    fn router_path(&self, encoded_path: &Bytes) -> Result<Bytes, GatewayError> {
        let first = path::decode_first_token(encoded_path).map_err(ValidationError::from)?;
        let last = path::decode_last_token(encoded_path).map_err(ValidationError::from)?;
        if first != NATIVE && last != NATIVE {
            return Ok(encoded_path.clone());
        }
        let wrapped = self.wrapped_native()?;
        Ok(path::replace_ends(encoded_path, NATIVE, wrapped).map_err(ValidationError::from)?)
    }
}

/// A router resolved from configuration, ready to be invoked.
#[derive(Clone)]
pub enum RouterHandle {
    Path {
        address: Address,
        router: Arc<dyn PathRouter>,
    },
    Concentrated {
        address: Address,
        router: Arc<dyn ConcentratedRouter>,
    },
}

impl RouterHandle {
    pub fn address(&self) -> Address {
        match self {
            RouterHandle::Path { address, .. } | RouterHandle::Concentrated { address, .. } => {
                *address
            }
        }
    }

    pub fn version(&self) -> RouterVersion {
        match self {
            RouterHandle::Path { .. } => RouterVersion::V2,
            RouterHandle::Concentrated { .. } => RouterVersion::V3,
        }
    }
}

/// Uniform swap/estimate capability over both routing protocols.
#[derive(Debug, Clone, Default)]
pub struct RouterAdapter {
    venues: Venues,
}

impl RouterAdapter {
    pub fn new(venues: Venues) -> Self {
        Self { venues }
    }

    pub fn resolve(
        &self,
        config: &RouterConfig,
        version: RouterVersion,
    ) -> Result<RouterHandle, GatewayError> {
        match version {
            RouterVersion::V2 => {
                if config.path_router.is_zero() {
                    return Err(GatewayError::Configuration("path router not set"));
                }
                let router = self
                    .venues
                    .path_router(config.path_router)
                    .ok_or(GatewayError::Configuration("no path router deployed at address"))?;
                Ok(RouterHandle::Path {
                    address: config.path_router,
                    router,
                })
            }
            RouterVersion::V3 => {
                if config.concentrated_router.is_zero() {
                    return Err(GatewayError::Configuration(
                        "concentrated-liquidity router not set",
                    ));
                }
                let router = self
                    .venues
                    .concentrated_router(config.concentrated_router)
                    .ok_or(GatewayError::Configuration(
                        "no concentrated-liquidity router deployed at address",
                    ))?;
                Ok(RouterHandle::Concentrated {
                    address: config.concentrated_router,
                    router,
                })
            }
        }
    }

    pub fn quoter(&self, config: &RouterConfig) -> Result<Arc<dyn Quoter>, GatewayError> {
        if config.quoter.is_zero() {
            return Err(GatewayError::Configuration("quoter not set"));
        }
        self.venues
            .quoter(config.quoter)
            .ok_or(GatewayError::Configuration("no quoter deployed at address"))
    }

    /// Invoke `handle` for `request` on behalf of `custodian`, who receives the
    /// output. With `native_in` on the concentrated router the input is
    /// forwarded as call value instead of being pulled with an allowance.
    ///
    /// Returns the output amount reported by the router. Everything the router
    /// did is still part of the caller's open checkpoint.
    pub fn swap(
        &self,
        chain: &mut Chain,
        config: &RouterConfig,
        handle: &RouterHandle,
        custodian: Address,
        request: &SwapRequest,
        native_in: bool,
    ) -> Result<U256, RouterRevert> {
        let ctx = CallContext::new(custodian);
        match (handle, request) {
            (
                RouterHandle::Path { router, .. },
                SwapRequest::V2Path {
                    path,
                    amount_in,
                    min_out,
                },
            ) => {
                let deadline = chain.timestamp().saturating_add(config.deadline_window_secs);
                let amounts = router.swap_exact_tokens_for_tokens(
                    chain, ctx, *amount_in, *min_out, path, custodian, deadline,
                )?;
                debug!(hops = path.len(), ?amounts, "path router returned");
                amounts
                    .last()
                    .copied()
                    .ok_or_else(|| RouterRevert::new("router returned no amounts"))
            }
            (
                RouterHandle::Concentrated { address, router },
                SwapRequest::V3Single {
                    token_in,
                    token_out,
                    fee_tier,
                    amount_in,
                    min_out,
                },
            ) => {
                let params = ExactInputSingleParams {
                    token_in: config
                        .router_token(*token_in)
                        .map_err(|e| RouterRevert(e.to_string()))?,
                    token_out: config
                        .router_token(*token_out)
                        .map_err(|e| RouterRevert(e.to_string()))?,
                    fee: *fee_tier,
                    recipient: custodian,
                    amount_in: *amount_in,
                    amount_out_minimum: *min_out,
                };
                let ctx = attach_value(chain, ctx, *address, native_in, *amount_in)?;
                router.exact_input_single(chain, ctx, &params)
            }
            (
                RouterHandle::Concentrated { address, router },
                SwapRequest::V3MultiHop {
                    encoded_path,
                    amount_in,
                    min_out,
                },
            ) => {
                let params = ExactInputParams {
                    path: config
                        .router_path(encoded_path)
                        .map_err(|e| RouterRevert(e.to_string()))?,
                    recipient: custodian,
                    amount_in: *amount_in,
                    amount_out_minimum: *min_out,
                };
                let ctx = attach_value(chain, ctx, *address, native_in, *amount_in)?;
                router.exact_input(chain, ctx, &params)
            }
            _ => Err(RouterRevert::new("request does not match router protocol")),
        }
    }

    /// Read-only output estimate. Nothing in `chain` changes.
    pub fn estimate(
        &self,
        chain: &Chain,
        config: &RouterConfig,
        request: &EstimateRequest,
    ) -> Result<U256, GatewayError> {
        match request {
            EstimateRequest::V2Pair {
                token_in,
                token_out,
                amount_in,
            } => {
                let path = [config.router_token(*token_in)?, config.router_token(*token_out)?];
                self.estimate_v2(chain, config, &path, *amount_in)
            }
            EstimateRequest::V2Path { path, amount_in } => {
                self.estimate_v2(chain, config, path, *amount_in)
            }
            EstimateRequest::V3Single {
                token_in,
                token_out,
                fee_tier,
                amount_in,
            } => {
                require_amount(*amount_in)?;
                let quoter = self.quoter(config)?;
                quoter
                    .quote_exact_input_single(
                        chain,
                        config.router_token(*token_in)?,
                        config.router_token(*token_out)?,
                        *fee_tier,
                        *amount_in,
                    )
                    .map_err(|revert| estimate_failed(RouterVersion::V3, revert))
            }
            EstimateRequest::V3Path {
                encoded_path,
                amount_in,
            } => {
                require_amount(*amount_in)?;
                let encoded_path = config.router_path(encoded_path)?;
                let quoter = self.quoter(config)?;
                quoter
                    .quote_exact_input(chain, &encoded_path, *amount_in)
                    .map_err(|revert| estimate_failed(RouterVersion::V3, revert))
            }
        }
    }

    fn estimate_v2(
        &self,
        chain: &Chain,
        config: &RouterConfig,
        path: &[Address],
        amount_in: U256,
    ) -> Result<U256, GatewayError> {
        if path.len() < 2 {
            return Err(ValidationError::PathTooShort(path.len()).into());
        }
        require_amount(amount_in)?;
        let RouterHandle::Path { router, .. } = self.resolve(config, RouterVersion::V2)? else {
            return Err(GatewayError::Configuration("path router not set"));
        };
        let amounts = router
            .get_amounts_out(chain, amount_in, path)
            .map_err(|revert| estimate_failed(RouterVersion::V2, revert))?;
        amounts
            .last()
            .copied()
            .ok_or_else(|| estimate_failed(RouterVersion::V2, RouterRevert::new("no amounts")))
    }
}

/// Forward native input to the concentrated router as call value.
fn attach_value(
    chain: &mut Chain,
    ctx: CallContext,
    router: Address,
    native_in: bool,
    amount_in: U256,
) -> Result<CallContext, RouterRevert> {
    if !native_in {
        return Ok(ctx);
    }
    chain
        .transfer(NATIVE, ctx.sender, router, amount_in)
        .map_err(|e| RouterRevert(e.to_string()))?;
    Ok(ctx.with_value(amount_in))
}

fn require_amount(amount: U256) -> Result<(), GatewayError> {
    if amount.is_zero() {
        return Err(ValidationError::ZeroAmount.into());
    }
    Ok(())
}

fn estimate_failed(version: RouterVersion, revert: RouterRevert) -> GatewayError {
    GatewayError::EstimateFailed {
        version,
        reason: revert.0,
    }
}
