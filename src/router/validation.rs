// Pre-swap validation module
// Checks a swap request against the input descriptor, the attached value, the
// router configuration and the asset registry before any asset moves
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};

use crate::chain::NATIVE;
use crate::errors::{GatewayError, ValidationError};
use crate::registry::AssetRegistry;
use crate::router::router::RouterConfig;
use crate::router::routes::{AssetIn, SwapRequest};

/// What a validated swap will do with assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    /// Asset the engine takes custody of before the router call. The
    /// wrapped-native token for native input on the path-array router.
    pub custody_asset: Address,
    /// Asset the order settles in.
    pub settle_asset: Address,
    /// Wrap attached value before invoking the router.
    pub wrap_input: bool,
    /// Unwrap router output into native value before settlement.
    pub unwrap_output: bool,
}

/// Validate a swap-based order creation before anything moves.
pub fn validate_swap(
    config: &RouterConfig,
    registry: &AssetRegistry,
    asset_in: AssetIn,
    request: &SwapRequest,
    attached_value: U256,
) -> Result<SwapPlan, GatewayError> {
    let amount_in = request.amount_in();
    if amount_in.is_zero() {
        return Err(ValidationError::ZeroAmount.into());
    }
    if let SwapRequest::V2Path { path, .. } = request {
        if path.len() < 2 {
            return Err(ValidationError::PathTooShort(path.len()).into());
        }
        if path.iter().any(|asset| asset.is_zero()) {
            return Err(ValidationError::ZeroAddress("path asset").into());
        }
    }

    let route_in = request.route_input()?;
    let route_out = request.route_output()?;

    let (custody_asset, wrap_input) = match asset_in {
        AssetIn::Native => {
            if attached_value != amount_in {
                return Err(ValidationError::ValueMismatch {
                    expected: amount_in,
                    attached: attached_value,
                }
                .into());
            }
            let wrapped = config.wrapped_native()?;
            let accepted = match request {
                SwapRequest::V2Path { .. } => route_in == wrapped,
                _ => route_in == wrapped || route_in == NATIVE,
            };
            if !accepted {
                return Err(ValidationError::InputMismatch {
                    given: NATIVE,
                    route: route_in,
                }
                .into());
            }
            match request {
                SwapRequest::V2Path { .. } => (wrapped, true),
                _ => (NATIVE, false),
            }
        }
        AssetIn::Token(token) => {
            if token.is_zero() {
                return Err(ValidationError::ZeroAddress("input token").into());
            }
            if !attached_value.is_zero() {
                return Err(ValidationError::ValueMismatch {
                    expected: U256::ZERO,
                    attached: attached_value,
                }
                .into());
            }
            if token == NATIVE || token != route_in {
                return Err(ValidationError::InputMismatch {
                    given: token,
                    route: route_in,
                }
                .into());
            }
            (token, false)
        }
    };

    let unwrap_output = match request {
        SwapRequest::V2Path { .. } => false,
        SwapRequest::V3Single { .. } | SwapRequest::V3MultiHop { .. } => route_out == NATIVE,
    };
    if unwrap_output {
        config.wrapped_native()?;
    }
    if route_out.is_zero() {
        return Err(ValidationError::ZeroAddress("output asset").into());
    }
    registry.ensure_supported(route_out)?;

    Ok(SwapPlan {
        custody_asset,
        settle_asset: route_out,
        wrap_input,
        unwrap_output,
    })
}
