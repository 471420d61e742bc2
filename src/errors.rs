// Error types and error handling module
// This file defines the error taxonomy shared by the gateway, the swap engine,
// the settlement layer and the host environment
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::router::routes::RouterVersion;

/// Top-level error returned by every gateway entry point.
///
/// Any error aborts the call and the host rolls back everything the call
/// touched, except for the compensating refund that accompanies
/// [`GatewayError::SwapFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("caller {0} is not privileged")]
    Unauthorized(Address),
    #[error("swap failed on {version} router: {reason}")]
    SwapFailed { version: RouterVersion, reason: String },
    /// A read-only quote reverted. Nothing moved.
    #[error("estimate failed on {version} router: {reason}")]
    EstimateFailed { version: RouterVersion, reason: String },
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
    #[error("configuration error: {0}")]
    Configuration(&'static str),
    #[error("reentrant call rejected")]
    Reentrancy,
}

impl GatewayError {
    /// Stable label used for metrics and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Unauthorized(_) => "authorization",
            GatewayError::SwapFailed { .. } => "swap_failed",
            GatewayError::EstimateFailed { .. } => "estimate_failed",
            GatewayError::TransferFailed(_) => "transfer_failed",
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Reentrancy => "reentrancy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("fee percent {0} exceeds the cap of 1000 basis points")]
    FeeTooHigh(u16),
    #[error("path must contain at least 2 assets, got {0}")]
    PathTooShort(usize),
    #[error("length mismatch: {left} {left_name} vs {right} {right_name}")]
    LengthMismatch {
        left_name: &'static str,
        left: usize,
        right_name: &'static str,
        right: usize,
    },
    #[error("asset {0} is not supported")]
    UnsupportedAsset(Address),
    #[error("attached value {attached} does not match required {expected}")]
    ValueMismatch { expected: U256, attached: U256 },
    #[error("input asset {given} does not match route input {route}")]
    InputMismatch { given: Address, route: Address },
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

/// Failure of an asset movement inside the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance of {asset} held by {holder}: have {available}, need {required}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        available: U256,
        required: U256,
    },
    #[error("insufficient allowance of {asset} from {owner} to {spender}: have {available}, need {required}")]
    InsufficientAllowance {
        asset: Address,
        owner: Address,
        spender: Address,
        available: U256,
        required: U256,
    },
    #[error("{0} rejected native value")]
    NativeRejected(Address),
    #[error("{0} is not a wrapped-native asset")]
    NotWrappedNative(Address),
    #[error("balance overflow")]
    Overflow,
}

/// Errors raised by the binary path codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path of {len} bytes is shorter than an asset identifier")]
    TooShort { len: usize },
    #[error("a path of {tokens} tokens cannot carry {fees} fee tiers")]
    FeeCountMismatch { tokens: usize, fees: usize },
    #[error("fee tier {0} does not fit in 24 bits")]
    FeeOutOfRange(u32),
}
