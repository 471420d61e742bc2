// Settlement and fee splitting
// This file computes the protocol fee on a settled amount, distributes fee and
// net amount out of custody, and records the resulting order
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use tracing::info;

use crate::chain::{Chain, Event, NATIVE};
use crate::errors::{GatewayError, ValidationError};
use crate::ledger::{Order, OrderLedger};
use crate::metrics;

/// Fee cap in basis points (10%).
pub const MAX_FEE_BPS: u16 = 1000;
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Caller-supplied order parameters shared by every creation path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTerms {
    pub rate: U256,
    pub refund_address: Address,
    pub liquidity_provider: Address,
    pub fee_recipient: Address,
    pub fee_percent: u16,
}

impl OrderTerms {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fee_percent > MAX_FEE_BPS {
            return Err(ValidationError::FeeTooHigh(self.fee_percent));
        }
        if self.refund_address.is_zero() {
            return Err(ValidationError::ZeroAddress("refund address"));
        }
        if self.liquidity_provider.is_zero() {
            return Err(ValidationError::ZeroAddress("liquidity provider"));
        }
        if self.fee_recipient.is_zero() {
            return Err(ValidationError::ZeroAddress("fee recipient"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee_amount: U256,
    pub net_amount: U256,
}

/// `fee = floor(amount * fee_percent / 10000)`, remainder to the net side.
///
/// Evaluated as `q * f + floor(r * f / 10000)` with `amount = q * 10000 + r`,
/// which is exact and cannot overflow.
pub fn split_fee(amount: U256, fee_percent: u16) -> FeeSplit {
    let denominator = U256::from(BPS_DENOMINATOR);
    let fee = U256::from(fee_percent);
    let (quotient, remainder) = amount.div_rem(denominator);
    let fee_amount = quotient * fee + remainder * fee / denominator;
    FeeSplit {
        fee_amount,
        net_amount: amount - fee_amount,
    }
}

/// Distribute `amount` of `token` held by `custodian`, then append the order.
///
/// Returns the new order id. A failed distribution surfaces as
/// [`GatewayError::TransferFailed`] and the caller's unit of work is reverted.
pub fn settle(
    chain: &mut Chain,
    ledger: &mut OrderLedger,
    custodian: Address,
    creator: Address,
    token: Address,
    amount: U256,
    terms: &OrderTerms,
) -> Result<u64, GatewayError> {
    let split = split_fee(amount, terms.fee_percent);

    if !split.fee_amount.is_zero() {
        chain.transfer(token, custodian, terms.fee_recipient, split.fee_amount)?;
    }
    chain.transfer(token, custodian, terms.liquidity_provider, split.net_amount)?;

    let id = ledger.append(Order {
        token,
        amount,
        rate: terms.rate,
        creator,
        refund_address: terms.refund_address,
        liquidity_provider: terms.liquidity_provider,
        fee_recipient: terms.fee_recipient,
        fee_percent: terms.fee_percent,
        is_fulfilled: true,
        is_refunded: false,
        timestamp: chain.timestamp(),
    });

    chain.emit(Event::OrderCreated {
        id,
        token,
        amount,
        rate: terms.rate,
        refund_address: terms.refund_address,
        liquidity_provider: terms.liquidity_provider,
        fee_recipient: terms.fee_recipient,
        fee_percent: terms.fee_percent,
    });
    chain.emit(Event::OrderFulfilled {
        id,
        liquidity_provider: terms.liquidity_provider,
    });

    metrics::SETTLED_AMOUNT
        .with_label_values(&[if token == NATIVE { "native" } else { "token" }])
        .observe(metrics::approx_f64(amount));

    info!(
        order_id = id,
        token = %token,
        amount = %amount,
        fee = %split.fee_amount,
        net = %split.net_amount,
        "order settled"
    );
    Ok(id)
}
