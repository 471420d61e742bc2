// AMM venue module
// This file implements a deterministic constant-product venue that speaks all
// three routing protocols. Pool reserves live in the host as balances of a
// per-pool address, so they roll back together with the rest of a failed call
//
// Numan Thabit 2025 Nov

use alloy_primitives::{keccak256, Address, U256};
use tracing::debug;

use crate::chain::{Chain, NATIVE};
use crate::errors::TransferError;
use crate::path;
use crate::venues::{
    CallContext, ConcentratedRouter, ExactInputParams, ExactInputSingleParams, PathRouter,
    Quoter, RouterRevert,
};

/// Fee tier of every path-array pool (0.3%, in hundredths of a bip).
pub const V2_FEE_TIER: u32 = 3000;
const FEE_DENOMINATOR: u64 = 1_000_000;

/// Deterministic address holding the reserves of the `(a, b, fee)` pool.
pub fn pool_address(token_a: Address, token_b: Address, fee: u32) -> Address {
    let (t0, t1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    let mut preimage = Vec::with_capacity(20 + 20 + 4);
    preimage.extend_from_slice(t0.as_slice());
    preimage.extend_from_slice(t1.as_slice());
    preimage.extend_from_slice(&fee.to_be_bytes());
    Address::from_slice(&keccak256(&preimage)[12..])
}

/// Add liquidity to the `(a, b, fee)` pool.
pub fn seed_pool(
    chain: &mut Chain,
    token_a: Address,
    token_b: Address,
    fee: u32,
    amount_a: U256,
    amount_b: U256,
) -> Result<Address, TransferError> {
    let pool = pool_address(token_a, token_b, fee);
    chain.mint(token_a, pool, amount_a)?;
    chain.mint(token_b, pool, amount_b)?;
    debug!(%pool, %token_a, %token_b, fee, "seeded pool");
    Ok(pool)
}

/// Constant-product router/quoter deployed at `address`.
#[derive(Debug, Clone)]
pub struct ConstantProductVenue {
    address: Address,
    wrapped_native: Address,
}

impl ConstantProductVenue {
    pub fn new(address: Address, wrapped_native: Address) -> Self {
        Self {
            address,
            wrapped_native,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn amount_out(
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, RouterRevert> {
        if token_in == token_out {
            return Err(RouterRevert::new("IDENTICAL_ADDRESSES"));
        }
        if u64::from(fee) >= FEE_DENOMINATOR {
            return Err(RouterRevert::new("INVALID_FEE"));
        }
        if amount_in.is_zero() {
            return Err(RouterRevert::new("INSUFFICIENT_INPUT_AMOUNT"));
        }
        let pool = pool_address(token_in, token_out, fee);
        let reserve_in = chain.balance_of(token_in, pool);
        let reserve_out = chain.balance_of(token_out, pool);
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(RouterRevert::new("INSUFFICIENT_LIQUIDITY"));
        }
        let denominator_fee = U256::from(FEE_DENOMINATOR);
        let with_fee = amount_in
            .checked_mul(denominator_fee - U256::from(fee))
            .ok_or_else(|| RouterRevert::new("OVERFLOW"))?;
        let numerator = with_fee
            .checked_mul(reserve_out)
            .ok_or_else(|| RouterRevert::new("OVERFLOW"))?;
        let denominator = reserve_in
            .checked_mul(denominator_fee)
            .and_then(|v| v.checked_add(with_fee))
            .ok_or_else(|| RouterRevert::new("OVERFLOW"))?;
        let out = numerator / denominator;
        if out.is_zero() {
            return Err(RouterRevert::new("INSUFFICIENT_OUTPUT_AMOUNT"));
        }
        Ok(out)
    }

    /// Pull the input of the first hop into `pool`. Native value attached to
    /// the call is wrapped first.
    fn pull_input(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        token_in: Address,
        amount_in: U256,
        pool: Address,
    ) -> Result<(), RouterRevert> {
        if !ctx.value.is_zero() {
            if token_in != self.wrapped_native || ctx.value != amount_in {
                return Err(RouterRevert::new("INVALID_VALUE"));
            }
            chain
                .deposit(self.wrapped_native, self.address, amount_in)
                .map_err(revert)?;
            chain
                .transfer(self.wrapped_native, self.address, pool, amount_in)
                .map_err(revert)
        } else {
            chain
                .transfer_from(token_in, self.address, ctx.sender, pool, amount_in)
                .map_err(revert)
        }
    }

    fn walk(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        hops: &[(Address, u32, Address)],
        amount_in: U256,
        recipient: Address,
    ) -> Result<Vec<U256>, RouterRevert> {
        let amounts = quote_hops(chain, hops, amount_in)?;
        let (first_in, first_fee, first_out) = hops[0];
        self.pull_input(
            chain,
            ctx,
            first_in,
            amount_in,
            pool_address(first_in, first_out, first_fee),
        )?;
        for (i, (token_in, fee, token_out)) in hops.iter().copied().enumerate() {
            let pool = pool_address(token_in, token_out, fee);
            let to = match hops.get(i + 1) {
                Some((next_in, next_fee, next_out)) => pool_address(*next_in, *next_out, *next_fee),
                None => recipient,
            };
            chain
                .transfer(token_out, pool, to, amounts[i + 1])
                .map_err(revert)?;
        }
        Ok(amounts)
    }
}

fn revert(err: TransferError) -> RouterRevert {
    RouterRevert(err.to_string())
}

fn quote_hops(
    chain: &Chain,
    hops: &[(Address, u32, Address)],
    amount_in: U256,
) -> Result<Vec<U256>, RouterRevert> {
    if hops.is_empty() {
        return Err(RouterRevert::new("INVALID_PATH"));
    }
    let mut amounts = Vec::with_capacity(hops.len() + 1);
    amounts.push(amount_in);
    let mut current = amount_in;
    for (token_in, fee, token_out) in hops.iter().copied() {
        current = ConstantProductVenue::amount_out(chain, token_in, token_out, fee, current)?;
        amounts.push(current);
    }
    Ok(amounts)
}

fn v2_hops(path: &[Address]) -> Vec<(Address, u32, Address)> {
    path.windows(2)
        .map(|pair| (pair[0], V2_FEE_TIER, pair[1]))
        .collect()
}

fn packed_hops(encoded: &[u8]) -> Result<Vec<(Address, u32, Address)>, RouterRevert> {
    path::decode_hops(encoded).map_err(|e| RouterRevert(e.to_string()))
}

impl PathRouter for ConstantProductVenue {
    fn swap_exact_tokens_for_tokens(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        recipient: Address,
        deadline: u64,
    ) -> Result<Vec<U256>, RouterRevert> {
        if deadline < chain.timestamp() {
            return Err(RouterRevert::new("EXPIRED"));
        }
        if !ctx.value.is_zero() || path.contains(&NATIVE) {
            return Err(RouterRevert::new("NATIVE_NOT_ACCEPTED"));
        }
        let hops = v2_hops(path);
        let quoted = quote_hops(chain, &hops, amount_in)?;
        if quoted.last().copied().unwrap_or_default() < amount_out_min {
            return Err(RouterRevert::new("INSUFFICIENT_OUTPUT_AMOUNT"));
        }
        self.walk(chain, ctx, &hops, amount_in, recipient)
    }

    fn get_amounts_out(
        &self,
        chain: &Chain,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, RouterRevert> {
        quote_hops(chain, &v2_hops(path), amount_in)
    }
}

impl ConcentratedRouter for ConstantProductVenue {
    fn exact_input_single(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputSingleParams,
    ) -> Result<U256, RouterRevert> {
        let hops = [(params.token_in, params.fee, params.token_out)];
        let out = quote_hops(chain, &hops, params.amount_in)?[1];
        if out < params.amount_out_minimum {
            return Err(RouterRevert::new("Too little received"));
        }
        self.walk(chain, ctx, &hops, params.amount_in, params.recipient)?;
        Ok(out)
    }

    fn exact_input(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputParams,
    ) -> Result<U256, RouterRevert> {
        let hops = packed_hops(&params.path)?;
        let amounts = quote_hops(chain, &hops, params.amount_in)?;
        let out = amounts.last().copied().unwrap_or_default();
        if out < params.amount_out_minimum {
            return Err(RouterRevert::new("Too little received"));
        }
        self.walk(chain, ctx, &hops, params.amount_in, params.recipient)?;
        Ok(out)
    }
}

impl Quoter for ConstantProductVenue {
    fn quote_exact_input_single(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, RouterRevert> {
        ConstantProductVenue::amount_out(chain, token_in, token_out, fee, amount_in)
    }

    fn quote_exact_input(
        &self,
        chain: &Chain,
        path: &[u8],
        amount_in: U256,
    ) -> Result<U256, RouterRevert> {
        let amounts = quote_hops(chain, &packed_hops(path)?, amount_in)?;
        Ok(amounts.last().copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ROUTER: Address = address!("5000000000000000000000000000000000000005");
    const WRAPPED: Address = address!("c000000000000000000000000000000000000001");
    const USD: Address = address!("d000000000000000000000000000000000000001");
    const TRADER: Address = address!("a000000000000000000000000000000000000001");

    fn chain_with_pool() -> Chain {
        let mut chain = Chain::new(1_000);
        chain.deploy_wrapped_native(WRAPPED);
        seed_pool(
            &mut chain,
            WRAPPED,
            USD,
            V2_FEE_TIER,
            U256::from(1_000_000u64),
            U256::from(2_000_000_000u64),
        )
        .unwrap();
        chain
    }

    #[test]
    fn pool_address_ignores_token_order() {
        assert_eq!(
            pool_address(WRAPPED, USD, 500),
            pool_address(USD, WRAPPED, 500)
        );
        assert_ne!(
            pool_address(WRAPPED, USD, 500),
            pool_address(WRAPPED, USD, 3000)
        );
    }

    #[test]
    fn v2_swap_pulls_with_allowance_and_pays_recipient() {
        let mut chain = chain_with_pool();
        chain.mint(WRAPPED, TRADER, U256::from(1_000u64)).unwrap();
        chain.approve(WRAPPED, TRADER, ROUTER, U256::from(1_000u64));
        let venue = ConstantProductVenue::new(ROUTER, WRAPPED);

        let quoted = venue
            .get_amounts_out(&chain, U256::from(1_000u64), &[WRAPPED, USD])
            .unwrap();
        let amounts = venue
            .swap_exact_tokens_for_tokens(
                &mut chain,
                CallContext::new(TRADER),
                U256::from(1_000u64),
                U256::from(1u64),
                &[WRAPPED, USD],
                TRADER,
                1_300,
            )
            .unwrap();
        assert_eq!(amounts, quoted);
        assert_eq!(chain.balance_of(USD, TRADER), amounts[1]);
        assert_eq!(chain.balance_of(WRAPPED, TRADER), U256::ZERO);
    }

    #[test]
    fn v2_swap_reverts_after_deadline() {
        let mut chain = chain_with_pool();
        let venue = ConstantProductVenue::new(ROUTER, WRAPPED);
        let err = venue
            .swap_exact_tokens_for_tokens(
                &mut chain,
                CallContext::new(TRADER),
                U256::from(1u64),
                U256::ZERO,
                &[WRAPPED, USD],
                TRADER,
                999,
            )
            .unwrap_err();
        assert_eq!(err, RouterRevert::new("EXPIRED"));
    }

    #[test]
    fn concentrated_single_accepts_native_value() {
        let mut chain = chain_with_pool();
        let venue = ConstantProductVenue::new(ROUTER, WRAPPED);
        // the caller has already forwarded the value to the router
        chain.mint(NATIVE, ROUTER, U256::from(500u64)).unwrap();

        let out = venue
            .exact_input_single(
                &mut chain,
                CallContext::new(TRADER).with_value(U256::from(500u64)),
                &ExactInputSingleParams {
                    token_in: WRAPPED,
                    token_out: USD,
                    fee: V2_FEE_TIER,
                    recipient: TRADER,
                    amount_in: U256::from(500u64),
                    amount_out_minimum: U256::ZERO,
                },
            )
            .unwrap();
        assert_eq!(chain.balance_of(USD, TRADER), out);
        assert_eq!(chain.balance_of(NATIVE, ROUTER), U256::ZERO);
    }

    #[test]
    fn missing_pool_reverts() {
        let chain = chain_with_pool();
        let venue = ConstantProductVenue::new(ROUTER, WRAPPED);
        let err = venue
            .quote_exact_input_single(&chain, WRAPPED, USD, 500, U256::from(1u64))
            .unwrap_err();
        assert_eq!(err, RouterRevert::new("INSUFFICIENT_LIQUIDITY"));
    }
}
