// Shared fixtures for gateway integration tests
//
// Numan Thabit 2025 Nov

#![allow(dead_code)]

use alloy_primitives::{address, Address, U256};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use swap_gateway::chain::{Chain, NATIVE};
use swap_gateway::gateway::{Call, Gateway};
use swap_gateway::path::decode_first_token;
use swap_gateway::settlement::OrderTerms;
use swap_gateway::venues::amm::{seed_pool, ConstantProductVenue};
use swap_gateway::venues::{
    CallContext, ConcentratedRouter, ExactInputParams, ExactInputSingleParams, PathRouter,
    RouterRevert, Venues,
};

pub const OWNER: Address = address!("0000000000000000000000000000000000000a01");
pub const GATEWAY: Address = address!("0000000000000000000000000000000000000a02");
pub const ALICE: Address = address!("a11ce00000000000000000000000000000000001");
pub const LP: Address = address!("1b00000000000000000000000000000000000001");
pub const FEE_TO: Address = address!("fee0000000000000000000000000000000000001");
pub const REFUND: Address = address!("5e70000000000000000000000000000000000001");

pub const WRAPPED: Address = address!("c000000000000000000000000000000000000001");
pub const USD: Address = address!("d000000000000000000000000000000000000001");
pub const EUR: Address = address!("e000000000000000000000000000000000000001");

pub const V2_ROUTER: Address = address!("0000000000000000000000000000000000000b02");
pub const V3_ROUTER: Address = address!("0000000000000000000000000000000000000b03");
pub const QUOTER: Address = address!("0000000000000000000000000000000000000b04");

pub const GENESIS: u64 = 1_700_000_000;

pub fn terms(fee_percent: u16) -> OrderTerms {
    OrderTerms {
        rate: U256::from(1_000u64),
        refund_address: REFUND,
        liquidity_provider: LP,
        fee_recipient: FEE_TO,
        fee_percent,
    }
}

pub fn units(n: u64) -> U256 {
    U256::from(n)
}

/// Gateway with every router address configured and USD, EUR and native
/// currency supported.
pub fn deploy(venues: Venues) -> (Gateway, Chain) {
    let mut chain = Chain::new(GENESIS);
    chain.deploy_wrapped_native(WRAPPED);
    let gateway = Gateway::new(GATEWAY, OWNER, venues);
    configure(&gateway, &mut chain);
    (gateway, chain)
}

pub fn configure(gateway: &Gateway, chain: &mut Chain) {
    gateway.set_path_router(chain, OWNER, V2_ROUTER).unwrap();
    gateway.set_concentrated_router(chain, OWNER, V3_ROUTER).unwrap();
    gateway.set_quoter(chain, OWNER, QUOTER).unwrap();
    gateway.set_wrapped_native(chain, OWNER, WRAPPED).unwrap();
    gateway
        .batch_set_asset_support(chain, OWNER, &[USD, EUR, NATIVE], &[true, true, true])
        .unwrap();
}

/// The constant-product venue at every router address.
pub fn amm_venues() -> Venues {
    Venues::default()
        .with_path_router(V2_ROUTER, Arc::new(ConstantProductVenue::new(V2_ROUTER, WRAPPED)))
        .with_concentrated_router(
            V3_ROUTER,
            Arc::new(ConstantProductVenue::new(V3_ROUTER, WRAPPED)),
        )
        .with_quoter(QUOTER, Arc::new(ConstantProductVenue::new(QUOTER, WRAPPED)))
}

/// Seed a pool, backing any wrapped-native reserve with native value.
pub fn seed(chain: &mut Chain, a: Address, b: Address, fee: u32, amount_a: u64, amount_b: u64) {
    for (token, amount) in [(a, amount_a), (b, amount_b)] {
        if token == WRAPPED {
            chain.mint(NATIVE, WRAPPED, units(amount)).unwrap();
        }
    }
    seed_pool(chain, a, b, fee, units(amount_a), units(amount_b)).unwrap();
}

pub fn fund_and_approve(chain: &mut Chain, token: Address, holder: Address, amount: u64) {
    chain.mint(token, holder, units(amount)).unwrap();
    chain.approve(token, holder, GATEWAY, units(amount));
}

/// Path-array router that answers with a fixed hop-amount array.
///
/// Pulls the input with the caller's allowance and pays the last amount out
/// of its own balance of the last path token.
pub struct ScriptedPathRouter {
    pub address: Address,
    pub amounts: Vec<U256>,
    pub last_deadline: Mutex<Option<u64>>,
}

impl ScriptedPathRouter {
    pub fn new(address: Address, amounts: Vec<U256>) -> Self {
        Self {
            address,
            amounts,
            last_deadline: Mutex::new(None),
        }
    }
}

impl PathRouter for ScriptedPathRouter {
    fn swap_exact_tokens_for_tokens(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        amount_in: U256,
        _amount_out_min: U256,
        path: &[Address],
        recipient: Address,
        deadline: u64,
    ) -> Result<Vec<U256>, RouterRevert> {
        *self.last_deadline.lock().unwrap() = Some(deadline);
        chain
            .transfer_from(path[0], self.address, ctx.sender, self.address, amount_in)
            .map_err(|e| RouterRevert(e.to_string()))?;
        let out = *self.amounts.last().unwrap();
        chain
            .transfer(*path.last().unwrap(), self.address, recipient, out)
            .map_err(|e| RouterRevert(e.to_string()))?;
        Ok(self.amounts.clone())
    }

    fn get_amounts_out(
        &self,
        _chain: &Chain,
        _amount_in: U256,
        _path: &[Address],
    ) -> Result<Vec<U256>, RouterRevert> {
        Ok(self.amounts.clone())
    }
}

/// Concentrated router that takes the input and then reverts.
pub struct RevertingRouter {
    pub address: Address,
}

impl RevertingRouter {
    fn take_input(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        token_in: Address,
        amount_in: U256,
    ) -> Result<(), RouterRevert> {
        if ctx.value.is_zero() {
            chain
                .transfer_from(token_in, self.address, ctx.sender, self.address, amount_in)
                .map_err(|e| RouterRevert(e.to_string()))?;
        }
        Ok(())
    }
}

impl ConcentratedRouter for RevertingRouter {
    fn exact_input_single(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputSingleParams,
    ) -> Result<U256, RouterRevert> {
        self.take_input(chain, ctx, params.token_in, params.amount_in)?;
        Err(RouterRevert::new("Too little received"))
    }

    fn exact_input(
        &self,
        _chain: &mut Chain,
        _ctx: CallContext,
        _params: &ExactInputParams,
    ) -> Result<U256, RouterRevert> {
        Err(RouterRevert::new("Too little received"))
    }
}

/// Concentrated router that calls back into the gateway mid-swap.
#[derive(Default)]
pub struct ReentrantRouter {
    pub gateway: OnceLock<Weak<Gateway>>,
}

impl ConcentratedRouter for ReentrantRouter {
    fn exact_input_single(
        &self,
        chain: &mut Chain,
        _ctx: CallContext,
        _params: &ExactInputSingleParams,
    ) -> Result<U256, RouterRevert> {
        let gateway = self
            .gateway
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| RouterRevert::new("gateway gone"))?;
        gateway
            .create_order(chain, Call::new(ALICE), USD, units(1), terms(0))
            .map(|_| U256::ZERO)
            .map_err(|e| RouterRevert(e.to_string()))
    }

    fn exact_input(
        &self,
        _chain: &mut Chain,
        _ctx: CallContext,
        _params: &ExactInputParams,
    ) -> Result<U256, RouterRevert> {
        Err(RouterRevert::new("unused"))
    }
}

/// What a concentrated router observed when it was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedCall {
    pub value: U256,
    pub router_native: U256,
    pub caller_wrapped: U256,
    pub allowance: U256,
}

/// Constant-product concentrated router that records each entry before
/// swapping.
pub struct RecordingRouter {
    pub inner: ConstantProductVenue,
    pub calls: Mutex<Vec<ObservedCall>>,
}

impl RecordingRouter {
    pub fn new(address: Address) -> Self {
        Self {
            inner: ConstantProductVenue::new(address, WRAPPED),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn observe(&self, chain: &Chain, ctx: CallContext, token_in: Address) {
        let router = self.inner.address();
        self.calls.lock().unwrap().push(ObservedCall {
            value: ctx.value,
            router_native: chain.balance_of(NATIVE, router),
            caller_wrapped: chain.balance_of(WRAPPED, ctx.sender),
            allowance: chain.allowance(token_in, ctx.sender, router),
        });
    }
}

impl ConcentratedRouter for RecordingRouter {
    fn exact_input_single(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputSingleParams,
    ) -> Result<U256, RouterRevert> {
        self.observe(chain, ctx, params.token_in);
        self.inner.exact_input_single(chain, ctx, params)
    }

    fn exact_input(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputParams,
    ) -> Result<U256, RouterRevert> {
        let token_in =
            decode_first_token(&params.path).map_err(|e| RouterRevert(e.to_string()))?;
        self.observe(chain, ctx, token_in);
        self.inner.exact_input(chain, ctx, params)
    }
}

/// The constant-product venue everywhere, with a recording router at the
/// concentrated-router address.
pub fn recording_venues() -> (Venues, Arc<RecordingRouter>) {
    let router = Arc::new(RecordingRouter::new(V3_ROUTER));
    let venues = Venues::default()
        .with_path_router(V2_ROUTER, Arc::new(ConstantProductVenue::new(V2_ROUTER, WRAPPED)))
        .with_concentrated_router(V3_ROUTER, router.clone())
        .with_quoter(QUOTER, Arc::new(ConstantProductVenue::new(QUOTER, WRAPPED)));
    (venues, router)
}
