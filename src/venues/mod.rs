// Venue module
// This file defines the external routing protocols the gateway talks to and the
// address book that resolves configured router addresses to implementations
//
// Numan Thabit 2025 Nov

pub mod amm;

use alloy_primitives::{Address, Bytes, U256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::chain::Chain;

/// Caller and attached native value of an external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub value: U256,
}

impl CallContext {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Opaque revert reason from an external router or quoter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterRevert(pub String);

impl RouterRevert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl fmt::Display for RouterRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RouterRevert {}

/// Path-array router (constant-product style).
pub trait PathRouter: Send + Sync {
    /// Swap exactly `amount_in` of `path[0]` for as much `path[last]` as
    /// possible. Returns the amount produced at every hop, input first.
    #[allow(clippy::too_many_arguments)]
    fn swap_exact_tokens_for_tokens(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        recipient: Address,
        deadline: u64,
    ) -> Result<Vec<U256>, RouterRevert>;

    fn get_amounts_out(
        &self,
        chain: &Chain,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, RouterRevert>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputParams {
    pub path: Bytes,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

/// Concentrated-liquidity router. Native input is paid as call value.
pub trait ConcentratedRouter: Send + Sync {
    fn exact_input_single(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputSingleParams,
    ) -> Result<U256, RouterRevert>;

    fn exact_input(
        &self,
        chain: &mut Chain,
        ctx: CallContext,
        params: &ExactInputParams,
    ) -> Result<U256, RouterRevert>;
}

/// Read-only simulation of the concentrated-liquidity router.
pub trait Quoter: Send + Sync {
    fn quote_exact_input_single(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, RouterRevert>;

    fn quote_exact_input(
        &self,
        chain: &Chain,
        path: &[u8],
        amount_in: U256,
    ) -> Result<U256, RouterRevert>;
}

/// Deployed router code, keyed by address.
#[derive(Clone, Default)]
pub struct Venues {
    path_routers: HashMap<Address, Arc<dyn PathRouter>>,
    concentrated_routers: HashMap<Address, Arc<dyn ConcentratedRouter>>,
    quoters: HashMap<Address, Arc<dyn Quoter>>,
}

impl Venues {
    pub fn with_path_router(mut self, at: Address, router: Arc<dyn PathRouter>) -> Self {
        self.path_routers.insert(at, router);
        self
    }

    pub fn with_concentrated_router(
        mut self,
        at: Address,
        router: Arc<dyn ConcentratedRouter>,
    ) -> Self {
        self.concentrated_routers.insert(at, router);
        self
    }

    pub fn with_quoter(mut self, at: Address, quoter: Arc<dyn Quoter>) -> Self {
        self.quoters.insert(at, quoter);
        self
    }

    pub fn path_router(&self, at: Address) -> Option<Arc<dyn PathRouter>> {
        self.path_routers.get(&at).cloned()
    }

    pub fn concentrated_router(&self, at: Address) -> Option<Arc<dyn ConcentratedRouter>> {
        self.concentrated_routers.get(&at).cloned()
    }

    pub fn quoter(&self, at: Address) -> Option<Arc<dyn Quoter>> {
        self.quoters.get(&at).cloned()
    }
}

impl fmt::Debug for Venues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Venues")
            .field("path_routers", &self.path_routers.keys().collect::<Vec<_>>())
            .field(
                "concentrated_routers",
                &self.concentrated_routers.keys().collect::<Vec<_>>(),
            )
            .field("quoters", &self.quoters.keys().collect::<Vec<_>>())
            .finish()
    }
}
