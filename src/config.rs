// Configuration management module
// This file handles loading and parsing of configuration settings
// from APP__-prefixed environment variables
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::router::router::DEFAULT_DEADLINE_WINDOW_SECS;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Privileged account allowed to reconfigure the gateway (0x...)
    pub owner: String,
    /// Custody address of the gateway itself (0x...)
    pub gateway_address: String,
    /// Path-array router address; the local venue is deployed here
    pub path_router: Option<String>,
    /// Concentrated-liquidity router address
    pub concentrated_router: Option<String>,
    /// Quoter address
    pub quoter: Option<String>,
    /// Wrapped-native token address
    pub wrapped_native: Option<String>,
    /// HTTP listen address (defaults to 0.0.0.0:8080)
    pub listen_addr: Option<String>,
    /// Validity window handed to the path-array router, in seconds
    pub deadline_window_secs: Option<u64>,
    /// Comma-separated list of assets orders may settle in
    pub supported_assets: Option<String>,
    /// Comma-separated pools for the local venue, each `tokenA:tokenB:fee:amountA:amountB`
    pub seed_pools: Option<String>,
}

/// Liquidity seeded into the local constant-product venue at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSeed {
    pub token_a: Address,
    pub token_b: Address,
    pub fee: u32,
    pub amount_a: U256,
    pub amount_b: U256,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn owner_address(&self) -> Result<Address> {
        parse_address(&self.owner).context("APP__OWNER")
    }

    pub fn gateway(&self) -> Result<Address> {
        parse_address(&self.gateway_address).context("APP__GATEWAY_ADDRESS")
    }

    pub fn path_router_address(&self) -> Result<Option<Address>> {
        optional_address(self.path_router.as_deref()).context("APP__PATH_ROUTER")
    }

    pub fn concentrated_router_address(&self) -> Result<Option<Address>> {
        optional_address(self.concentrated_router.as_deref()).context("APP__CONCENTRATED_ROUTER")
    }

    pub fn quoter_address(&self) -> Result<Option<Address>> {
        optional_address(self.quoter.as_deref()).context("APP__QUOTER")
    }

    pub fn wrapped_native_address(&self) -> Result<Option<Address>> {
        optional_address(self.wrapped_native.as_deref()).context("APP__WRAPPED_NATIVE")
    }

    pub fn listen(&self) -> Result<SocketAddr> {
        let raw = self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR);
        raw.parse()
            .with_context(|| format!("invalid listen address: {raw}"))
    }

    pub fn deadline_window(&self) -> u64 {
        self.deadline_window_secs
            .unwrap_or(DEFAULT_DEADLINE_WINDOW_SECS)
    }

    pub fn supported(&self) -> Result<Vec<Address>> {
        let Some(list) = &self.supported_assets else {
            return Ok(Vec::new());
        };
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| parse_address(item).with_context(|| format!("supported asset {item}")))
            .collect()
    }

    pub fn pools(&self) -> Result<Vec<PoolSeed>> {
        let Some(list) = &self.seed_pools else {
            return Ok(Vec::new());
        };
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| parse_pool(item).with_context(|| format!("seed pool {item}")))
            .collect()
    }
}

fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).with_context(|| format!("invalid address: {raw}"))
}

fn optional_address(raw: Option<&str>) -> Result<Option<Address>> {
    raw.map(parse_address).transpose()
}

fn parse_pool(raw: &str) -> Result<PoolSeed> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let [token_a, token_b, fee, amount_a, amount_b] = parts.as_slice() else {
        bail!("expected tokenA:tokenB:fee:amountA:amountB, got {} fields", parts.len());
    };
    Ok(PoolSeed {
        token_a: parse_address(token_a)?,
        token_b: parse_address(token_b)?,
        fee: fee.parse().with_context(|| format!("invalid fee tier: {fee}"))?,
        amount_a: U256::from_str(amount_a).with_context(|| format!("invalid amount: {amount_a}"))?,
        amount_b: U256::from_str(amount_b).with_context(|| format!("invalid amount: {amount_b}"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfig {
        AppConfig {
            owner: "0x1000000000000000000000000000000000000001".into(),
            gateway_address: "0x2000000000000000000000000000000000000002".into(),
            path_router: None,
            concentrated_router: None,
            quoter: None,
            wrapped_native: None,
            listen_addr: None,
            deadline_window_secs: None,
            supported_assets: None,
            seed_pools: None,
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = base();
        assert_eq!(cfg.deadline_window(), 300);
        assert_eq!(cfg.listen().unwrap().port(), 8080);
        assert!(cfg.supported().unwrap().is_empty());
        assert!(cfg.path_router_address().unwrap().is_none());
    }

    #[test]
    fn parses_asset_list_and_pools() {
        let mut cfg = base();
        cfg.supported_assets = Some(
            "0xd000000000000000000000000000000000000001, 0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"
                .into(),
        );
        cfg.seed_pools = Some(
            "0xc000000000000000000000000000000000000001:0xd000000000000000000000000000000000000001:3000:1000000:2000000"
                .into(),
        );
        assert_eq!(cfg.supported().unwrap().len(), 2);
        let pools = cfg.pools().unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].fee, 3000);
        assert_eq!(pools[0].amount_b, U256::from(2_000_000u64));
    }

    #[test]
    fn malformed_pool_is_reported() {
        let mut cfg = base();
        cfg.seed_pools = Some("0xc000000000000000000000000000000000000001:3000".into());
        assert!(cfg.pools().is_err());
    }
}
