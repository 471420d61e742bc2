use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use swap_gateway::api::{create_api_router, AppState};
use swap_gateway::chain::{Chain, NATIVE};
use swap_gateway::config::{AppConfig, PoolSeed};
use swap_gateway::gateway::Gateway;
use swap_gateway::venues::amm::{seed_pool, ConstantProductVenue};
use swap_gateway::venues::Venues;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal gateway error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;
    let owner = config.owner_address()?;
    let gateway_address = config.gateway()?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_secs();
    let mut chain = Chain::new(now);

    let wrapped_native = config.wrapped_native_address()?;
    if let Some(wrapped) = wrapped_native {
        chain.deploy_wrapped_native(wrapped);
    }
    let venue_wrapped = wrapped_native.unwrap_or(Address::ZERO);

    // Local constant-product venue deployed at every configured router address
    let path_router = config.path_router_address()?;
    let concentrated_router = config.concentrated_router_address()?;
    let quoter = config.quoter_address()?;
    let mut venues = Venues::default();
    if let Some(at) = path_router {
        venues = venues.with_path_router(at, Arc::new(ConstantProductVenue::new(at, venue_wrapped)));
    }
    if let Some(at) = concentrated_router {
        venues = venues.with_concentrated_router(
            at,
            Arc::new(ConstantProductVenue::new(at, venue_wrapped)),
        );
    }
    if let Some(at) = quoter {
        venues = venues.with_quoter(at, Arc::new(ConstantProductVenue::new(at, venue_wrapped)));
    }

    let gateway = Arc::new(Gateway::new(gateway_address, owner, venues));
    gateway.set_deadline_window(owner, config.deadline_window())?;
    if let Some(at) = path_router {
        gateway.set_path_router(&mut chain, owner, at)?;
    }
    if let Some(at) = concentrated_router {
        gateway.set_concentrated_router(&mut chain, owner, at)?;
    }
    if let Some(at) = quoter {
        gateway.set_quoter(&mut chain, owner, at)?;
    }
    if let Some(wrapped) = wrapped_native {
        gateway.set_wrapped_native(&mut chain, owner, wrapped)?;
    } else {
        warn!("wrapped native asset not configured; native-input swaps disabled");
    }

    let supported = config.supported()?;
    if !supported.is_empty() {
        let flags = vec![true; supported.len()];
        gateway.batch_set_asset_support(&mut chain, owner, &supported, &flags)?;
    }

    for pool in config.pools()? {
        seed(&mut chain, &pool)?;
    }

    let snapshot = gateway.config_snapshot();
    info!(
        gateway = %gateway_address,
        owner = %owner,
        path_router = %snapshot.path_router,
        concentrated_router = %snapshot.concentrated_router,
        quoter = %snapshot.quoter,
        wrapped_native = %snapshot.wrapped_native,
        supported_assets = supported.len(),
        "swap gateway online"
    );

    let api_addr = config.listen()?;
    let api_router = create_api_router(AppState::new(gateway, chain));
    let listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("bind API server address {api_addr}"))?;
    info!(address = %api_addr, "HTTP API server starting");

    axum::serve(listener, api_router)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutdown requested");
        })
        .await
        .context("API server error")?;
    Ok(())
}

/// Fund a local pool. Wrapped-native reserves get their native backing.
fn seed(chain: &mut Chain, pool: &PoolSeed) -> Result<()> {
    for (token, amount) in [(pool.token_a, pool.amount_a), (pool.token_b, pool.amount_b)] {
        if chain.is_wrapped_native(token) {
            chain.mint(NATIVE, token, amount)?;
        }
    }
    let at = seed_pool(
        chain,
        pool.token_a,
        pool.token_b,
        pool.fee,
        pool.amount_a,
        pool.amount_b,
    )?;
    info!(pool = %at, token_a = %pool.token_a, token_b = %pool.token_b, fee = pool.fee, "seeded local pool");
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn,tower_http=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
