// Metrics and observability module
// This file handles collection and reporting of order, swap and settlement
// counters for the gateway
//
// Numan Thabit 2025 Nov

use alloy_primitives::U256;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

pub static ORDERS_CREATED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gateway_orders_created_total",
        "orders appended to the ledger",
        &["path"]
    )
    .unwrap()
});

pub static SWAPS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gateway_swaps_total",
        "router invocations by protocol version and outcome",
        &["version", "outcome"]
    )
    .unwrap()
});

pub static REFUNDS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gateway_swap_refunds_total",
        "compensating refunds after a failed swap",
        &["asset_kind"]
    )
    .unwrap()
});

pub static REJECTED_CALLS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gateway_rejected_calls_total",
        "entry point calls rolled back, by error kind",
        &["kind"]
    )
    .unwrap()
});

pub static SETTLED_AMOUNT: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "gateway_settled_amount",
        "gross settled amount per order (base units)",
        &["asset_kind"],
        prometheus::exponential_buckets(1.0, 10.0, 19).unwrap()
    )
    .unwrap()
});

/// Lossy conversion for histogram observations.
pub fn approx_f64(value: U256) -> f64 {
    u128::try_from(value)
        .map(|v| v as f64)
        .unwrap_or(u128::MAX as f64)
}

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&prometheus::gather(), &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
