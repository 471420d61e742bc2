// Library root module for swap-gateway
// This file defines the public API and module structure for the swap-gateway library
// It exports the gateway, its routing and settlement layers and the HTTP query API
//
// Numan Thabit 2025 Nov

pub mod api;
pub mod chain;
pub mod config;
pub mod control;
pub mod errors;
pub mod gateway;
pub mod ledger;
pub mod metrics;
pub mod path;
pub mod registry;
pub mod router;
pub mod settlement;
pub mod venues;
