// Router module - router adapter, swap validation and the swap execution engine
//
// Numan Thabit 2025 Nov

pub mod execution;
pub mod routes;
pub mod validation;

#[allow(clippy::module_inception)]
pub mod router;

pub use execution::{ExecutionEngine, SwapOutcome};
pub use router::{RouterAdapter, RouterConfig, RouterHandle};
pub use routes::{AssetIn, EstimateRequest, RouterVersion, SwapRequest};
pub use validation::{validate_swap, SwapPlan};
