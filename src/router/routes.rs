// Route types
// This file defines the tagged swap requests understood by the router adapter,
// the input-asset descriptor and the read-only estimate requests
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::NATIVE;
use crate::errors::ValidationError;
use crate::path;

/// Which routing protocol served a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterVersion {
    V2,
    V3,
}

impl RouterVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterVersion::V2 => "v2",
            RouterVersion::V3 => "v3",
        }
    }
}

impl fmt::Display for RouterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One swap, in the shape of the protocol that will execute it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapRequest {
    /// Path-array router; `path` lists every asset, input first.
    V2Path {
        path: Vec<Address>,
        amount_in: U256,
        min_out: U256,
    },
    /// Concentrated-liquidity single pool. `token_out == NATIVE` asks for
    /// the wrapped output to be unwrapped before settlement.
    V3Single {
        token_in: Address,
        token_out: Address,
        fee_tier: u32,
        amount_in: U256,
        min_out: U256,
    },
    /// Concentrated-liquidity multi-hop over a packed path.
    V3MultiHop {
        encoded_path: Bytes,
        amount_in: U256,
        min_out: U256,
    },
}

impl SwapRequest {
    pub fn version(&self) -> RouterVersion {
        match self {
            SwapRequest::V2Path { .. } => RouterVersion::V2,
            SwapRequest::V3Single { .. } | SwapRequest::V3MultiHop { .. } => RouterVersion::V3,
        }
    }

    pub fn amount_in(&self) -> U256 {
        match self {
            SwapRequest::V2Path { amount_in, .. }
            | SwapRequest::V3Single { amount_in, .. }
            | SwapRequest::V3MultiHop { amount_in, .. } => *amount_in,
        }
    }

    pub fn min_out(&self) -> U256 {
        match self {
            SwapRequest::V2Path { min_out, .. }
            | SwapRequest::V3Single { min_out, .. }
            | SwapRequest::V3MultiHop { min_out, .. } => *min_out,
        }
    }

    /// Input asset as the router sees it.
    pub fn route_input(&self) -> Result<Address, ValidationError> {
        match self {
            SwapRequest::V2Path { path, .. } => path
                .first()
                .copied()
                .ok_or(ValidationError::PathTooShort(path.len())),
            SwapRequest::V3Single { token_in, .. } => Ok(*token_in),
            SwapRequest::V3MultiHop { encoded_path, .. } => {
                Ok(path::decode_first_token(encoded_path)?)
            }
        }
    }

    /// Asset the order settles in.
    pub fn route_output(&self) -> Result<Address, ValidationError> {
        match self {
            SwapRequest::V2Path { path, .. } => path
                .last()
                .copied()
                .ok_or(ValidationError::PathTooShort(path.len())),
            SwapRequest::V3Single { token_out, .. } => Ok(*token_out),
            SwapRequest::V3MultiHop { encoded_path, .. } => {
                Ok(path::decode_last_token(encoded_path)?)
            }
        }
    }
}

/// What the caller pays with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "token", rename_all = "snake_case")]
pub enum AssetIn {
    /// Value attached to the call.
    Native,
    /// A token pulled from the caller with a prior approval.
    Token(Address),
}

impl AssetIn {
    pub fn asset(&self) -> Address {
        match self {
            AssetIn::Native => NATIVE,
            AssetIn::Token(token) => *token,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, AssetIn::Native)
    }
}

/// Read-only output estimates, one per supported router shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateRequest {
    V2Pair {
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    },
    V2Path {
        path: Vec<Address>,
        amount_in: U256,
    },
    V3Single {
        token_in: Address,
        token_out: Address,
        fee_tier: u32,
        amount_in: U256,
    },
    V3Path {
        encoded_path: Bytes,
        amount_in: U256,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const A: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const B: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    #[test]
    fn multi_hop_ends_come_from_the_packed_path() {
        let req = SwapRequest::V3MultiHop {
            encoded_path: path::encode_path(&[A, B], &[3000]).unwrap(),
            amount_in: U256::from(5),
            min_out: U256::from(1),
        };
        assert_eq!(req.version(), RouterVersion::V3);
        assert_eq!(req.route_input().unwrap(), A);
        assert_eq!(req.route_output().unwrap(), B);
    }

    #[test]
    fn swap_request_deserializes_from_tagged_json() {
        let json = serde_json::json!({
            "kind": "v2_path",
            "path": [A, B],
            "amount_in": "0x64",
            "min_out": "0x1"
        });
        let req: SwapRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.amount_in(), U256::from(100));
        assert_eq!(req.version(), RouterVersion::V2);
    }
}
