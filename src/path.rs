// Multi-hop path codec
// This file encodes and decodes the packed `token | fee | token | ... | token`
// byte layout consumed by the concentrated-liquidity router and quoter
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, Bytes};

use crate::errors::PathError;

/// Width of an asset identifier inside a packed path.
pub const ADDR_SIZE: usize = 20;
/// Width of a fee tier inside a packed path (uint24).
pub const FEE_SIZE: usize = 3;
/// Distance between two consecutive asset identifiers.
pub const NEXT_OFFSET: usize = ADDR_SIZE + FEE_SIZE;

const MAX_FEE: u32 = (1 << 24) - 1;

/// Pack `tokens` and `fees` as `token0 ‖ fee0 ‖ token1 ‖ … ‖ tokenN`.
pub fn encode_path(tokens: &[Address], fees: &[u32]) -> Result<Bytes, PathError> {
    if tokens.is_empty() || tokens.len() != fees.len() + 1 {
        return Err(PathError::FeeCountMismatch {
            tokens: tokens.len(),
            fees: fees.len(),
        });
    }
    let mut out = Vec::with_capacity(tokens.len() * ADDR_SIZE + fees.len() * FEE_SIZE);
    for (i, token) in tokens.iter().enumerate() {
        out.extend_from_slice(token.as_slice());
        if let Some(&fee) = fees.get(i) {
            if fee > MAX_FEE {
                return Err(PathError::FeeOutOfRange(fee));
            }
            out.extend_from_slice(&fee.to_be_bytes()[1..]);
        }
    }
    Ok(out.into())
}

/// First asset identifier in the path.
pub fn decode_first_token(path: &[u8]) -> Result<Address, PathError> {
    let head = path
        .get(..ADDR_SIZE)
        .ok_or(PathError::TooShort { len: path.len() })?;
    Ok(Address::from_slice(head))
}

/// Last asset identifier in the path.
///
/// Interior hops are not inspected.
pub fn decode_last_token(path: &[u8]) -> Result<Address, PathError> {
    let start = path
        .len()
        .checked_sub(ADDR_SIZE)
        .ok_or(PathError::TooShort { len: path.len() })?;
    Ok(Address::from_slice(&path[start..]))
}

/// Copy of `path` with every end equal to `from` replaced by `to`.
pub fn replace_ends(path: &[u8], from: Address, to: Address) -> Result<Bytes, PathError> {
    let first = decode_first_token(path)?;
    let last = decode_last_token(path)?;
    let mut out = path.to_vec();
    if first == from {
        out[..ADDR_SIZE].copy_from_slice(to.as_slice());
    }
    if last == from {
        let start = out.len() - ADDR_SIZE;
        out[start..].copy_from_slice(to.as_slice());
    }
    Ok(out.into())
}

/// Split a well-formed path into its hops. Used by venues that need to walk
/// every pool; the gateway itself only looks at the two ends.
pub fn decode_hops(path: &[u8]) -> Result<Vec<(Address, u32, Address)>, PathError> {
    if path.len() < NEXT_OFFSET + ADDR_SIZE || (path.len() - ADDR_SIZE) % NEXT_OFFSET != 0 {
        return Err(PathError::TooShort { len: path.len() });
    }
    let hops = (path.len() - ADDR_SIZE) / NEXT_OFFSET;
    let mut out = Vec::with_capacity(hops);
    for hop in 0..hops {
        let at = hop * NEXT_OFFSET;
        let token_in = Address::from_slice(&path[at..at + ADDR_SIZE]);
        let fee_bytes = &path[at + ADDR_SIZE..at + NEXT_OFFSET];
        let fee = u32::from_be_bytes([0, fee_bytes[0], fee_bytes[1], fee_bytes[2]]);
        let token_out = Address::from_slice(&path[at + NEXT_OFFSET..at + NEXT_OFFSET + ADDR_SIZE]);
        out.push((token_in, fee, token_out));
    }
    Ok(out)
}
