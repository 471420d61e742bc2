// Asset registry
// Allow-list of assets that may be the target asset of an order
//
// Numan Thabit 2025 Nov

use alloy_primitives::Address;
use std::collections::HashSet;

use crate::errors::ValidationError;

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    supported: HashSet<Address>,
}

impl AssetRegistry {
    pub fn is_supported(&self, asset: Address) -> bool {
        self.supported.contains(&asset)
    }

    pub fn ensure_supported(&self, asset: Address) -> Result<(), ValidationError> {
        if self.is_supported(asset) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedAsset(asset))
        }
    }

    pub fn set(&mut self, asset: Address, supported: bool) {
        if supported {
            self.supported.insert(asset);
        } else {
            self.supported.remove(&asset);
        }
    }

    pub fn check_many(&self, assets: &[Address]) -> Vec<bool> {
        assets.iter().map(|asset| self.is_supported(*asset)).collect()
    }
}
