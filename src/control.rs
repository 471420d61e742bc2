// Control plane: reentrancy guard
//
// Bounds order creation to one in-flight operation per gateway. A nested entry
// from inside a router invocation is rejected instead of interleaving with
// the outer settlement.
//
// Numan Thabit 2025 Nov

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use crate::errors::GatewayError;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the guarded section. The returned permit releases it on drop.
    pub fn enter(&self) -> Result<GuardPermit<'_>, GatewayError> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                warn!("nested entry rejected by reentrancy guard");
                GatewayError::Reentrancy
            })?;
        Ok(GuardPermit { guard: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

pub struct GuardPermit<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardPermit<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_entry_is_rejected_until_permit_drops() {
        let guard = ReentrancyGuard::new();
        {
            let _permit = guard.enter().unwrap();
            assert!(guard.is_entered());
            assert!(matches!(guard.enter(), Err(GatewayError::Reentrancy)));
        }
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }
}
