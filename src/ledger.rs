// Order ledger
// Append-only, ID-indexed store of settled orders
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use serde::Serialize;

/// A completed exchange-and-distribution record. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Settled asset; [`crate::chain::NATIVE`] for native currency.
    pub token: Address,
    /// Gross settled amount before the fee split.
    pub amount: U256,
    /// Caller-supplied expected rate. Informational only.
    pub rate: U256,
    pub creator: Address,
    pub refund_address: Address,
    pub liquidity_provider: Address,
    pub fee_recipient: Address,
    /// Basis points, at most 1000.
    pub fee_percent: u16,
    pub is_fulfilled: bool,
    /// Kept for record compatibility; no operation sets it.
    pub is_refunded: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

impl OrderLedger {
    /// Identifier the next appended order will receive.
    pub fn next_id(&self) -> u64 {
        self.orders.len() as u64
    }

    pub fn append(&mut self, order: Order) -> u64 {
        let id = self.next_id();
        self.orders.push(order);
        id
    }

    pub fn get(&self, id: u64) -> Option<&Order> {
        usize::try_from(id).ok().and_then(|idx| self.orders.get(idx))
    }

    pub fn count(&self) -> u64 {
        self.orders.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(amount: u64) -> Order {
        Order {
            token: Address::repeat_byte(0x11),
            amount: U256::from(amount),
            rate: U256::from(1),
            creator: Address::repeat_byte(0x01),
            refund_address: Address::repeat_byte(0x01),
            liquidity_provider: Address::repeat_byte(0x02),
            fee_recipient: Address::repeat_byte(0x03),
            fee_percent: 100,
            is_fulfilled: true,
            is_refunded: false,
            timestamp: 42,
        }
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let mut ledger = OrderLedger::default();
        assert_eq!(ledger.next_id(), 0);
        assert_eq!(ledger.append(order(1)), 0);
        assert_eq!(ledger.append(order(2)), 1);
        assert_eq!(ledger.count(), 2);
        assert_eq!(ledger.get(1).map(|o| o.amount), Some(U256::from(2)));
        assert!(ledger.get(2).is_none());
    }
}
