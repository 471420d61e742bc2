// Host environment module
// This file holds the journaled ledger of balances, allowances, wrapped-native
// contracts, the block clock and the event log that the gateway runs against
//
// Numan Thabit 2025 Nov

use alloy_primitives::{address, Address, U256};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::errors::TransferError;
use crate::router::routes::RouterVersion;

/// Reserved asset identifier for the chain's native currency.
pub const NATIVE: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Notifications emitted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    OrderCreated {
        id: u64,
        token: Address,
        amount: U256,
        rate: U256,
        refund_address: Address,
        liquidity_provider: Address,
        fee_recipient: Address,
        fee_percent: u16,
    },
    OrderFulfilled {
        id: u64,
        liquidity_provider: Address,
    },
    AssetSupportUpdated {
        asset: Address,
        supported: bool,
    },
    RouterUpdated {
        version: RouterVersion,
        router: Address,
    },
    QuoterUpdated {
        quoter: Address,
    },
    WrappedNativeUpdated {
        wrapped_native: Address,
    },
    SwapExecuted {
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        amount_out: U256,
        version: RouterVersion,
    },
}

/// Handle to a journal position returned by [`Chain::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Checkpoint {
    journal_len: usize,
    log_len: usize,
    depth: usize,
}

#[derive(Debug, Clone)]
enum JournalEntry {
    Balance {
        asset: Address,
        holder: Address,
        previous: U256,
    },
    Allowance {
        asset: Address,
        owner: Address,
        spender: Address,
        previous: U256,
    },
}

/// In-memory execution host.
///
/// Every mutation is journaled while at least one checkpoint is open, so a
/// caller can revert a failed unit of work to the exact prior state.
#[derive(Debug, Default)]
pub struct Chain {
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    wrapped_native: HashSet<Address>,
    rejects_native: HashSet<Address>,
    timestamp: u64,
    logs: Vec<Event>,
    journal: Vec<JournalEntry>,
    depth: usize,
}

impl Chain {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    /// Register a wrapped-native token contract at `wrapped`.
    pub fn deploy_wrapped_native(&mut self, wrapped: Address) {
        self.wrapped_native.insert(wrapped);
    }

    pub fn is_wrapped_native(&self, asset: Address) -> bool {
        self.wrapped_native.contains(&asset)
    }

    /// Mark `account` as unable to receive native value.
    pub fn reject_native(&mut self, account: Address, rejects: bool) {
        if rejects {
            self.rejects_native.insert(account);
        } else {
            self.rejects_native.remove(&account);
        }
    }

    pub fn balance_of(&self, asset: Address, holder: Address) -> U256 {
        self.balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Credit `amount` of `asset` out of thin air. Used for genesis funding.
    pub fn mint(&mut self, asset: Address, to: Address, amount: U256) -> Result<(), TransferError> {
        let balance = self.balance_of(asset, to);
        let next = balance.checked_add(amount).ok_or(TransferError::Overflow)?;
        self.set_balance(asset, to, next);
        Ok(())
    }

    /// Move `amount` of `asset` between holders. Native moves honour the
    /// recipient's ability to accept value.
    pub fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        if asset == NATIVE && self.rejects_native.contains(&to) {
            return Err(TransferError::NativeRejected(to));
        }
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                asset,
                holder: from,
                available,
                required: amount,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        self.set_balance(asset, from, available - amount);
        self.set_balance(asset, to, credited);
        debug!(%asset, %from, %to, %amount, "transfer");
        Ok(())
    }

    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: U256) {
        let previous = self.allowance(asset, owner, spender);
        if self.depth > 0 {
            self.journal.push(JournalEntry::Allowance {
                asset,
                owner,
                spender,
                previous,
            });
        }
        if amount.is_zero() {
            self.allowances.remove(&(asset, owner, spender));
        } else {
            self.allowances.insert((asset, owner, spender), amount);
        }
    }

    /// Spend `spender`'s allowance over `from`'s tokens.
    pub fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(TransferError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                available: allowed,
                required: amount,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.approve(asset, from, spender, allowed - amount);
        Ok(())
    }

    /// Wrap native value held by `holder` into `wrapped` tokens.
    pub fn deposit(
        &mut self,
        wrapped: Address,
        holder: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        if !self.is_wrapped_native(wrapped) {
            return Err(TransferError::NotWrappedNative(wrapped));
        }
        self.transfer(NATIVE, holder, wrapped, amount)?;
        self.mint(wrapped, holder, amount)
    }

    /// Burn `wrapped` tokens held by `holder` and release the backing native value.
    pub fn withdraw(
        &mut self,
        wrapped: Address,
        holder: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        if !self.is_wrapped_native(wrapped) {
            return Err(TransferError::NotWrappedNative(wrapped));
        }
        let available = self.balance_of(wrapped, holder);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                asset: wrapped,
                holder,
                available,
                required: amount,
            });
        }
        self.set_balance(wrapped, holder, available - amount);
        self.transfer(NATIVE, wrapped, holder, amount)
    }

    pub fn emit(&mut self, event: Event) {
        self.logs.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.logs
    }

    /// Open a nested checkpoint.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint {
            journal_len: self.journal.len(),
            log_len: self.logs.len(),
            depth: self.depth,
        }
    }

    /// Keep everything done since `checkpoint`.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        debug_assert_eq!(checkpoint.depth, self.depth, "checkpoints closed out of order");
        self.depth = checkpoint.depth - 1;
        if self.depth == 0 {
            self.journal.clear();
        }
    }

    /// Undo everything done since `checkpoint`, including emitted events.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        debug_assert_eq!(checkpoint.depth, self.depth, "checkpoints closed out of order");
        while self.journal.len() > checkpoint.journal_len {
            match self.journal.pop() {
                Some(JournalEntry::Balance {
                    asset,
                    holder,
                    previous,
                }) => {
                    self.write_balance(asset, holder, previous);
                }
                Some(JournalEntry::Allowance {
                    asset,
                    owner,
                    spender,
                    previous,
                }) => {
                    if previous.is_zero() {
                        self.allowances.remove(&(asset, owner, spender));
                    } else {
                        self.allowances.insert((asset, owner, spender), previous);
                    }
                }
                None => break,
            }
        }
        self.logs.truncate(checkpoint.log_len);
        self.depth = checkpoint.depth - 1;
        if self.depth == 0 {
            self.journal.clear();
        }
    }

    fn set_balance(&mut self, asset: Address, holder: Address, amount: U256) {
        if self.depth > 0 {
            let previous = self.balance_of(asset, holder);
            self.journal.push(JournalEntry::Balance {
                asset,
                holder,
                previous,
            });
        }
        self.write_balance(asset, holder, amount);
    }

    fn write_balance(&mut self, asset: Address, holder: Address, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(&(asset, holder));
        } else {
            self.balances.insert((asset, holder), amount);
        }
    }
}
