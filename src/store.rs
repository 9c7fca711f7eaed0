// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! In-memory account store.
//!
//! The [`AccountStore`] owns every [`Account`] in the ledger. It offers two
//! ways to change an account:
//!
//! - **Copy model**: [`load_account`](AccountStore::load_account) hands out a
//!   snapshot, the caller mutates it, and [`save_account`](AccountStore::save_account)
//!   writes it back. Each call is atomic on its own; the sequence is not.
//! - **Atomic transactions**: [`update`](AccountStore::update),
//!   [`update_pair`](AccountStore::update_pair) and the [`deposit`](AccountStore::deposit),
//!   [`withdraw`](AccountStore::withdraw) and [`transfer`](AccountStore::transfer)
//!   helpers run load, mutate and save under the account locks, so concurrent
//!   callers never lose each other's updates.
//!
//! # Locking
//!
//! Accounts live in a [`DashMap`] keyed by id, each behind its own
//! [`parking_lot::Mutex`]. Lock order is always map shard, then account.
//! No account lock is held while the map is touched, and two-account
//! transactions lock in ascending [`AccountId`] order, so opposing transfers
//! between the same pair cannot deadlock.

use crate::account::{Account, validate_amount};
use crate::base::AccountId;
use crate::LedgerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

type AccountCell = Arc<Mutex<Account>>;

/// Concurrency-safe keyed collection of accounts.
///
/// # Invariants
///
/// - Every stored account is keyed by its own id.
/// - Balances are never negative after a committed operation.
/// - Histories only grow, and only through committed operations or `save_account`.
#[derive(Debug)]
pub struct AccountStore {
    /// Accounts indexed by id.
    accounts: DashMap<AccountId, AccountCell>,
    /// Last sequence number handed out by `open_account`.
    sequence: AtomicU64,
}

impl AccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        AccountStore {
            accounts: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an account for `owner` with a fresh `ACC0001`-style id.
    ///
    /// The owner name is trimmed. Ids already taken through
    /// [`save_account`](Self::save_account) are skipped.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidOwner`] if the trimmed name is empty.
    pub fn open_account(&self, owner: &str) -> Result<Account, LedgerError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(LedgerError::InvalidOwner);
        }

        loop {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            let Entry::Vacant(entry) = self.accounts.entry(AccountId::from_sequence(sequence)) else {
                continue;
            };
            let account = Account::new(entry.key().clone(), owner);
            entry.insert(Arc::new(Mutex::new(account.clone())));
            debug!(account = %account.id(), owner, "account opened");
            return Ok(account);
        }
    }

    /// Inserts or replaces the account stored under `account.id()`.
    ///
    /// An existing record is overwritten in place, under its lock, so
    /// atomic transactions that lock it afterwards see the saved state.
    pub fn save_account(&self, account: Account) {
        match self.accounts.entry(account.id().clone()) {
            Entry::Occupied(entry) => {
                *entry.get().lock() = account;
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(account)));
            }
        }
    }

    /// Returns a snapshot of the account with the given id.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if no such account exists.
    pub fn load_account(&self, id: &AccountId) -> Result<Account, LedgerError> {
        let cell = self.cell(id)?;
        let account = cell.lock().clone();
        Ok(account)
    }

    /// Returns snapshots of all accounts in unspecified order.
    pub fn all_accounts(&self) -> Vec<Account> {
        let cells: Vec<AccountCell> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        cells.iter().map(|cell| cell.lock().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    /// Runs `mutate` on one account while holding its lock.
    ///
    /// The closure works on a copy. The copy replaces the stored account only
    /// if the closure returns `Ok`, so an error discards every change it made.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`], or whatever `mutate` returns.
    pub fn update<T, F>(&self, id: &AccountId, mutate: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        self.with_locked(id, |account| {
            let mut draft = account.clone();
            let value = mutate(&mut draft)?;
            *account = draft;
            Ok(value)
        })
    }

    /// Runs `mutate` on two distinct accounts while holding both locks.
    ///
    /// The closure receives copies of the accounts in argument order; the
    /// locks are taken in ascending id order. Both copies are written back
    /// only if the closure returns `Ok`. Both ids are resolved before either
    /// lock is taken, so a missing account fails with nothing mutated.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::SameAccountTransfer`] if `first == second`.
    /// - [`LedgerError::AccountNotFound`] if either account is missing.
    /// - Whatever `mutate` returns.
    pub fn update_pair<T, F>(
        &self,
        first: &AccountId,
        second: &AccountId,
        mutate: F,
    ) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<T, LedgerError>,
    {
        self.with_locked_pair(first, second, |first_account, second_account| {
            let mut first_draft = first_account.clone();
            let mut second_draft = second_account.clone();
            let value = mutate(&mut first_draft, &mut second_draft)?;
            *first_account = first_draft;
            *second_account = second_draft;
            Ok(value)
        })
    }

    /// Locks one account and hands the stored record to `mutate` in place.
    ///
    /// Only for closures that leave the account untouched when they fail.
    fn with_locked<T, F>(&self, id: &AccountId, mutate: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        let cell = self.cell(id)?;
        let mut account = cell.lock();
        mutate(&mut *account)
    }

    /// Locks two accounts in ascending id order and mutates them in place.
    ///
    /// Same contract as [`with_locked`](Self::with_locked).
    fn with_locked_pair<T, F>(
        &self,
        first: &AccountId,
        second: &AccountId,
        mutate: F,
    ) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<T, LedgerError>,
    {
        if first == second {
            return Err(LedgerError::SameAccountTransfer);
        }
        let first_cell = self.cell(first)?;
        let second_cell = self.cell(second)?;

        let (mut first_account, mut second_account) = if first < second {
            let first_account = first_cell.lock();
            let second_account = second_cell.lock();
            (first_account, second_account)
        } else {
            let second_account = second_cell.lock();
            let first_account = first_cell.lock();
            (first_account, second_account)
        };
        mutate(&mut *first_account, &mut *second_account)
    }

    /// Atomically deposits into an account. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - `amount <= 0`.
    /// - [`LedgerError::AccountNotFound`] - unknown id.
    /// - [`LedgerError::BalanceOverflow`] - new balance out of range.
    pub fn deposit(&self, id: &AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        self.with_locked(id, |account| {
            account.deposit(amount)?;
            debug!(account = %id, %amount, balance = %account.balance(), "deposit committed");
            Ok(account.balance())
        })
    }

    /// Atomically withdraws from an account. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - `amount <= 0`.
    /// - [`LedgerError::AccountNotFound`] - unknown id.
    /// - [`LedgerError::InsufficientFunds`] - balance below `amount`.
    pub fn withdraw(&self, id: &AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        self.with_locked(id, |account| {
            account.withdraw(amount)?;
            debug!(account = %id, %amount, balance = %account.balance(), "withdrawal committed");
            Ok(account.balance())
        })
    }

    /// Atomically moves funds between two accounts. Returns the source's new balance.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`LedgerError::InvalidAmount`] - `amount <= 0`.
    /// - [`LedgerError::SameAccountTransfer`] - `from == to`.
    /// - [`LedgerError::AccountNotFound`] - either id is unknown.
    /// - [`LedgerError::InsufficientFunds`] - source balance below `amount`.
    /// - [`LedgerError::BalanceOverflow`] - destination balance out of range.
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        self.with_locked_pair(from, to, |source, destination| {
            source.transfer_to(destination, amount)?;
            debug!(
                from = %from,
                to = %to,
                %amount,
                balance = %source.balance(),
                "transfer committed"
            );
            Ok(source.balance())
        })
    }

    /// Returns the current balance of an account.
    pub fn balance(&self, id: &AccountId) -> Result<Decimal, LedgerError> {
        let cell = self.cell(id)?;
        let balance = cell.lock().balance();
        Ok(balance)
    }

    /// Renders the statement of an account.
    pub fn statement(&self, id: &AccountId) -> Result<String, LedgerError> {
        let cell = self.cell(id)?;
        let statement = cell.lock().statement().to_string();
        Ok(statement)
    }

    /// Clones the handle for `id` so no map guard outlives this call.
    fn cell(&self, id: &AccountId) -> Result<AccountCell, LedgerError> {
        self.accounts
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::AccountNotFound(id.clone()))
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn update_pair_passes_accounts_in_argument_order() {
        let store = AccountStore::new();
        let low = store.open_account("Low").unwrap();
        let high = store.open_account("High").unwrap();

        // Locks are taken high-id-last, but the closure still sees (high, low).
        let ids = store
            .update_pair(high.id(), low.id(), |first, second| {
                Ok((first.id().clone(), second.id().clone()))
            })
            .unwrap();
        assert_eq!(ids, (high.id().clone(), low.id().clone()));
    }

    #[test]
    fn open_account_skips_ids_taken_by_save() {
        let store = AccountStore::new();
        store.save_account(Account::new(AccountId::from("ACC0001"), "Manual"));

        let opened = store.open_account("Ivan").unwrap();

        assert_eq!(opened.id().as_str(), "ACC0002");
        assert_eq!(store.load_account(&AccountId::from("ACC0001")).unwrap().owner(), "Manual");
    }

    #[test]
    fn open_account_trims_owner() {
        let store = AccountStore::new();
        let account = store.open_account("  Ivan  ").unwrap();
        assert_eq!(account.owner(), "Ivan");
        assert_eq!(store.open_account("   "), Err(LedgerError::InvalidOwner));
    }

    #[test]
    fn save_replaces_record_seen_by_transactions() {
        let store = AccountStore::new();
        let mut account = store.open_account("Ivan").unwrap();
        account.deposit(dec!(5)).unwrap();
        store.save_account(account.clone());

        // The atomic path writes through to the same record.
        assert_eq!(store.deposit(account.id(), dec!(1)).unwrap(), dec!(6));
        assert_eq!(store.load_account(account.id()).unwrap().transactions().len(), 2);
    }
}
