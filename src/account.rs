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

//! Account state and the balance-changing ledger operations.
//!
//! An [`Account`] is a plain value. The operations here validate first and
//! mutate last, so a failed call leaves the account untouched. They know
//! nothing about the store; see [`AccountStore`](crate::AccountStore) for the
//! atomic load-mutate-save wrappers.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use account_ledger::{Account, AccountId, LedgerError};
//!
//! let mut account = Account::new(AccountId::from("ACC0001"), "Ivan");
//! account.deposit(dec!(100.00)).unwrap();
//! account.withdraw(dec!(40.00)).unwrap();
//! assert_eq!(account.balance(), dec!(60.00));
//! assert_eq!(account.withdraw(dec!(1000.00)), Err(LedgerError::InsufficientFunds));
//! ```

use crate::base::AccountId;
use crate::statement::Statement;
use crate::transaction::Transaction;
use crate::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    owner: String,
    balance: Decimal,
    /// Append-only history in chronological order.
    transactions: Vec<Transaction>,
}

impl Account {
    /// Decimal places kept in exported summaries.
    pub const DECIMAL_PRECISION: u32 = 2;

    /// Creates an account with zero balance and no history.
    pub fn new(id: AccountId, owner: impl Into<String>) -> Self {
        Self {
            id,
            owner: owner.into(),
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns a printable report of this account and its history.
    pub fn statement(&self) -> Statement<'_> {
        Statement::new(self)
    }

    /// Returns the row written by CSV exports.
    ///
    /// The balance is rounded and padded to exactly two decimal places.
    pub fn summary(&self) -> AccountSummary {
        let mut balance = self.balance.round_dp(Self::DECIMAL_PRECISION);
        balance.rescale(Self::DECIMAL_PRECISION);
        AccountSummary {
            id: self.id.clone(),
            owner: self.owner.clone(),
            balance,
            transactions: self.transactions.len(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of {} went negative: {}",
            self.id,
            self.balance
        );
    }

    /// Increases the balance.
    ///
    /// Fails with [`LedgerError::BalanceOverflow`] if the new balance does not
    /// fit in a [`Decimal`].
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        validate_amount(amount)?;
        self.balance = credit(self.balance, amount)?;
        self.transactions.push(Transaction::deposit(&self.id, amount));
        self.assert_invariants();
        Ok(())
    }

    /// Decreases the balance.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        validate_amount(amount)?;
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        self.balance -= amount;
        self.transactions.push(Transaction::withdrawal(&self.id, amount));
        self.assert_invariants();
        Ok(())
    }

    /// Moves funds from this account to `to`.
    ///
    /// Both accounts change or neither does.
    pub fn transfer_to(&mut self, to: &mut Account, amount: Decimal) -> Result<(), LedgerError> {
        validate_amount(amount)?;
        if self.id == to.id {
            return Err(LedgerError::SameAccountTransfer);
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        let to_balance = credit(to.balance, amount)?;

        let (outgoing, incoming) = Transaction::transfer_pair(&self.id, &to.id, amount);
        self.balance -= amount;
        to.balance = to_balance;
        self.transactions.push(outgoing);
        to.transactions.push(incoming);

        self.assert_invariants();
        to.assert_invariants();
        Ok(())
    }
}

/// Flat view of an account for tabular output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: AccountId,
    pub owner: String,
    pub balance: Decimal,
    pub transactions: usize,
}

/// Rejects zero and negative amounts.
pub(crate) fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    balance
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow)
}
