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

//! # Account Ledger
//!
//! This library provides an in-memory ledger of named accounts. Each account
//! holds a balance and an append-only transaction history, and supports
//! deposits, withdrawals, and transfers between accounts.
//!
//! ## Core Components
//!
//! - [`AccountStore`]: Owns all accounts and runs atomic transactions over them
//! - [`Account`]: Account state and the balance-changing operations
//! - [`Transaction`]: Immutable history record, tagged with a [`TransactionKind`]
//! - [`Statement`]: Printable account report
//! - [`LedgerError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use account_ledger::{AccountStore, LedgerError};
//! use rust_decimal_macros::dec;
//!
//! let store = AccountStore::new();
//! let ivan = store.open_account("Ivan").unwrap();
//! let olga = store.open_account("Olga").unwrap();
//!
//! store.deposit(ivan.id(), dec!(100.00)).unwrap();
//! store.transfer(ivan.id(), olga.id(), dec!(60.00)).unwrap();
//!
//! assert_eq!(store.balance(ivan.id()).unwrap(), dec!(40.00));
//! assert_eq!(store.balance(olga.id()).unwrap(), dec!(60.00));
//! assert_eq!(
//!     store.transfer(ivan.id(), ivan.id(), dec!(1.00)),
//!     Err(LedgerError::SameAccountTransfer)
//! );
//! ```
//!
//! ## Thread Safety
//!
//! The store locks each account individually. Deposits, withdrawals and
//! transfers run as indivisible load-mutate-save transactions, and transfers
//! lock their two accounts in id order so they cannot deadlock.

pub mod account;
mod base;
pub mod error;
mod statement;
mod store;
mod transaction;

pub use account::{Account, AccountSummary};
pub use base::AccountId;
pub use error::LedgerError;
pub use statement::Statement;
pub use store::AccountStore;
pub use transaction::{Transaction, TransactionKind};
