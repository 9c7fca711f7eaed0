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

//! Error types for ledger operations.

use crate::base::AccountId;
use thiserror::Error;

/// Ledger operation errors.
///
/// Every variant is an expected, recoverable condition. A failed operation
/// leaves every account it touched exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero, negative, or not a number
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Withdrawal or transfer would take the balance below zero
    #[error("insufficient funds")]
    InsufficientFunds,

    /// No account with the given ID exists
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transfer source and destination are the same account
    #[error("cannot transfer to the same account")]
    SameAccountTransfer,

    /// Credit would push a balance past the largest representable amount
    #[error("balance overflow (amount too large)")]
    BalanceOverflow,

    /// Owner name is empty
    #[error("owner name must not be empty")]
    InvalidOwner,
}

#[cfg(test)]
mod tests {
    use super::LedgerError;
    use crate::AccountId;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::InvalidAmount.to_string(),
            "invalid amount (must be positive)"
        );
        assert_eq!(LedgerError::InsufficientFunds.to_string(), "insufficient funds");
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::from("ACC0009")).to_string(),
            "account not found: ACC0009"
        );
        assert_eq!(
            LedgerError::SameAccountTransfer.to_string(),
            "cannot transfer to the same account"
        );
        assert_eq!(LedgerError::InvalidOwner.to_string(), "owner name must not be empty");
        assert_eq!(
            LedgerError::BalanceOverflow.to_string(),
            "balance overflow (amount too large)"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::AccountNotFound(AccountId::from("ACC0001"));
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
