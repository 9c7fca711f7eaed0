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

//! Transaction records.
//!
//! A [`Transaction`] is an immutable entry in an account's history. Each
//! balance-changing operation appends exactly one record per account it
//! touches:
//! - deposit → [`TransactionKind::Deposit`] on the credited account
//! - withdrawal → [`TransactionKind::Withdrawal`] on the debited account
//! - transfer → [`TransactionKind::TransferOut`] on the source and
//!   [`TransactionKind::TransferIn`] on the destination

use crate::base::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used when rendering amounts for humans.
pub(crate) const DISPLAY_PRECISION: u32 = 2;

/// Renders an amount with two decimal places, e.g. `60` as `60.00`.
pub(crate) fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.prec$}",
        amount.round_dp(DISPLAY_PRECISION),
        prec = DISPLAY_PRECISION as usize
    )
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::TransferOut => "TRANSFER OUT",
            Self::TransferIn => "TRANSFER IN",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    timestamp: DateTime<Utc>,
    kind: TransactionKind,
    amount: Decimal,
    from: Option<AccountId>,
    to: Option<AccountId>,
    description: String,
}

impl Transaction {
    pub(crate) fn deposit(to: &AccountId, amount: Decimal) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: TransactionKind::Deposit,
            amount,
            from: None,
            to: Some(to.clone()),
            description: format!("Deposit of {}", format_amount(amount)),
        }
    }

    pub(crate) fn withdrawal(from: &AccountId, amount: Decimal) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: TransactionKind::Withdrawal,
            amount,
            from: Some(from.clone()),
            to: None,
            description: format!("Withdrawal of {}", format_amount(amount)),
        }
    }

    /// Builds the matching outgoing and incoming records of a transfer.
    ///
    /// Both records share one timestamp.
    pub(crate) fn transfer_pair(from: &AccountId, to: &AccountId, amount: Decimal) -> (Self, Self) {
        let timestamp = Utc::now();
        let outgoing = Self {
            timestamp,
            kind: TransactionKind::TransferOut,
            amount,
            from: Some(from.clone()),
            to: Some(to.clone()),
            description: format!("Transfer to {}: {}", to, format_amount(amount)),
        };
        let incoming = Self {
            timestamp,
            kind: TransactionKind::TransferIn,
            amount,
            from: Some(from.clone()),
            to: Some(to.clone()),
            description: format!("Transfer from {}: {}", from, format_amount(amount)),
        };
        (outgoing, incoming)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn from(&self) -> Option<&AccountId> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&AccountId> {
        self.to.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
