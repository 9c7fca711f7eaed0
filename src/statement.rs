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

//! Human-readable account statements.

use crate::account::Account;
use crate::transaction::format_amount;
use std::fmt;

const RULE: &str = "-------------------------------------------------------------";
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Report of an account's id, owner, balance and full history.
///
/// Rendered through [`fmt::Display`]. History rows appear in insertion order.
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    account: &'a Account,
}

impl<'a> Statement<'a> {
    pub(crate) fn new(account: &'a Account) -> Self {
        Self { account }
    }
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let account = self.account;
        writeln!(f, "STATEMENT FOR ACCOUNT {}", account.id())?;
        writeln!(f, "Owner: {}", account.owner())?;
        writeln!(f, "Current balance: {}", format_amount(account.balance()))?;

        if account.transactions().is_empty() {
            return writeln!(f, "Transaction history: no transactions");
        }

        writeln!(f, "{RULE}")?;
        writeln!(f, "{:<16} | {:<12} | {:>10} | DESCRIPTION", "DATE AND TIME", "TYPE", "AMOUNT")?;
        writeln!(f, "{RULE}")?;
        for tx in account.transactions() {
            writeln!(
                f,
                "{} | {:<12} | {:>10} | {}",
                tx.timestamp().format(TIMESTAMP_FORMAT),
                tx.kind(),
                format_amount(tx.amount()),
                tx.description()
            )?;
        }
        Ok(())
    }
}
