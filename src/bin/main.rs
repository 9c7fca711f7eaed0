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

use account_ledger::{AccountId, AccountStore, LedgerError};
use clap::Parser;
use csv::Writer;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Account Ledger - Manage in-memory accounts from the command line
///
/// Reads one command per line from stdin (or a script file) and prints the
/// result of each. Type `help` for the list of commands.
#[derive(Parser, Debug)]
#[command(name = "account-ledger")]
#[command(about = "An in-memory account ledger driven by line commands", long_about = None)]
struct Args {
    /// Read commands from FILE instead of stdin
    ///
    /// Example: cargo run -- --script session.txt > report.txt
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let store = AccountStore::new();
    let stdout = io::stdout();

    let result = match &args.script {
        Some(path) => {
            let file = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error opening file '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            info!(script = %path.display(), "session started");
            run(&store, BufReader::new(file), stdout.lock(), false)
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            info!(interactive, "session started");
            run(&store, stdin.lock(), stdout.lock(), interactive)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Sends logs to stderr so they never mix with command output.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

const HELP: &str = "\
Commands:
  open <owner name>              create a new account
  deposit <id> <amount>          add funds to an account
  withdraw <id> <amount>         take funds from an account
  transfer <from> <to> <amount>  move funds between accounts
  balance <id>                   show the current balance
  statement <id>                 show the full statement
  list                           list all accounts
  export                         write all accounts as CSV
  help                           show this message
  quit                           leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Open { owner: String },
    Deposit { account: AccountId, amount: Decimal },
    Withdraw { account: AccountId, amount: Decimal },
    Transfer { from: AccountId, to: AccountId, amount: Decimal },
    Balance { account: AccountId },
    Statement { account: AccountId },
    List,
    Export,
    Help,
    Quit,
}

/// Reasons a line could not be turned into a [`Command`].
#[derive(Debug, Error, PartialEq, Eq)]
enum CommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Failures while executing a command.
///
/// Only `Ledger` is recoverable; I/O and CSV failures end the session.
#[derive(Debug, Error)]
enum ShellError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Command {
    /// Parses a trimmed line. Returns `None` for blank lines and `#` comments.
    fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("open", []) => return Err(CommandError::Usage("open <owner name>")),
            ("open", owner) => Command::Open {
                owner: owner.join(" "),
            },
            ("deposit", [account, amount]) => Command::Deposit {
                account: AccountId::from(*account),
                amount: parse_amount(amount)?,
            },
            ("deposit", _) => return Err(CommandError::Usage("deposit <id> <amount>")),
            ("withdraw", [account, amount]) => Command::Withdraw {
                account: AccountId::from(*account),
                amount: parse_amount(amount)?,
            },
            ("withdraw", _) => return Err(CommandError::Usage("withdraw <id> <amount>")),
            ("transfer", [from, to, amount]) => Command::Transfer {
                from: AccountId::from(*from),
                to: AccountId::from(*to),
                amount: parse_amount(amount)?,
            },
            ("transfer", _) => return Err(CommandError::Usage("transfer <from> <to> <amount>")),
            ("balance", [account]) => Command::Balance {
                account: AccountId::from(*account),
            },
            ("balance", _) => return Err(CommandError::Usage("balance <id>")),
            ("statement", [account]) => Command::Statement {
                account: AccountId::from(*account),
            },
            ("statement", _) => return Err(CommandError::Usage("statement <id>")),
            ("list", []) => Command::List,
            ("list", _) => return Err(CommandError::Usage("list")),
            ("export", []) => Command::Export,
            ("export", _) => return Err(CommandError::Usage("export")),
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };

        Ok(Some(command))
    }
}

/// Parses a positive decimal amount.
///
/// The store checks the sign again; this only keeps junk input away from it.
fn parse_amount(text: &str) -> Result<Decimal, LedgerError> {
    match text.parse::<Decimal>() {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(LedgerError::InvalidAmount),
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Reads commands until `quit` or end of input.
///
/// Rejected commands are reported as `error: ...` lines and the session
/// continues.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
fn run<R: BufRead, W: Write>(
    store: &AccountStore,
    input: R,
    mut out: W,
    prompt: bool,
) -> Result<(), ShellError> {
    if prompt {
        writeln!(out, "Account ledger. Type 'help' for commands.")?;
    }

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!(input = line.trim(), error = %e, "command rejected");
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        match execute(store, &command, &mut out) {
            Ok(()) => {}
            Err(ShellError::Ledger(e)) => {
                warn!(input = line.trim(), error = %e, "command rejected");
                writeln!(out, "error: {}", e)?;
            }
            Err(e) => return Err(e),
        }
    }

    out.flush()?;
    Ok(())
}

/// Runs one command against the store and prints its result.
fn execute<W: Write>(store: &AccountStore, command: &Command, out: &mut W) -> Result<(), ShellError> {
    match command {
        Command::Open { owner } => {
            let account = store.open_account(owner)?;
            writeln!(
                out,
                "Account created: {} (owner: {}, balance: {})",
                account.id(),
                account.owner(),
                money(account.balance())
            )?;
        }
        Command::Deposit { account, amount } => {
            let balance = store.deposit(account, *amount)?;
            writeln!(out, "Deposited {} to {}. New balance: {}", money(*amount), account, money(balance))?;
        }
        Command::Withdraw { account, amount } => {
            let balance = store.withdraw(account, *amount)?;
            writeln!(out, "Withdrew {} from {}. New balance: {}", money(*amount), account, money(balance))?;
        }
        Command::Transfer { from, to, amount } => {
            let balance = store.transfer(from, to, *amount)?;
            let recipient = store.load_account(to)?;
            writeln!(
                out,
                "Transferred {} from {} to {} ({}). New balance: {}",
                money(*amount),
                from,
                recipient.id(),
                recipient.owner(),
                money(balance)
            )?;
        }
        Command::Balance { account } => {
            let balance = store.balance(account)?;
            writeln!(out, "{}: {}", account, money(balance))?;
        }
        Command::Statement { account } => {
            write!(out, "{}", store.statement(account)?)?;
        }
        Command::List => {
            let mut accounts = store.all_accounts();
            if accounts.is_empty() {
                writeln!(out, "No accounts")?;
            }
            accounts.sort_by(|a, b| a.id().cmp(b.id()));
            for (i, account) in accounts.iter().enumerate() {
                writeln!(
                    out,
                    "{}. {} - {} (balance: {})",
                    i + 1,
                    account.id(),
                    account.owner(),
                    money(account.balance())
                )?;
            }
        }
        Command::Export => write_accounts(store, &mut *out)?,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => {}
    }
    Ok(())
}

/// Writes account summaries as CSV, sorted by id.
///
/// # CSV Format
///
/// Columns: `id, owner, balance, transactions`
///
/// ```csv
/// id,owner,balance,transactions
/// ACC0001,Ivan,60.00,2
/// ACC0002,Olga,0.00,0
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_accounts<W: Write>(store: &AccountStore, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    let mut summaries: Vec<_> = store.all_accounts().iter().map(|a| a.summary()).collect();
    summaries.sort_by(|a, b| a.id.cmp(&b.id));
    for summary in &summaries {
        wtr.serialize(summary)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn run_script(script: &str) -> (AccountStore, String) {
        let store = AccountStore::new();
        let mut output = Vec::new();
        run(&store, Cursor::new(script), &mut output, false).unwrap();
        (store, String::from_utf8(output).unwrap())
    }

    #[test]
    fn parse_open_joins_owner_words() {
        assert_eq!(
            Command::parse("open Ivan Petrov").unwrap(),
            Some(Command::Open {
                owner: "Ivan Petrov".to_string()
            })
        );
    }

    #[test]
    fn parse_transfer() {
        assert_eq!(
            Command::parse("  TRANSFER ACC0001 ACC0002 60.00 ").unwrap(),
            Some(Command::Transfer {
                from: AccountId::from("ACC0001"),
                to: AccountId::from("ACC0002"),
                amount: dec!(60.00),
            })
        );
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# setup").unwrap(), None);
    }

    #[test]
    fn parse_rejects_bad_amounts() {
        for line in ["deposit ACC0001 abc", "deposit ACC0001 0", "withdraw ACC0001 -5"] {
            assert_eq!(
                Command::parse(line),
                Err(CommandError::Ledger(LedgerError::InvalidAmount)),
                "{line}"
            );
        }
    }

    #[test]
    fn parse_reports_usage_and_unknown_commands() {
        assert_eq!(
            Command::parse("deposit ACC0001"),
            Err(CommandError::Usage("deposit <id> <amount>"))
        );
        assert_eq!(Command::parse("open"), Err(CommandError::Usage("open <owner name>")));
        assert_eq!(Command::parse("list foo"), Err(CommandError::Usage("list")));
        assert_eq!(Command::parse("EXPORT now"), Err(CommandError::Usage("export")));
        assert_eq!(
            Command::parse("close ACC0001"),
            Err(CommandError::Unknown("close".to_string()))
        );
    }

    #[test]
    fn deposit_and_withdraw_session() {
        let (store, output) = run_script(
            "open Ivan\n\
             deposit ACC0001 100.00\n\
             withdraw ACC0001 40.00\n\
             withdraw ACC0001 1000.00\n",
        );

        assert!(output.contains("Account created: ACC0001 (owner: Ivan, balance: 0.00)"));
        assert!(output.contains("Deposited 100.00 to ACC0001. New balance: 100.00"));
        assert!(output.contains("Withdrew 40.00 from ACC0001. New balance: 60.00"));
        assert!(output.contains("error: insufficient funds"));

        let account = store.load_account(&AccountId::from("ACC0001")).unwrap();
        assert_eq!(account.balance(), dec!(60.00));
        assert_eq!(account.transactions().len(), 2);
    }

    #[test]
    fn transfer_session_reports_recipient() {
        let (_, output) = run_script(
            "open Ivan\n\
             open Olga\n\
             deposit ACC0001 60\n\
             transfer ACC0001 ACC0002 60\n\
             transfer ACC0001 ACC0002 0.01\n\
             transfer ACC0001 ACC0001 1\n\
             transfer ACC0001 ACC0009 1\n",
        );

        assert!(output.contains("Transferred 60.00 from ACC0001 to ACC0002 (Olga). New balance: 0.00"));
        assert!(output.contains("error: insufficient funds"));
        assert!(output.contains("error: cannot transfer to the same account"));
        assert!(output.contains("error: account not found: ACC0009"));
    }

    #[test]
    fn errors_do_not_stop_the_session() {
        let (store, output) = run_script(
            "frobnicate\n\
             deposit ACC0404 10\n\
             open Ivan\n",
        );

        assert!(output.contains("error: unknown command 'frobnicate'"));
        assert!(output.contains("error: account not found: ACC0404"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn quit_stops_processing() {
        let (store, _) = run_script("open Ivan\nquit\nopen Olga\n");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_sorts_by_id() {
        let (_, output) = run_script("list\nopen Ivan\nopen Olga\nlist\n");

        assert!(output.contains("No accounts"));
        let ivan = output.find("1. ACC0001 - Ivan (balance: 0.00)").unwrap();
        let olga = output.find("2. ACC0002 - Olga (balance: 0.00)").unwrap();
        assert!(ivan < olga);
    }

    #[test]
    fn statement_command_prints_history() {
        let (_, output) = run_script("open Ivan\nstatement ACC0001\ndeposit ACC0001 5\nstatement ACC0001\n");

        assert!(output.contains("Transaction history: no transactions"));
        assert!(output.contains("Deposit of 5.00"));
    }

    #[test]
    fn export_writes_csv_summaries() {
        let (_, output) = run_script(
            "open Olga\n\
             open Ivan\n\
             deposit ACC0002 100\n\
             withdraw ACC0002 40\n\
             export\n",
        );

        assert!(output.contains(
            "id,owner,balance,transactions\n\
             ACC0001,Olga,0.00,0\n\
             ACC0002,Ivan,60.00,2\n"
        ));
    }

    #[test]
    fn write_accounts_empty_store_writes_nothing() {
        let store = AccountStore::new();
        let mut output = Vec::new();
        write_accounts(&store, &mut output).unwrap();
        assert!(output.is_empty());
    }
}
