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

//! REST API server exposing the account ledger over HTTP.
//!
//! Run with: `cargo run --example server`
//!
//! # Example requests
//!
//! ```bash
//! # Open an account
//! curl -X POST http://localhost:3000/accounts \
//!   -H "Content-Type: application/json" \
//!   -d '{"owner": "Ivan"}'
//!
//! # Deposit
//! curl -X POST http://localhost:3000/accounts/ACC0001/deposit \
//!   -H "Content-Type: application/json" \
//!   -d '{"amount": "100.00"}'
//!
//! # Transfer
//! curl -X POST http://localhost:3000/transfers \
//!   -H "Content-Type: application/json" \
//!   -d '{"from": "ACC0001", "to": "ACC0002", "amount": "25.00"}'
//!
//! # Statement
//! curl http://localhost:3000/accounts/ACC0001/statement
//!
//! # List all accounts
//! curl http://localhost:3000/accounts
//! ```

use account_ledger::{Account, AccountId, AccountStore, LedgerError};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

/// Response body for balance-changing requests.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub id: String,
    pub balance: Decimal,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the account store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AccountStore>,
}

// === Error Handling ===

/// Wrapper for converting `LedgerError` into HTTP responses.
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            LedgerError::InvalidOwner => (StatusCode::BAD_REQUEST, "INVALID_OWNER"),
            LedgerError::SameAccountTransfer => (StatusCode::BAD_REQUEST, "SAME_ACCOUNT_TRANSFER"),
            LedgerError::InsufficientFunds => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
            }
            LedgerError::BalanceOverflow => (StatusCode::UNPROCESSABLE_ENTITY, "BALANCE_OVERFLOW"),
            LedgerError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /accounts - Open a new account.
async fn open_account(
    State(state): State<AppState>,
    Json(request): Json<OpenAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = state.store.open_account(&request.owner)?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /accounts - List all accounts, sorted by id.
async fn list_accounts(State(state): State<AppState>) -> Json<Vec<Account>> {
    let mut accounts = state.store.all_accounts();
    accounts.sort_by(|a, b| a.id().cmp(b.id()));
    Json(accounts)
}

/// GET /accounts/{id} - Get an account with its history.
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.store.load_account(&AccountId::from(id))?))
}

/// GET /accounts/{id}/statement - Plain-text statement.
async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, AppError> {
    Ok(state.store.statement(&AccountId::from(id))?)
}

/// POST /accounts/{id}/deposit
async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.store.deposit(&AccountId::from(id.as_str()), request.amount)?;
    Ok(Json(BalanceResponse { id, balance }))
}

/// POST /accounts/{id}/withdraw
async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.store.withdraw(&AccountId::from(id.as_str()), request.amount)?;
    Ok(Json(BalanceResponse { id, balance }))
}

/// POST /transfers - Move funds; responds with the source's new balance.
async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let from = AccountId::from(request.from.as_str());
    let to = AccountId::from(request.to);
    let balance = state.store.transfer(&from, &to, request.amount)?;
    Ok(Json(BalanceResponse {
        id: request.from,
        balance,
    }))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(open_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/statement", get(get_statement))
        .route("/accounts/{id}/deposit", post(deposit))
        .route("/accounts/{id}/withdraw", post(withdraw))
        .route("/transfers", post(transfer))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = AppState {
        store: Arc::new(AccountStore::new()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    info!("Ledger API server running on http://127.0.0.1:3000");
    info!("  POST /accounts                 - Open an account");
    info!("  GET  /accounts                 - List all accounts");
    info!("  GET  /accounts/:id             - Get account by ID");
    info!("  GET  /accounts/:id/statement   - Account statement");
    info!("  POST /accounts/:id/deposit     - Deposit funds");
    info!("  POST /accounts/:id/withdraw    - Withdraw funds");
    info!("  POST /transfers                - Transfer between accounts");

    axum::serve(listener, app).await
}
