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

//! REST API over the [`Marketplace`].
//!
//! ## Endpoints
//!
//! - `POST /transactions` - Create a transaction
//! - `GET /transactions` - List transactions, optionally `?status=en cours`
//! - `GET /transactions/{id}` - Get a transaction
//! - `PUT /transactions/{id}/status?status=validée` - Change its status
//! - `POST /books/{book_id}/transactions/{transaction_id}` - Link a book
//! - `GET /users/{id}/books` - Books in a user's transactions
//! - `GET /transaction-types` - Seeded transaction types
//! - `GET /payments/{id}` - A payment and the transactions it settles
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:3000/transactions \
//!   -H "Content-Type: application/json" \
//!   -d '{"transaction_type_id": 1, "price": "25.50", "user_id": 7, "book_ids": [3, 4]}'
//!
//! curl -X PUT "http://localhost:3000/transactions/1/status?status=valid%C3%A9e"
//! ```

use crate::assembler::CreateTransactionRequest;
use crate::base::{BookId, PaymentId, TransactionId, UserId};
use crate::dto::{BookDto, PaymentDto, TransactionDto, TransactionTypeDto};
use crate::error::{ReferenceKind, TransactionError};
use crate::marketplace::Marketplace;
use crate::status::TransactionStatus;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Response body for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Shared application state containing the marketplace.
#[derive(Clone)]
pub struct AppState {
    pub marketplace: Arc<Marketplace>,
}

/// Wrapper for converting `TransactionError` into HTTP responses.
pub struct AppError(TransactionError);

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        AppError(err)
    }
}

/// A body that is not a valid request answers with the same error shape as
/// the service.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(TransactionError::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(TransactionError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            TransactionError::ReferenceNotFound { kind, .. } => {
                let code = match kind {
                    ReferenceKind::TransactionType => "TRANSACTION_TYPE_NOT_FOUND",
                    ReferenceKind::User => "USER_NOT_FOUND",
                    ReferenceKind::Book => "BOOK_NOT_FOUND",
                    ReferenceKind::Payment => "PAYMENT_NOT_FOUND",
                    ReferenceKind::Transaction => "TRANSACTION_NOT_FOUND",
                };
                (StatusCode::NOT_FOUND, code)
            }
            TransactionError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            TransactionError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "INVALID_STATUS"),
            TransactionError::IllegalTransition { .. } => {
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION")
            }
            TransactionError::BookUnavailable(_) => (StatusCode::CONFLICT, "BOOK_UNAVAILABLE"),
            TransactionError::ConcurrentModification { .. } => {
                (StatusCode::CONFLICT, "CONCURRENT_MODIFICATION")
            }
            TransactionError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
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

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

/// POST /transactions
async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionDto>), AppError> {
    let Json(request) = payload?;
    let tx = state.marketplace.create_transaction(&request)?;
    Ok((StatusCode::CREATED, Json(TransactionDto::from(&tx))))
}

/// GET /transactions
async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionDto>>, AppError> {
    let Query(query) = query?;
    let transactions = match query.status {
        Some(status) => {
            let status: TransactionStatus = status.parse()?;
            state.marketplace.transactions_with_status(status)
        }
        None => state.marketplace.transactions(),
    };
    Ok(Json(transactions.iter().map(TransactionDto::from).collect()))
}

/// GET /transactions/{id}
async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<TransactionDto>, AppError> {
    let tx = state.marketplace.transaction(TransactionId(id))?;
    Ok(Json(TransactionDto::from(&tx)))
}

/// PUT /transactions/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<TransactionDto>, AppError> {
    let Query(query) = query?;
    let tx = state
        .marketplace
        .update_status(TransactionId(id), &query.status)?;
    Ok(Json(TransactionDto::from(&tx)))
}

/// POST /books/{book_id}/transactions/{transaction_id}
async fn add_book_to_transaction(
    State(state): State<AppState>,
    Path((book_id, transaction_id)): Path<(u64, u32)>,
) -> Result<Json<BookDto>, AppError> {
    let book = state
        .marketplace
        .add_book_to_transaction(BookId(book_id), TransactionId(transaction_id))?;
    Ok(Json(BookDto::from(&book)))
}

/// GET /users/{id}/books
async fn books_for_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    let books = state.marketplace.books_for_user(UserId(id))?;
    Ok(Json(books.iter().map(BookDto::from).collect()))
}

/// GET /transaction-types
async fn list_transaction_types(State(state): State<AppState>) -> Json<Vec<TransactionTypeDto>> {
    Json(
        state
            .marketplace
            .transaction_types()
            .iter()
            .map(TransactionTypeDto::from)
            .collect(),
    )
}

/// GET /payments/{id}
async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<PaymentDto>, AppError> {
    let (payment, transaction_ids) = state.marketplace.payment(PaymentId(id))?;
    Ok(Json(PaymentDto::new(&payment, transaction_ids)))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/transactions",
            post(create_transaction).get(list_transactions),
        )
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}/status", put(update_status))
        .route(
            "/books/{book_id}/transactions/{transaction_id}",
            post(add_book_to_transaction),
        )
        .route("/users/{id}/books", get(books_for_user))
        .route("/transaction-types", get(list_transaction_types))
        .route("/payments/{id}", get(get_payment))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: TransactionError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn missing_references_are_not_found() {
        let err = TransactionError::not_found(ReferenceKind::Book, BookId(3));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_input_is_bad_request() {
        assert_eq!(
            status_of(TransactionError::InvalidStatus("done".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(TransactionError::InvalidRequest("empty".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_status_query_is_bad_request() {
        let uri = "/transactions/1/status".parse().unwrap();
        let rejection = Query::<StatusQuery>::try_from_uri(&uri).unwrap_err();

        let response = AppError::from(rejection).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn state_conflicts_are_conflict() {
        let illegal = TransactionError::IllegalTransition {
            current: TransactionStatus::Validated,
            requested: TransactionStatus::Cancelled,
        };
        assert_eq!(status_of(illegal), StatusCode::CONFLICT);
        assert_eq!(
            status_of(TransactionError::BookUnavailable(BookId(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(TransactionError::ConcurrentModification {
                id: TransactionId(1),
                expected: 1,
                found: 2,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn storage_failures_are_internal() {
        assert_eq!(
            status_of(TransactionError::Storage("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
