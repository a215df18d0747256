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

//! Transport representations.
//!
//! Prices are decimal strings, timestamps RFC 3339 and statuses their French
//! literal:
//!
//! ```json
//! {
//!   "id": 1,
//!   "user_id": 7,
//!   "transaction_type_id": 1,
//!   "payment_id": null,
//!   "book_ids": [3, 4],
//!   "price": "25.50",
//!   "status": "en cours",
//!   "transaction_date": "2025-02-14T10:30:00Z",
//!   "start_date": "2025-02-14T10:30:00Z",
//!   "end_date": null,
//!   "version": 1
//! }
//! ```

use crate::TransactionError;
use crate::base::{BookId, PaymentId, TransactionId, TransactionTypeId, UserId};
use crate::catalog::{Book, Payment};
use crate::status::TransactionStatus;
use crate::transaction::{Transaction, TransactionKind, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    pub id: Option<TransactionId>,
    pub user_id: UserId,
    pub transaction_type_id: TransactionTypeId,
    pub payment_id: Option<PaymentId>,
    pub book_ids: BTreeSet<BookId>,
    pub price: Decimal,
    pub status: TransactionStatus,
    pub transaction_date: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

impl From<&Transaction> for TransactionDto {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user,
            transaction_type_id: tx.transaction_type,
            payment_id: tx.payment,
            book_ids: tx.books.clone(),
            price: tx.price,
            status: tx.status,
            transaction_date: tx.transaction_date,
            start_date: tx.start_date,
            end_date: tx.end_date,
            version: tx.version,
        }
    }
}

impl TryFrom<TransactionDto> for Transaction {
    type Error = TransactionError;

    /// Rebuilds an aggregate, rejecting DTOs that break its invariants.
    fn try_from(dto: TransactionDto) -> Result<Self, Self::Error> {
        if dto.book_ids.is_empty() {
            return Err(TransactionError::InvalidRequest(
                "at least one book is required".to_string(),
            ));
        }
        if dto.price < Decimal::ZERO {
            return Err(TransactionError::InvalidRequest(
                "price must not be negative".to_string(),
            ));
        }
        if dto.end_date.is_some() != dto.status.is_terminal() {
            return Err(TransactionError::InvalidRequest(format!(
                "end_date does not match status \"{}\"",
                dto.status
            )));
        }
        let started = matches!(
            dto.status,
            TransactionStatus::InProgress | TransactionStatus::Validated
        );
        if started && dto.start_date.is_none() {
            return Err(TransactionError::InvalidRequest(format!(
                "start_date is required for status \"{}\"",
                dto.status
            )));
        }
        if dto.status == TransactionStatus::Pending && dto.start_date.is_some() {
            return Err(TransactionError::InvalidRequest(
                "a pending transaction cannot have a start_date".to_string(),
            ));
        }

        Ok(Self {
            id: dto.id,
            user: dto.user_id,
            transaction_type: dto.transaction_type_id,
            payment: dto.payment_id,
            books: dto.book_ids,
            price: dto.price,
            status: dto.status,
            transaction_date: dto.transaction_date,
            start_date: dto.start_date,
            end_date: dto.end_date,
            version: dto.version,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub owner_id: UserId,
    pub price: Decimal,
    pub quantity_available: u32,
    pub available: bool,
    pub transaction_ids: BTreeSet<TransactionId>,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            owner_id: book.owner,
            price: book.price,
            quantity_available: book.quantity_available,
            available: book.available(),
            transaction_ids: book.transactions.clone(),
        }
    }
}

/// A payment and the transactions it settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDto {
    pub id: PaymentId,
    pub amount: Decimal,
    pub method: String,
    pub paid_at: DateTime<Utc>,
    pub transaction_ids: Vec<TransactionId>,
}

impl PaymentDto {
    pub fn new(payment: &Payment, transaction_ids: Vec<TransactionId>) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount,
            method: payment.method.clone(),
            paid_at: payment.paid_at,
            transaction_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionTypeDto {
    pub id: TransactionTypeId,
    pub kind: TransactionKind,
    pub label: String,
}

impl From<&TransactionType> for TransactionTypeDto {
    fn from(row: &TransactionType) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            label: row.kind.label().to_string(),
        }
    }
}
