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

//! Building transactions from creation requests.

use crate::TransactionError;
use crate::base::{BookId, PaymentId, TransactionTypeId, UserId};
use crate::catalog::{BookCatalog, PaymentLedger, TransactionTypeCatalog, UserDirectory};
use crate::clock::Clock;
use crate::error::ReferenceKind;
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Request body for creating a transaction.
///
/// ```json
/// {"transaction_type_id": 1, "price": "25.50", "user_id": 7, "book_ids": [3, 4]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub transaction_type_id: TransactionTypeId,
    pub price: Decimal,
    pub user_id: UserId,
    pub book_ids: Vec<BookId>,
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
}

/// Resolves the references of a creation request into an unsaved transaction.
pub struct TransactionAssembler {
    types: Arc<dyn TransactionTypeCatalog>,
    users: Arc<dyn UserDirectory>,
    books: Arc<dyn BookCatalog>,
    payments: Arc<dyn PaymentLedger>,
    clock: Arc<dyn Clock>,
}

impl TransactionAssembler {
    pub fn new(
        types: Arc<dyn TransactionTypeCatalog>,
        users: Arc<dyn UserDirectory>,
        books: Arc<dyn BookCatalog>,
        payments: Arc<dyn PaymentLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            types,
            users,
            books,
            payments,
            clock,
        }
    }

    /// Builds a started transaction from `request`.
    ///
    /// References are resolved in order: transaction type, user, books,
    /// payment. The first one that does not resolve is reported. The result
    /// is in progress with `start_date` set and has not been saved.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidRequest`] - empty or duplicated book ids, negative price.
    /// - [`TransactionError::ReferenceNotFound`] - a referenced entity does not exist.
    pub fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let books = unique_book_ids(&request.book_ids)?;
        if request.price < Decimal::ZERO {
            return Err(TransactionError::InvalidRequest(
                "price must not be negative".to_string(),
            ));
        }

        let transaction_type = self
            .types
            .find_type_by_id(request.transaction_type_id)
            .ok_or_else(|| {
                TransactionError::not_found(
                    ReferenceKind::TransactionType,
                    request.transaction_type_id,
                )
            })?;

        let user = self
            .users
            .find_user_by_id(request.user_id)
            .ok_or_else(|| TransactionError::not_found(ReferenceKind::User, request.user_id))?;

        let found: BTreeSet<BookId> = self
            .books
            .find_books_by_ids(&request.book_ids)
            .into_iter()
            .map(|book| book.id)
            .collect();
        if let Some(missing) = request.book_ids.iter().find(|id| !found.contains(*id)) {
            return Err(TransactionError::not_found(ReferenceKind::Book, *missing));
        }

        let payment = match request.payment_id {
            Some(id) => {
                let payment = self
                    .payments
                    .find_payment_by_id(id)
                    .ok_or_else(|| TransactionError::not_found(ReferenceKind::Payment, id))?;
                Some(payment.id)
            }
            None => None,
        };

        // Creation skips the pending state and starts right away.
        let now = self.clock.now();
        let mut transaction =
            Transaction::pending(user.id, transaction_type.id, books, request.price, now)
                .with_payment(payment);
        transaction.start(now);

        Ok(transaction)
    }
}

fn unique_book_ids(ids: &[BookId]) -> Result<BTreeSet<BookId>, TransactionError> {
    if ids.is_empty() {
        return Err(TransactionError::InvalidRequest(
            "at least one book is required".to_string(),
        ));
    }

    let mut unique = BTreeSet::new();
    for id in ids {
        if !unique.insert(*id) {
            return Err(TransactionError::InvalidRequest(format!(
                "book {id} is listed more than once"
            )));
        }
    }
    Ok(unique)
}
