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

//! Entities referenced by transactions and the lookups that resolve them.
//!
//! Users, books and payments are owned elsewhere; transactions only hold
//! their identifiers. The traits in this module are the narrow contract the
//! assembler and the marketplace need from whatever stores those entities.

use crate::TransactionError;
use crate::base::{BookId, PaymentId, TransactionId, TransactionTypeId, UserId};
use crate::transaction::{Transaction, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A listed book and the number of copies its owner still offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub owner: UserId,
    pub price: Decimal,
    pub quantity_available: u32,
    /// Transactions this book takes part in.
    pub transactions: BTreeSet<TransactionId>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: &str,
        author: &str,
        owner: UserId,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
            owner,
            price,
            quantity_available: quantity,
            transactions: BTreeSet::new(),
        }
    }

    pub fn available(&self) -> bool {
        self.quantity_available > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Decimal,
    pub method: String,
    pub paid_at: DateTime<Utc>,
}

pub trait UserDirectory: Send + Sync {
    fn find_user_by_id(&self, id: UserId) -> Option<User>;
}

pub trait TransactionTypeCatalog: Send + Sync {
    fn find_type_by_id(&self, id: TransactionTypeId) -> Option<TransactionType>;
}

pub trait BookCatalog: Send + Sync {
    /// Returns the books that exist among `ids`. Missing ids are skipped.
    fn find_books_by_ids(&self, ids: &[BookId]) -> Vec<Book>;
}

pub trait PaymentLedger: Send + Sync {
    fn find_payment_by_id(&self, id: PaymentId) -> Option<Payment>;
}

pub trait TransactionRepository: Send + Sync {
    fn find_transaction_by_id(&self, id: TransactionId) -> Option<Transaction>;

    /// Upserts a transaction and returns the stored copy.
    ///
    /// A transaction without an id gets a fresh one. A transaction that
    /// already exists is only replaced when its `version` matches the stored
    /// one.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ConcurrentModification`] - the stored version moved on.
    fn save(&self, transaction: Transaction) -> Result<Transaction, TransactionError>;
}
