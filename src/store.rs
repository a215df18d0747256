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

//! Thread-safe in-memory persistence.
//!
//! The [`Store`] keeps every entity in a [`DashMap`] and implements all the
//! lookup traits from [`crate::catalog`]. Transactions are saved with a
//! compare-and-swap on their version so two concurrent writers can never
//! both apply a status change read from the same snapshot.
//!
//! A transaction saved with an id the store has never seen is an import. An
//! imported transaction that already started takes its copies the same way a
//! created one does, so cancelling it later gives back only what it took.

use crate::TransactionError;
use crate::base::{BookId, PaymentId, TransactionId, TransactionTypeId, UserId};
use crate::catalog::{
    Book, BookCatalog, Payment, PaymentLedger, TransactionRepository, TransactionTypeCatalog, User,
    UserDirectory,
};
use crate::error::ReferenceKind;
use crate::status::TransactionStatus;
use crate::transaction::{Transaction, TransactionType};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct Store {
    users: DashMap<UserId, User>,
    books: DashMap<BookId, Book>,
    payments: DashMap<PaymentId, Payment>,
    transaction_types: DashMap<TransactionTypeId, TransactionType>,
    transactions: DashMap<TransactionId, Transaction>,
    /// Highest transaction id handed out so far.
    last_transaction_id: AtomicU32,
    /// Serializes changes to book quantities across several books.
    reservations: Mutex<()>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_book(&self, book: Book) {
        self.books.insert(book.id, book);
    }

    pub fn insert_payment(&self, payment: Payment) {
        self.payments.insert(payment.id, payment);
    }

    /// Inserts a type row unless one with the same id exists.
    ///
    /// Returns `true` if the row was inserted.
    pub fn insert_transaction_type(&self, transaction_type: TransactionType) -> bool {
        match self.transaction_types.entry(transaction_type.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(transaction_type);
                true
            }
        }
    }

    pub fn book(&self, id: BookId) -> Option<Book> {
        self.books.get(&id).map(|book| book.value().clone())
    }

    pub fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.payments.get(&id).map(|payment| payment.value().clone())
    }

    /// All type rows ordered by id.
    pub fn transaction_types(&self) -> Vec<TransactionType> {
        let mut types: Vec<TransactionType> =
            self.transaction_types.iter().map(|row| *row.value()).collect();
        types.sort_by_key(|row| row.id);
        types
    }

    /// Snapshot of all transactions ordered by id.
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        transactions.sort_by_key(|tx| tx.id);
        transactions
    }

    pub fn transactions_with_status(&self, status: TransactionStatus) -> Vec<Transaction> {
        let mut transactions = self.transactions();
        transactions.retain(|tx| tx.status == status);
        transactions
    }

    /// Takes one copy of every book in `ids`.
    ///
    /// Either every book gets a copy taken or none does.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - a book does not exist.
    /// - [`TransactionError::BookUnavailable`] - a book has no copy left.
    pub fn reserve_books(&self, ids: &BTreeSet<BookId>) -> Result<(), TransactionError> {
        let _guard = self.reservations.lock();

        for id in ids {
            let book = self
                .books
                .get(id)
                .ok_or_else(|| TransactionError::not_found(ReferenceKind::Book, *id))?;
            if !book.available() {
                return Err(TransactionError::BookUnavailable(*id));
            }
        }

        for id in ids {
            if let Some(mut book) = self.books.get_mut(id) {
                book.quantity_available -= 1;
            }
        }

        Ok(())
    }

    /// Gives back one copy of every book in `ids`.
    pub fn release_books(&self, ids: &BTreeSet<BookId>) {
        let _guard = self.reservations.lock();

        for id in ids {
            if let Some(mut book) = self.books.get_mut(id) {
                book.quantity_available += 1;
            }
        }
    }

    /// Records `transaction_id` on the book's side of the association.
    ///
    /// Adding the same transaction twice is a no-op.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - the book does not exist.
    pub fn link_book(
        &self,
        book_id: BookId,
        transaction_id: TransactionId,
    ) -> Result<Book, TransactionError> {
        let mut book = self
            .books
            .get_mut(&book_id)
            .ok_or_else(|| TransactionError::not_found(ReferenceKind::Book, book_id))?;
        book.transactions.insert(transaction_id);
        Ok(book.value().clone())
    }

    fn next_transaction_id(&self) -> Result<TransactionId, TransactionError> {
        self.last_transaction_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .ok()
            .and_then(|last| last.checked_add(1))
            .map(TransactionId)
            .ok_or_else(|| TransactionError::Storage("transaction ids exhausted".to_string()))
    }
}

impl UserDirectory for Store {
    fn find_user_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|user| user.value().clone())
    }
}

impl TransactionTypeCatalog for Store {
    fn find_type_by_id(&self, id: TransactionTypeId) -> Option<TransactionType> {
        self.transaction_types.get(&id).map(|row| *row.value())
    }
}

impl BookCatalog for Store {
    fn find_books_by_ids(&self, ids: &[BookId]) -> Vec<Book> {
        ids.iter().filter_map(|id| self.book(*id)).collect()
    }
}

impl PaymentLedger for Store {
    fn find_payment_by_id(&self, id: PaymentId) -> Option<Payment> {
        self.payment(id)
    }
}

impl TransactionRepository for Store {
    fn find_transaction_by_id(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.get(&id).map(|tx| tx.value().clone())
    }

    fn save(&self, mut transaction: Transaction) -> Result<Transaction, TransactionError> {
        let Some(id) = transaction.id else {
            // Ids imported with an explicit value may already be taken.
            loop {
                let id = self.next_transaction_id()?;
                if let Entry::Vacant(entry) = self.transactions.entry(id) {
                    transaction.id = Some(id);
                    transaction.version = 1;
                    entry.insert(transaction.clone());
                    return Ok(transaction);
                }
            }
        };

        // Use entry API for atomic compare-and-swap on the version.
        match self.transactions.entry(id) {
            Entry::Occupied(mut entry) => {
                let found = entry.get().version;
                if found != transaction.version {
                    return Err(TransactionError::ConcurrentModification {
                        id,
                        expected: transaction.version,
                        found,
                    });
                }
                transaction.version += 1;
                entry.insert(transaction.clone());
                Ok(transaction)
            }
            Entry::Vacant(entry) => {
                let holds_copies = matches!(
                    transaction.status,
                    TransactionStatus::InProgress | TransactionStatus::Validated
                );
                if holds_copies {
                    self.reserve_books(&transaction.books)?;
                }
                for book_id in &transaction.books {
                    if let Some(mut book) = self.books.get_mut(book_id) {
                        book.transactions.insert(id);
                    }
                }

                self.last_transaction_id.fetch_max(id.0, Ordering::SeqCst);
                transaction.version += 1;
                entry.insert(transaction.clone());
                tracing::debug!(
                    transaction_id = %id,
                    status = %transaction.status,
                    "transaction imported"
                );
                Ok(transaction)
            }
        }
    }
}
