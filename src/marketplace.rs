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

//! Transaction service.
//!
//! The [`Marketplace`] is the central component that creates transactions,
//! drives their status and keeps the book side of the association in step.
//!
//! # Operations
//!
//! - **Create**: assemble from a request, reserve one copy per book, save.
//! - **Update status**: run the state machine and save conditionally on the
//!   version that was read.
//! - **Link**: record a transaction on a book without reloading the aggregate.
//!
//! # Book copies
//!
//! A copy of every book is taken when a transaction enters `InProgress` and
//! given back when that transaction is cancelled. Validation keeps the copy.
//! Cancelling a transaction that is already cancelled gives nothing back.
//!
//! # Thread Safety
//!
//! Every call is one unit of work against the shared [`Store`]. Concurrent
//! status changes on the same transaction race on its version: one wins, the
//! others get [`TransactionError::ConcurrentModification`].

use crate::TransactionError;
use crate::assembler::{CreateTransactionRequest, TransactionAssembler};
use crate::base::{BookId, PaymentId, TransactionId, UserId};
use crate::catalog::{Book, BookCatalog, Payment, TransactionRepository, UserDirectory};
use crate::clock::Clock;
use crate::error::ReferenceKind;
use crate::state_machine::TransactionStateMachine;
use crate::status::TransactionStatus;
use crate::store::Store;
use crate::transaction::{Transaction, TransactionType};
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct Marketplace {
    store: Arc<Store>,
    assembler: TransactionAssembler,
    state_machine: TransactionStateMachine,
}

impl Marketplace {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        let assembler = TransactionAssembler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            clock.clone(),
        );
        Self {
            store,
            assembler,
            state_machine: TransactionStateMachine::new(clock),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Creates, reserves and saves a transaction.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidRequest`] - empty or duplicated book ids, negative price.
    /// - [`TransactionError::ReferenceNotFound`] - type, user, book or payment is unknown.
    /// - [`TransactionError::BookUnavailable`] - a book has no copy left.
    pub fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let transaction = self.assembler.create_transaction(request).inspect_err(|e| {
            tracing::warn!(user_id = %request.user_id, "transaction rejected: {e}");
        })?;

        let books = transaction.books().clone();
        self.store.reserve_books(&books)?;
        let saved = match self.store.save(transaction) {
            Ok(saved) => saved,
            Err(e) => {
                self.store.release_books(&books);
                return Err(e);
            }
        };

        let id = self.saved_id(&saved)?;
        for book_id in &books {
            self.store.link_book(*book_id, id)?;
        }

        tracing::info!(
            transaction_id = %id,
            user_id = %saved.user(),
            books = books.len(),
            price = %saved.price(),
            "transaction created"
        );
        Ok(saved)
    }

    /// Moves a saved transaction to `requested`.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - no transaction with this id.
    /// - [`TransactionError::InvalidStatus`] - unknown status text.
    /// - [`TransactionError::IllegalTransition`] - the current status forbids it.
    /// - [`TransactionError::BookUnavailable`] - starting needs a copy that is gone.
    /// - [`TransactionError::ConcurrentModification`] - another update won the race.
    pub fn update_status(
        &self,
        id: TransactionId,
        requested: &str,
    ) -> Result<Transaction, TransactionError> {
        let mut transaction = self.transaction(id)?;
        let held_copies = transaction.status() == TransactionStatus::InProgress;

        if let Err(e) = self.state_machine.update_status(&mut transaction, requested) {
            tracing::warn!(transaction_id = %id, requested, "status change refused: {e}");
            return Err(e);
        }

        let books = transaction.books().clone();
        let starting = transaction.status() == TransactionStatus::InProgress;
        if starting {
            self.store.reserve_books(&books)?;
        }

        let saved = match self.store.save(transaction) {
            Ok(saved) => saved,
            Err(e) => {
                if let TransactionError::ConcurrentModification { .. } = e {
                    tracing::warn!(transaction_id = %id, "status change lost a race: {e}");
                }
                if starting {
                    self.store.release_books(&books);
                }
                return Err(e);
            }
        };

        if saved.status() == TransactionStatus::Cancelled && held_copies {
            self.store.release_books(&books);
        }

        tracing::info!(transaction_id = %id, status = %saved.status(), "status changed");
        Ok(saved)
    }

    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - no transaction with this id.
    pub fn transaction(&self, id: TransactionId) -> Result<Transaction, TransactionError> {
        self.store
            .find_transaction_by_id(id)
            .ok_or_else(|| TransactionError::not_found(ReferenceKind::Transaction, id))
    }

    /// All transactions ordered by id.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.transactions()
    }

    pub fn transactions_with_status(&self, status: TransactionStatus) -> Vec<Transaction> {
        self.store.transactions_with_status(status)
    }

    pub fn transaction_types(&self) -> Vec<TransactionType> {
        self.store.transaction_types()
    }

    /// Records `transaction_id` on the book without touching the
    /// transaction's own book set.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - book or transaction is unknown.
    pub fn add_book_to_transaction(
        &self,
        book_id: BookId,
        transaction_id: TransactionId,
    ) -> Result<Book, TransactionError> {
        self.store
            .book(book_id)
            .ok_or_else(|| TransactionError::not_found(ReferenceKind::Book, book_id))?;
        self.transaction(transaction_id)?;

        let book = self.store.link_book(book_id, transaction_id)?;
        tracing::debug!(%book_id, %transaction_id, "book linked to transaction");
        Ok(book)
    }

    /// Books that appear in any of the user's transactions, ordered by id.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - the user is unknown.
    pub fn books_for_user(&self, user_id: UserId) -> Result<Vec<Book>, TransactionError> {
        self.store
            .find_user_by_id(user_id)
            .ok_or_else(|| TransactionError::not_found(ReferenceKind::User, user_id))?;

        let ids: BTreeSet<BookId> = self
            .store
            .transactions()
            .into_iter()
            .filter(|tx| tx.user() == user_id)
            .flat_map(|tx| tx.books)
            .collect();
        let ids: Vec<BookId> = ids.into_iter().collect();

        Ok(self.store.find_books_by_ids(&ids))
    }

    /// A payment together with the transactions that reference it.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ReferenceNotFound`] - the payment is unknown.
    pub fn payment(
        &self,
        id: PaymentId,
    ) -> Result<(Payment, Vec<TransactionId>), TransactionError> {
        let payment = self
            .store
            .payment(id)
            .ok_or_else(|| TransactionError::not_found(ReferenceKind::Payment, id))?;

        let transaction_ids = self
            .store
            .transactions()
            .iter()
            .filter(|tx| tx.payment() == Some(id))
            .filter_map(Transaction::id)
            .collect();

        Ok((payment, transaction_ids))
    }

    fn saved_id(&self, transaction: &Transaction) -> Result<TransactionId, TransactionError> {
        transaction
            .id()
            .ok_or_else(|| TransactionError::Storage("saved transaction has no id".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TransactionTypeId;
    use crate::catalog::User;
    use crate::clock::ManualClock;
    use crate::migration::migrate;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn marketplace() -> Marketplace {
        let store = Arc::new(Store::new());
        migrate(&store);
        store.insert_user(User {
            id: UserId(1),
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
        });
        store.insert_book(Book::new(BookId(1), "Title", "Author", UserId(2), dec!(4), 1));
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        Marketplace::new(store, Arc::new(clock))
    }

    fn request() -> CreateTransactionRequest {
        CreateTransactionRequest {
            transaction_type_id: TransactionTypeId(1),
            price: dec!(4),
            user_id: UserId(1),
            book_ids: vec![BookId(1)],
            payment_id: None,
        }
    }

    #[test]
    fn failed_creation_reserves_nothing() {
        let market = marketplace();
        let mut req = request();
        req.book_ids.push(BookId(9));

        assert!(market.create_transaction(&req).is_err());
        assert_eq!(market.store().book(BookId(1)).unwrap().quantity_available, 1);
        assert!(market.transactions().is_empty());
    }

    #[test]
    fn repeated_cancel_releases_once() {
        let market = marketplace();
        let tx = market.create_transaction(&request()).unwrap();
        let id = tx.id().unwrap();

        market.update_status(id, "annulée").unwrap();
        assert_eq!(market.store().book(BookId(1)).unwrap().quantity_available, 1);

        let again = market.update_status(id, "annulée").unwrap();
        assert_eq!(again.status(), TransactionStatus::Cancelled);
        assert_eq!(again.version(), 3);
        assert_eq!(market.store().book(BookId(1)).unwrap().quantity_available, 1);
    }

    #[test]
    fn cancelling_a_pending_transaction_twice_releases_nothing() {
        let market = marketplace();
        let pending = Transaction::pending(
            UserId(1),
            TransactionTypeId(1),
            BTreeSet::from([BookId(1)]),
            dec!(4),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        let id = market.store().save(pending).unwrap().id().unwrap();

        market.update_status(id, "annulée").unwrap();
        market.update_status(id, "annulée").unwrap();

        assert_eq!(market.store().book(BookId(1)).unwrap().quantity_available, 1);
    }
}
