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

//! # BookSpot Ledger
//!
//! This library tracks transactions of a second-hand book marketplace: sales,
//! purchases and donations of one or more books, each moving through a small
//! status lifecycle (en attente, en cours, validée, annulée).
//!
//! ## Core Components
//!
//! - [`TransactionAssembler`]: Resolves a creation request into a started transaction
//! - [`TransactionStateMachine`]: Legal status changes and their timestamps
//! - [`Marketplace`]: Service that saves transactions and keeps books in step
//! - [`Store`]: Thread-safe in-memory persistence with versioned saves
//! - [`TransactionError`]: Error types for assembly and status failures
//!
//! ## Example
//!
//! ```
//! use bookspot_ledger::{
//!     Book, BookId, CreateTransactionRequest, Marketplace, Store, SystemClock,
//!     TransactionStatus, TransactionTypeId, User, UserId, migrate,
//! };
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new());
//! migrate(&store);
//! store.insert_user(User {
//!     id: UserId(7),
//!     name: "Alice".to_string(),
//!     email: "alice@example.com".to_string(),
//! });
//! store.insert_book(Book::new(BookId(3), "Dune", "Frank Herbert", UserId(1), dec!(12.75), 1));
//!
//! let marketplace = Marketplace::new(store, Arc::new(SystemClock));
//! let request = CreateTransactionRequest {
//!     transaction_type_id: TransactionTypeId(1),
//!     price: dec!(12.75),
//!     user_id: UserId(7),
//!     book_ids: vec![BookId(3)],
//!     payment_id: None,
//! };
//!
//! let tx = marketplace.create_transaction(&request).unwrap();
//! assert_eq!(tx.status(), TransactionStatus::InProgress);
//!
//! let tx = marketplace.update_status(tx.id().unwrap(), "validée").unwrap();
//! assert!(tx.end_date().is_some());
//! ```
//!
//! ## Thread Safety
//!
//! The store shards entities across a `DashMap` and saves transactions with a
//! version check, so requests can be served in parallel.

mod assembler;
mod base;
pub mod catalog;
mod clock;
pub mod config;
pub mod dto;
pub mod error;
pub mod fixtures;
pub mod http;
mod marketplace;
mod migration;
mod state_machine;
mod status;
mod store;
mod transaction;

pub use assembler::{CreateTransactionRequest, TransactionAssembler};
pub use base::{BookId, PaymentId, TransactionId, TransactionTypeId, UserId};
pub use catalog::{
    Book, BookCatalog, Payment, PaymentLedger, TransactionRepository, TransactionTypeCatalog, User,
    UserDirectory,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{ReferenceKind, TransactionError};
pub use marketplace::Marketplace;
pub use migration::migrate;
pub use state_machine::TransactionStateMachine;
pub use status::TransactionStatus;
pub use store::Store;
pub use transaction::{Transaction, TransactionKind, TransactionType};
