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

//! Error types for transaction assembly and status changes.

use crate::base::{BookId, TransactionId};
use crate::status::TransactionStatus;
use std::fmt;
use thiserror::Error;

/// The kind of entity a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    TransactionType,
    User,
    Book,
    Payment,
    Transaction,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TransactionType => "transaction type",
            Self::User => "user",
            Self::Book => "book",
            Self::Payment => "payment",
            Self::Transaction => "transaction",
        })
    }
}

/// Transaction processing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// A referenced user, type, book, payment or transaction does not exist
    #[error("{kind} {id} not found")]
    ReferenceNotFound { kind: ReferenceKind, id: u64 },

    /// The creation request is structurally invalid
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested status is not one of the known literals
    #[error("invalid status \"{0}\"")]
    InvalidStatus(String),

    /// The current status does not allow the requested one
    #[error("cannot change status from \"{current}\" to \"{requested}\"")]
    IllegalTransition {
        current: TransactionStatus,
        requested: TransactionStatus,
    },

    /// No copy of the book is left to reserve
    #[error("book {0} has no copies available")]
    BookUnavailable(BookId),

    /// Another writer saved the transaction since it was read
    #[error("transaction {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        id: TransactionId,
        expected: u64,
        found: u64,
    },

    /// Persistence failed for a reason the core does not classify
    #[error("storage error: {0}")]
    Storage(String),
}

impl TransactionError {
    pub fn not_found(kind: ReferenceKind, id: impl Into<u64>) -> Self {
        Self::ReferenceNotFound {
            kind,
            id: id.into(),
        }
    }
}
