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

//! Transaction aggregate and transaction types.
//!
//! Transactions follow a state machine:
//! - [`Pending`] → [`InProgress`] (start)
//! - [`InProgress`] → [`Validated`] (validate)
//! - [`Pending`], [`InProgress`] or [`Cancelled`] → [`Cancelled`] (cancel)
//!
//! The only way to move between states is [`TransactionStateMachine`].
//!
//! [`Pending`]: TransactionStatus::Pending
//! [`InProgress`]: TransactionStatus::InProgress
//! [`Validated`]: TransactionStatus::Validated
//! [`Cancelled`]: TransactionStatus::Cancelled
//! [`TransactionStateMachine`]: crate::TransactionStateMachine

use crate::base::{BookId, PaymentId, TransactionId, TransactionTypeId, UserId};
use crate::status::TransactionStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The fixed set of transaction intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Purchase,
    Donation,
    ReceiveDonation,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 4] = [
        Self::Sale,
        Self::Purchase,
        Self::Donation,
        Self::ReceiveDonation,
    ];

    /// Stable row id used by the type catalog.
    pub fn id(&self) -> TransactionTypeId {
        match self {
            Self::Sale => TransactionTypeId(1),
            Self::Purchase => TransactionTypeId(2),
            Self::Donation => TransactionTypeId(3),
            Self::ReceiveDonation => TransactionTypeId(4),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sale => "vente",
            Self::Purchase => "achat",
            Self::Donation => "don",
            Self::ReceiveDonation => "réception de don",
        }
    }

    pub fn from_id(id: TransactionTypeId) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// A row of the transaction type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionType {
    pub id: TransactionTypeId,
    pub kind: TransactionKind,
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        Self { id: kind.id(), kind }
    }
}

/// A sale, purchase or donation of one or more books by a user.
///
/// # Invariants
///
/// - `start_date` is set once the transaction has been started.
/// - `end_date` is set iff the status is terminal.
/// - `version` grows by one on every successful save; `0` means never saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub(crate) id: Option<TransactionId>,
    pub(crate) user: UserId,
    pub(crate) transaction_type: TransactionTypeId,
    pub(crate) payment: Option<PaymentId>,
    pub(crate) books: BTreeSet<BookId>,
    pub(crate) price: Decimal,
    pub(crate) status: TransactionStatus,
    pub(crate) transaction_date: DateTime<Utc>,
    pub(crate) start_date: Option<DateTime<Utc>>,
    pub(crate) end_date: Option<DateTime<Utc>>,
    pub(crate) version: u64,
}

impl Transaction {
    /// Creates an unsaved transaction waiting to be started.
    pub fn pending(
        user: UserId,
        transaction_type: TransactionTypeId,
        books: BTreeSet<BookId>,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user,
            transaction_type,
            payment: None,
            books,
            price,
            status: TransactionStatus::Pending,
            transaction_date: now,
            start_date: None,
            end_date: None,
            version: 0,
        }
    }

    pub fn with_payment(mut self, payment: Option<PaymentId>) -> Self {
        self.payment = payment;
        self
    }

    pub fn id(&self) -> Option<TransactionId> {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn transaction_type(&self) -> TransactionTypeId {
        self.transaction_type
    }

    pub fn payment(&self) -> Option<PaymentId> {
        self.payment
    }

    pub fn books(&self) -> &BTreeSet<BookId> {
        &self.books
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn transaction_date(&self) -> DateTime<Utc> {
        self.transaction_date
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.end_date.is_some() == self.status.is_terminal(),
            "Invariant violated: end_date {:?} with status {}",
            self.end_date,
            self.status
        );
        debug_assert!(
            self.start_date.is_some() || self.status != TransactionStatus::InProgress,
            "Invariant violated: in-progress transaction without start_date"
        );
    }

    // Status and timestamp are always written together.

    pub(crate) fn start(&mut self, now: DateTime<Utc>) {
        self.status = TransactionStatus::InProgress;
        self.start_date = Some(now);
        self.assert_invariants();
    }

    pub(crate) fn validate(&mut self, now: DateTime<Utc>) {
        self.status = TransactionStatus::Validated;
        self.end_date = Some(now);
        self.assert_invariants();
    }

    pub(crate) fn cancel(&mut self, now: DateTime<Utc>) {
        self.status = TransactionStatus::Cancelled;
        self.end_date = Some(now);
        self.assert_invariants();
    }
}
