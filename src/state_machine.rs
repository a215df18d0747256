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

//! Status transitions.
//!
//! ```text
//!  Pending ──start──► InProgress ──validate──► Validated
//!     │                   │
//!     └─────cancel────────┴──────cancel──────► Cancelled ──cancel──┐
//!                                                  ▲               │
//!                                                  └───────────────┘
//! ```

use crate::TransactionError;
use crate::clock::Clock;
use crate::status::TransactionStatus;
use crate::transaction::Transaction;
use std::sync::Arc;

/// Validates requested status changes and stamps lifecycle dates.
///
/// | Requested | Allowed from | Effect |
/// |-----------|--------------|--------|
/// | InProgress | Pending | `start_date = now` |
/// | Validated | InProgress | `end_date = now` |
/// | Cancelled | Pending, InProgress, Cancelled | `end_date = now` |
///
/// Cancelling an already cancelled transaction is accepted and moves
/// `end_date` to the latest cancellation.
///
/// A transition either applies completely (status and date) or not at all.
/// Persisting the result is the caller's job.
pub struct TransactionStateMachine {
    clock: Arc<dyn Clock>,
}

impl TransactionStateMachine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Returns whether `requested` may follow `current`.
    pub fn is_allowed(current: TransactionStatus, requested: TransactionStatus) -> bool {
        use TransactionStatus::*;

        matches!(
            (current, requested),
            (Pending, InProgress)
                | (InProgress, Validated)
                | (Pending | InProgress | Cancelled, Cancelled)
        )
    }

    /// Applies a status given as free-form text.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidStatus`] - `requested` is not a known status.
    /// - [`TransactionError::IllegalTransition`] - the current status forbids it.
    pub fn update_status<'t>(
        &self,
        transaction: &'t mut Transaction,
        requested: &str,
    ) -> Result<&'t Transaction, TransactionError> {
        let requested = requested.parse::<TransactionStatus>()?;
        self.transition(transaction, requested)
    }

    /// Applies an already parsed status.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::IllegalTransition`] - the current status forbids it.
    pub fn transition<'t>(
        &self,
        transaction: &'t mut Transaction,
        requested: TransactionStatus,
    ) -> Result<&'t Transaction, TransactionError> {
        let current = transaction.status();
        if !Self::is_allowed(current, requested) {
            return Err(TransactionError::IllegalTransition { current, requested });
        }

        let now = self.clock.now();
        match requested {
            TransactionStatus::InProgress => transaction.start(now),
            TransactionStatus::Validated => transaction.validate(now),
            TransactionStatus::Cancelled => transaction.cancel(now),
            // Nothing leads back to pending; rejected above.
            TransactionStatus::Pending => {}
        }

        Ok(transaction)
    }
}
