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

//! State machine tests through the public API.
//!
//! Walks the full status table: every (current, requested) pair is either
//! applied with its timestamp or refused without touching the transaction.

use bookspot_ledger::{
    BookId, ManualClock, Transaction, TransactionError, TransactionStateMachine,
    TransactionStatus, TransactionTypeId, UserId,
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

/// Drives a fresh transaction into `status` through legal steps.
fn transaction_in(machine: &TransactionStateMachine, status: TransactionStatus) -> Transaction {
    use TransactionStatus::*;

    let mut tx = Transaction::pending(
        UserId(1),
        TransactionTypeId(1),
        BTreeSet::from([BookId(1)]),
        dec!(10),
        t0(),
    );
    let path: &[TransactionStatus] = match status {
        Pending => &[],
        InProgress => &[InProgress],
        Validated => &[InProgress, Validated],
        Cancelled => &[Cancelled],
    };
    for step in path {
        machine.transition(&mut tx, *step).unwrap();
    }
    tx
}

#[test]
fn transition_table() {
    use TransactionStatus::*;

    let expected = [
        (Pending, InProgress, true),
        (Pending, Validated, false),
        (Pending, Cancelled, true),
        (InProgress, Validated, true),
        (InProgress, Cancelled, true),
        (InProgress, InProgress, false),
        (Validated, Cancelled, false),
        (Validated, InProgress, false),
        (Cancelled, InProgress, false),
        (Cancelled, Validated, false),
        (Cancelled, Cancelled, true),
    ];

    for (current, requested, allowed) in expected {
        assert_eq!(
            TransactionStateMachine::is_allowed(current, requested),
            allowed,
            "{current} -> {requested}"
        );
    }
    for current in TransactionStatus::ALL {
        assert!(!TransactionStateMachine::is_allowed(current, Pending));
    }
}

#[test]
fn refused_transitions_change_nothing() {
    let clock = Arc::new(ManualClock::new(t0()));
    let machine = TransactionStateMachine::new(clock.clone());

    for current in TransactionStatus::ALL {
        for requested in TransactionStatus::ALL {
            if TransactionStateMachine::is_allowed(current, requested) {
                continue;
            }
            let mut tx = transaction_in(&machine, current);
            let before = tx.clone();
            clock.advance(TimeDelta::seconds(1));

            let result = machine.transition(&mut tx, requested).map(|tx| tx.clone());

            assert_eq!(
                result,
                Err(TransactionError::IllegalTransition { current, requested })
            );
            assert_eq!(tx, before);
        }
    }
}

#[test]
fn applied_transitions_stamp_the_clock() {
    let clock = Arc::new(ManualClock::new(t0()));
    let machine = TransactionStateMachine::new(clock.clone());

    let mut tx = transaction_in(&machine, TransactionStatus::Pending);
    clock.set(t0() + TimeDelta::hours(1));
    machine.update_status(&mut tx, "en cours").unwrap();
    clock.set(t0() + TimeDelta::hours(2));
    machine.update_status(&mut tx, "validée").unwrap();

    assert_eq!(tx.transaction_date(), t0());
    assert_eq!(tx.start_date(), Some(t0() + TimeDelta::hours(1)));
    assert_eq!(tx.end_date(), Some(t0() + TimeDelta::hours(2)));
}

#[test]
fn unparsable_status_is_reported_verbatim() {
    let machine = TransactionStateMachine::new(Arc::new(ManualClock::new(t0())));
    let mut tx = transaction_in(&machine, TransactionStatus::InProgress);

    let result = machine.update_status(&mut tx, "Done!").map(|tx| tx.clone());

    assert_eq!(result, Err(TransactionError::InvalidStatus("Done!".to_string())));
    assert_eq!(tx.status(), TransactionStatus::InProgress);
}
