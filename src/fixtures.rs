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

//! CSV loaders for the entities transactions point at.
//!
//! Each loader streams its input, trims every field and skips rows that do
//! not parse. Only a failing reader or a broken CSV structure is an error.

use crate::base::{BookId, PaymentId, UserId};
use crate::catalog::{Book, Payment, User};
use crate::store::Store;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

/// Fields: `id, name, email`
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: u64,
    name: String,
    email: String,
}

/// Fields: `id, title, author, owner, price, quantity`
#[derive(Debug, Deserialize)]
struct BookRecord {
    id: u64,
    title: String,
    author: String,
    owner: u64,
    price: Decimal,
    quantity: u32,
}

/// Fields: `id, amount, method, paid_at`
#[derive(Debug, Deserialize)]
struct PaymentRecord {
    id: u32,
    amount: Decimal,
    method: String,
    paid_at: DateTime<Utc>,
}

fn load<R, T>(reader: R, kind: &str, mut insert: impl FnMut(T)) -> Result<usize, csv::Error>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);

    let mut loaded = 0;
    for result in rdr.deserialize::<T>() {
        match result {
            Ok(record) => {
                insert(record);
                loaded += 1;
            }
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => tracing::warn!(kind, "skipping malformed row: {e}"),
        }
    }

    tracing::info!(kind, loaded, "fixtures loaded");
    Ok(loaded)
}

/// Loads users into `store`, returning how many rows were accepted.
///
/// # CSV Format
///
/// ```csv
/// id,name,email
/// 7,Alice,alice@example.com
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn load_users<R: Read>(store: &Store, reader: R) -> Result<usize, csv::Error> {
    load(reader, "user", |record: UserRecord| {
        store.insert_user(User {
            id: UserId(record.id),
            name: record.name,
            email: record.email,
        });
    })
}

/// Loads books into `store`.
///
/// # CSV Format
///
/// ```csv
/// id,title,author,owner,price,quantity
/// 3,Dune,Frank Herbert,1,12.75,2
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn load_books<R: Read>(store: &Store, reader: R) -> Result<usize, csv::Error> {
    load(reader, "book", |record: BookRecord| {
        store.insert_book(Book::new(
            BookId(record.id),
            &record.title,
            &record.author,
            UserId(record.owner),
            record.price,
            record.quantity,
        ));
    })
}

/// Loads payments into `store`. `paid_at` is RFC 3339.
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn load_payments<R: Read>(store: &Store, reader: R) -> Result<usize, csv::Error> {
    load(reader, "payment", |record: PaymentRecord| {
        store.insert_payment(Payment {
            id: PaymentId(record.id),
            amount: record.amount,
            method: record.method,
            paid_at: record.paid_at,
        });
    })
}
