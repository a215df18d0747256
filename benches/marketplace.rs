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

//! Benchmarks for the marketplace.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single-threaded creation and status changes
//! - Creation throughput
//! - Parallel creation over disjoint and shared books

use bookspot_ledger::{
    Book, BookId, CreateTransactionRequest, Marketplace, Store, SystemClock, TransactionStatus,
    TransactionTypeId, User, UserId, migrate,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rayon::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

/// Marketplace with one user and `books` books of `copies` copies each.
fn make_marketplace(books: u64, copies: u32) -> Marketplace {
    let store = Arc::new(Store::new());
    migrate(&store);
    store.insert_user(User {
        id: UserId(1),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    });
    for id in 1..=books {
        store.insert_book(Book::new(BookId(id), "Title", "Author", UserId(2), dec!(5), copies));
    }
    Marketplace::new(store, Arc::new(SystemClock))
}

fn make_request(book_ids: &[u64]) -> CreateTransactionRequest {
    CreateTransactionRequest {
        transaction_type_id: TransactionTypeId(1),
        price: dec!(5),
        user_id: UserId(1),
        book_ids: book_ids.iter().copied().map(BookId).collect(),
        payment_id: None,
    }
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_single_create(c: &mut Criterion) {
    let market = make_marketplace(1, u32::MAX);
    let request = make_request(&[1]);

    c.bench_function("single_create", |b| {
        b.iter(|| market.create_transaction(black_box(&request)).unwrap())
    });
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    let market = make_marketplace(3, u32::MAX);
    let request = make_request(&[1, 2, 3]);

    group.bench_function("create_validate", |b| {
        b.iter(|| {
            let tx = market.create_transaction(&request).unwrap();
            market
                .update_status(tx.id().unwrap(), black_box("validée"))
                .unwrap()
        })
    });

    group.bench_function("create_cancel", |b| {
        b.iter(|| {
            let tx = market.create_transaction(&request).unwrap();
            market
                .update_status(tx.id().unwrap(), black_box("annulée"))
                .unwrap()
        })
    });

    group.bench_function("refused_transition", |b| {
        let tx = market.create_transaction(&request).unwrap();
        let id = tx.id().unwrap();
        market.update_status(id, "validée").unwrap();
        b.iter(|| market.update_status(id, black_box("annulée")).unwrap_err())
    });

    group.finish();
}

fn bench_create_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_throughput");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let market = make_marketplace(10, u32::MAX);
                for i in 0..count {
                    let book = (i % 10) as u64 + 1;
                    market.create_transaction(&make_request(&[book])).unwrap();
                }
                black_box(market.transactions_with_status(TransactionStatus::InProgress));
            })
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_create_disjoint_books(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_create_disjoint_books");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let market = make_marketplace(count, 1);
                (1..=count).into_par_iter().for_each(|book| {
                    market.create_transaction(&make_request(&[book])).unwrap();
                });
                black_box(&market);
            })
        });
    }
    group.finish();
}

fn bench_parallel_create_shared_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_create_shared_book");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let market = make_marketplace(1, u32::MAX);
                (0..count).into_par_iter().for_each(|_| {
                    market.create_transaction(&make_request(&[1])).unwrap();
                });
                black_box(&market);
            })
        });
    }
    group.finish();
}

criterion_group!(single_threaded, bench_single_create, bench_lifecycle);

criterion_group!(throughput, bench_create_throughput);

criterion_group!(
    multi_threaded,
    bench_parallel_create_disjoint_books,
    bench_parallel_create_shared_book,
);

criterion_main!(single_threaded, throughput, multi_threaded);
