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

//! Seeding of fixed reference rows.

use crate::store::Store;
use crate::transaction::{TransactionKind, TransactionType};

/// Seeds one transaction type row per [`TransactionKind`].
///
/// Safe to run on every start: existing rows are left alone. Returns how
/// many rows were inserted.
pub fn migrate(store: &Store) -> usize {
    let inserted = TransactionKind::ALL
        .into_iter()
        .filter(|kind| store.insert_transaction_type(TransactionType::from(*kind)))
        .count();

    tracing::info!(inserted, "transaction types seeded");
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionTypeId;
    use crate::catalog::TransactionTypeCatalog;

    #[test]
    fn seeds_every_kind() {
        let store = Store::new();

        assert_eq!(migrate(&store), 4);

        let sale = store.find_type_by_id(TransactionTypeId(1)).unwrap();
        assert_eq!(sale.kind, TransactionKind::Sale);
        assert_eq!(store.transaction_types().len(), 4);
    }

    #[test]
    fn running_twice_is_a_no_op() {
        let store = Store::new();
        migrate(&store);

        assert_eq!(migrate(&store), 0);
        assert_eq!(store.transaction_types().len(), 4);
    }
}
