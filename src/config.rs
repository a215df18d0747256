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

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// BookSpot ledger - Book marketplace transaction service
///
/// Serves the transaction API over HTTP. Users, books and payments can be
/// preloaded from CSV files.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "bookspot")]
#[command(about = "Book marketplace transaction service", long_about = None)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "BOOKSPOT_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Tracing filter directive, e.g. `info` or `bookspot_ledger=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    /// CSV file with users
    ///
    /// Expected format: id,name,email
    #[arg(long, value_name = "FILE")]
    pub users: Option<PathBuf>,

    /// CSV file with books
    ///
    /// Expected format: id,title,author,owner,price,quantity
    #[arg(long, value_name = "FILE")]
    pub books: Option<PathBuf>,

    /// CSV file with payments
    ///
    /// Expected format: id,amount,method,paid_at
    #[arg(long, value_name = "FILE")]
    pub payments: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_arguments() {
        let config = Config::try_parse_from([
            "bookspot",
            "--bind",
            "0.0.0.0:8080",
            "--log-filter",
            "debug",
            "--books",
            "books.csv",
        ])
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.books, Some(PathBuf::from("books.csv")));
        assert_eq!(config.users, None);
    }

    #[test]
    fn rejects_bad_bind_address() {
        assert!(Config::try_parse_from(["bookspot", "--bind", "not-an-address"]).is_err());
    }
}
