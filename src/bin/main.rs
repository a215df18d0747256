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

use bookspot_ledger::http::{self, AppState};
use bookspot_ledger::{Config, Marketplace, Store, SystemClock, fixtures, migrate};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type Loader = fn(&Store, BufReader<File>) -> Result<usize, csv::Error>;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(Store::new());
    migrate(&store);

    if let Some(path) = &config.users {
        load_fixture(&store, path, fixtures::load_users);
    }
    if let Some(path) = &config.books {
        load_fixture(&store, path, fixtures::load_books);
    }
    if let Some(path) = &config.payments {
        load_fixture(&store, path, fixtures::load_payments);
    }

    let state = AppState {
        marketplace: Arc::new(Marketplace::new(store, Arc::new(SystemClock))),
    };
    let app = http::router(state);

    let listener = match TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Error binding {}: {}", config.bind, e);
            process::exit(1);
        }
    };
    tracing::info!("BookSpot API server running on http://{}", config.bind);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        process::exit(1);
    }
}

fn load_fixture(store: &Store, path: &Path, loader: Loader) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Error opening file '{}': {}", path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = loader(store, BufReader::new(file)) {
        tracing::error!("Error loading '{}': {}", path.display(), e);
        process::exit(1);
    }
}
