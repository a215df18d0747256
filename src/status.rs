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

//! Transaction status values.
//!
//! Statuses travel over the wire as their French literals
//! (`"en attente"`, `"en cours"`, `"validée"`, `"annulée"`).

use crate::TransactionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "en attente")]
    Pending,
    #[serde(rename = "en cours")]
    InProgress,
    #[serde(rename = "validée")]
    Validated,
    #[serde(rename = "annulée")]
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Validated,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "en attente",
            Self::InProgress => "en cours",
            Self::Validated => "validée",
            Self::Cancelled => "annulée",
        }
    }

    /// Validated and cancelled transactions accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Validated | Self::Cancelled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = TransactionError;

    /// Parses a status case-insensitively.
    ///
    /// Accepts the French literals and their English names
    /// (`pending`, `in progress`/`in_progress`, `validated`, `cancelled`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en attente" | "pending" => Ok(Self::Pending),
            "en cours" | "in progress" | "in_progress" => Ok(Self::InProgress),
            "validée" | "validated" => Ok(Self::Validated),
            "annulée" | "cancelled" => Ok(Self::Cancelled),
            _ => Err(TransactionError::InvalidStatus(s.to_string())),
        }
    }
}
