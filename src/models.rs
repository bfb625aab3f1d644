// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Core Data Models
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters) in their canonical lower-case form. Every address that
//! enters the session - from the provider, from user input, from the
//! persistence service - goes through [`WalletAddress::parse`], so the same
//! on-chain account can never appear under two spellings.

use serde::{Deserialize, Serialize};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Canonical lower-case wallet address.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes). Comparison
/// is case-insensitive by construction: parsing lower-cases the input.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12")?;
/// assert_eq!(addr.as_str(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

/// Error returned when a string is not a syntactically valid address.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid wallet address: {0:?}")]
pub struct InvalidAddress(pub String);

impl WalletAddress {
    /// Parse and normalize an address.
    ///
    /// Accepts any hex casing (including an upper-case `0X` prefix) and
    /// stores the lower-case form. Normalizing an already-normalized address
    /// is a no-op.
    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        let normalized = raw.to_ascii_lowercase();
        let hex = normalized
            .strip_prefix("0x")
            .ok_or_else(|| InvalidAddress(raw.to_string()))?;

        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidAddress(raw.to_string()));
        }

        Ok(WalletAddress(normalized))
    }

    /// The canonical lower-case string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WalletAddress::parse(&value)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletAddress::parse(s)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}
