// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session error taxonomy.
//!
//! Validation errors (`NotConnected`, `InvalidRecipientAddress`,
//! `InvalidAmount`) are raised before any external call. Provider-origin
//! errors during connect are classified into distinct kinds so each carries
//! its own user-facing message. `BalanceReadFailed` and
//! `PersistenceWriteFailed` are logged and swallowed by the session manager;
//! they never reach the user.

use crate::notify::Notice;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet provider detected")]
    NoProviderDetected,

    #[error("no authorized account")]
    NoAuthorizedAccount,

    #[error("connection rejected by user")]
    ConnectionRejected,

    #[error("chain {0} is not recognized by the provider")]
    UnrecognizedNetwork(u64),

    #[error("wallet is not connected")]
    NotConnected,

    #[error("invalid recipient address: {0:?}")]
    InvalidRecipientAddress(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("transfer submission failed: {0}")]
    TransferSubmissionFailed(String),

    #[error("balance read failed: {0}")]
    BalanceReadFailed(String),

    #[error("persistence write failed: {0}")]
    PersistenceWriteFailed(String),

    #[error("provider error: {0}")]
    Provider(String),

    /// The session was disconnected while a request was in flight; the stale
    /// completion is discarded without touching the session or the user.
    #[error("session was disconnected while the request was in flight")]
    Superseded,
}

impl SessionError {
    /// The user-facing notice for this error, if it has one.
    ///
    /// Background failures (balance reads, persistence writes) and stale
    /// completions return `None` - they are logged, never surfaced.
    pub fn notice(&self) -> Option<Notice> {
        let notice = match self {
            Self::NoProviderDetected => Notice::error(
                "Connection Failed",
                "No wallet detected. Please install MetaMask or Trust Wallet.",
            ),
            Self::NoAuthorizedAccount => Notice::error(
                "Connection Failed",
                "No accounts found. Please unlock your wallet and try again.",
            ),
            Self::ConnectionRejected => Notice::error(
                "Connection Failed",
                "Connection rejected. Please connect your wallet to continue.",
            ),
            Self::UnrecognizedNetwork(chain_id) => Notice::error(
                "Wrong Network",
                format!("Your wallet does not recognize chain {chain_id}."),
            ),
            Self::NotConnected => {
                Notice::error("Wallet Not Connected", "Please connect your wallet first.")
            }
            Self::InvalidRecipientAddress(_) => Notice::error(
                "Invalid Address",
                "Please enter a valid recipient address.",
            ),
            Self::InvalidAmount(_) => Notice::error(
                "Invalid Amount",
                "Please enter a valid amount greater than 0.",
            ),
            Self::TransferSubmissionFailed(message) => {
                Notice::error("Transaction Failed", message.clone())
            }
            Self::Provider(message) => Notice::error("Connection Failed", message.clone()),
            Self::BalanceReadFailed(_) | Self::PersistenceWriteFailed(_) | Self::Superseded => {
                return None
            }
        };
        Some(notice)
    }
}
