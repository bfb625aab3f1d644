// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session state.
//!
//! A [`Session`] is the single authoritative description of "is a wallet
//! connected, to which account, on which network, with what balances". It is
//! process-local and never persisted; the persistence service only ever sees
//! wallet registrations and transaction records. The
//! [`manager::WalletSessionManager`] is the session's only writer; everyone
//! else observes cloned snapshots.

pub mod manager;
pub mod poller;

use serde::Serialize;

pub use manager::WalletSessionManager;
pub use poller::BalancePoller;

/// Last fetched balances, fixed display precision.
///
/// Absence of data is a zero-string, not an error state: the UI renders
/// "0.00" until the first successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balances {
    /// USDT balance, 2 decimal places.
    pub usdt: String,
    /// BNB balance, 4 decimal places.
    pub bnb: String,
}

impl Default for Balances {
    fn default() -> Self {
        Self {
            usdt: "0.00".to_string(),
            bnb: "0.0000".to_string(),
        }
    }
}

/// Snapshot of the wallet session.
///
/// Invariant: `account.is_some() == connected`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Session {
    /// Whether an account is associated with the session.
    pub connected: bool,
    /// Connected account in canonical lower-case form.
    pub account: Option<crate::models::WalletAddress>,
    /// Chain id last observed from the provider.
    pub chain_id: Option<u64>,
    /// Whether the observed chain matches the configured target network.
    pub expected_network: bool,
    /// Last fetched balances.
    pub balances: Balances,
    /// True while a connect (including network switch) is in flight.
    pub loading: bool,
}

/// Coarse classification of a session, for display and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    ConnectedWrongNetwork,
    ConnectedOk,
}

impl Session {
    pub fn state(&self) -> SessionState {
        match (self.connected, self.loading) {
            (false, true) => SessionState::Connecting,
            (false, false) => SessionState::Disconnected,
            (true, _) if self.expected_network => SessionState::ConnectedOk,
            (true, _) => SessionState::ConnectedWrongNetwork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_the_canonical_empty_one() {
        let session = Session::default();
        assert!(!session.connected);
        assert!(session.account.is_none());
        assert!(session.chain_id.is_none());
        assert!(!session.expected_network);
        assert_eq!(session.balances.usdt, "0.00");
        assert_eq!(session.balances.bnb, "0.0000");
        assert!(!session.loading);
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn state_classification() {
        let mut session = Session {
            loading: true,
            ..Session::default()
        };
        assert_eq!(session.state(), SessionState::Connecting);

        session.loading = false;
        session.connected = true;
        assert_eq!(session.state(), SessionState::ConnectedWrongNetwork);

        session.expected_network = true;
        assert_eq!(session.state(), SessionState::ConnectedOk);
    }
}
