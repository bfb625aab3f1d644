// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Poller
//!
//! Background task that refreshes the connected account's balances on a
//! fixed interval. Runs only while the session is connected: the manager
//! spawns it on connect/resume and cancels its token synchronously on
//! disconnect and teardown. An orphaned poller is a resource leak, so the
//! token lives in the session's lifecycle, never detached.

use std::sync::Weak;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::manager::WalletSessionManager;
use crate::blockchain::ChainClient;
use crate::persistence::PersistenceApi;

/// Periodic balance refresher for a connected session.
///
/// Holds only a weak handle to the manager: the session owns the poller's
/// lifetime, not the other way around.
pub struct BalancePoller<C, P> {
    manager: Weak<WalletSessionManager<C, P>>,
    interval: Duration,
}

impl<C, P> BalancePoller<C, P>
where
    C: ChainClient + 'static,
    P: PersistenceApi + 'static,
{
    pub fn new(manager: Weak<WalletSessionManager<C, P>>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    /// Run the refresh loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(token.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        debug!(
            interval_secs = self.interval.as_secs(),
            "balance poller starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    debug!("balance poller stopping");
                    return;
                }
            }

            let Some(manager) = self.manager.upgrade() else {
                return;
            };
            manager.refresh_balances().await;
        }
    }
}
