// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Session Manager
//!
//! Owns the single authoritative [`Session`] and keeps it consistent with
//! the wallet provider: connect/disconnect requests, provider account and
//! chain changes, and the periodic balance refresh all funnel through here.
//! Collaborators are injected at construction; there are no module-level
//! singletons.
//!
//! ## Writer model
//!
//! The manager is the session's only writer. Mutations go through
//! `watch::Sender::send_modify`; readers hold `watch::Receiver`s and observe
//! cloned snapshots. Independent operations may interleave (a periodic
//! refresh while a transfer is in flight) - balance reads are idempotent and
//! transfers never depend on displayed balances.
//!
//! ## Staleness
//!
//! In-flight provider calls cannot be cancelled. A `disconnect()` racing a
//! pending `connect()` bumps the session generation; the stale completion
//! observes the bump and is discarded without touching the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::poller::BalancePoller;
use super::{Balances, Session};
use crate::blockchain::erc20::{format_units_fixed, parse_units};
use crate::blockchain::{ChainClient, ChainClientError, NetworkConfig, ProviderEvent, USDT_TOKEN};
use crate::config::DEFAULT_REFRESH_INTERVAL;
use crate::error::SessionError;
use crate::models::WalletAddress;
use crate::notify::{Notice, Notifier};
use crate::persistence::{NewTransaction, NewWallet, PersistenceApi, TxKind, TxStatus};

/// Delay before the fire-and-forget balance refresh after a transfer.
/// Confirmation latency is unbounded, so the session never awaits it.
const POST_TRANSFER_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// The session's single writer.
pub struct WalletSessionManager<C, P> {
    chain: Arc<C>,
    persistence: Arc<P>,
    notifier: Arc<dyn Notifier>,
    target: NetworkConfig,
    refresh_interval: Duration,
    session: watch::Sender<Session>,
    /// Bumped on every disconnect; stale completions compare and discard.
    generation: AtomicU64,
    /// Cancellation token of the running balance poller, if any.
    refresh_task: Mutex<Option<CancellationToken>>,
    weak: Weak<Self>,
}

impl<C, P> WalletSessionManager<C, P>
where
    C: ChainClient + 'static,
    P: PersistenceApi + 'static,
{
    /// Create a manager with the default 30 s refresh interval.
    pub fn new(
        chain: Arc<C>,
        persistence: Arc<P>,
        notifier: Arc<dyn Notifier>,
        target: NetworkConfig,
    ) -> Arc<Self> {
        Self::with_refresh_interval(chain, persistence, notifier, target, DEFAULT_REFRESH_INTERVAL)
    }

    /// Create a manager with an explicit refresh interval.
    pub fn with_refresh_interval(
        chain: Arc<C>,
        persistence: Arc<P>,
        notifier: Arc<dyn Notifier>,
        target: NetworkConfig,
        refresh_interval: Duration,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            chain,
            persistence,
            notifier,
            target,
            refresh_interval,
            session: watch::Sender::new(Session::default()),
            generation: AtomicU64::new(0),
            refresh_task: Mutex::new(None),
            weak: weak.clone(),
        })
    }

    /// Watch session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// The current session snapshot.
    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Resume a prior connection if the provider already authorizes one.
    ///
    /// Never fails: without a provider or an authorized account the session
    /// simply stays at its empty default.
    pub async fn resume_if_available(&self) {
        let accounts = match self.chain.authorized_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                debug!(error = %err, "no existing wallet session to resume");
                return;
            }
        };

        let Some(first) = accounts.first() else {
            return;
        };
        let account = match WalletAddress::parse(first) {
            Ok(account) => account,
            Err(err) => {
                warn!(error = %err, "provider reported an unparseable account");
                return;
            }
        };

        self.session.send_modify(|s| {
            s.connected = true;
            s.account = Some(account.clone());
        });
        self.verify_network().await;
        self.refresh_balances().await;
        self.start_refresh_task();

        info!(account = %account, "resumed existing wallet session");
    }

    /// Request account access and bring the session up.
    ///
    /// On failure the session is left unconnected, exactly one notice is
    /// emitted, and the error is re-raised so callers can abort dependent
    /// actions.
    pub async fn connect(&self) -> Result<WalletAddress, SessionError> {
        self.session.send_modify(|s| s.loading = true);
        let generation = self.generation.load(Ordering::SeqCst);

        let result = self.connect_inner(generation).await;
        self.session.send_modify(|s| s.loading = false);

        match &result {
            Ok(account) => {
                info!(account = %account, "wallet connected");
                self.start_refresh_task();
                self.notifier.notify(Notice::info(
                    "Wallet Connected",
                    "Your wallet has been connected successfully.",
                ));
            }
            Err(err) => {
                if let Some(notice) = err.notice() {
                    self.notifier.notify(notice);
                }
            }
        }

        result
    }

    async fn connect_inner(&self, generation: u64) -> Result<WalletAddress, SessionError> {
        let accounts = self
            .chain
            .request_accounts()
            .await
            .map_err(classify_connect_error)?;

        // The user may have explicitly disconnected while the provider
        // prompt was open; that disconnect wins.
        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(SessionError::Superseded);
        }

        let first = accounts.first().ok_or(SessionError::NoAuthorizedAccount)?;
        let account =
            WalletAddress::parse(first).map_err(|e| SessionError::Provider(e.to_string()))?;

        self.session.send_modify(|s| {
            s.connected = true;
            s.account = Some(account.clone());
        });

        if !self.verify_network().await {
            if let Err(err) = self.switch_to_target().await {
                warn!(error = %err, "automatic network switch failed");
            }
            self.verify_network().await;
        }

        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(SessionError::Superseded);
        }

        self.register_wallet(&account).await;
        self.refresh_balances().await;

        Ok(account)
    }

    /// Reset the session to its empty default.
    ///
    /// Purely local - providers do not support programmatic disconnect. The
    /// balance poller is cancelled synchronously before the reset.
    pub fn disconnect(&self) {
        self.stop_refresh_task();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.session.send_replace(Session::default());

        info!("wallet disconnected");
        self.notifier.notify(Notice::info(
            "Wallet Disconnected",
            "Your wallet has been disconnected.",
        ));
    }

    /// Fetch and replace the displayed balances for the connected account.
    ///
    /// A no-op without an account. Read failures keep the previous balances;
    /// stale numbers beat a transient error surfaced to the user.
    pub async fn refresh_balances(&self) {
        let Some(account) = self.session.borrow().account.clone() else {
            return;
        };

        if let Err(err) = self.try_refresh(&account).await {
            warn!(error = %err, account = %account, "balance refresh failed");
        }
    }

    async fn try_refresh(&self, account: &WalletAddress) -> Result<(), SessionError> {
        let native = self
            .chain
            .native_balance(account)
            .await
            .map_err(|e| SessionError::BalanceReadFailed(e.to_string()))?;
        let token = self
            .chain
            .token_balance(account)
            .await
            .map_err(|e| SessionError::BalanceReadFailed(e.to_string()))?;

        let balances = Balances {
            usdt: format_units_fixed(token, USDT_TOKEN.decimals, 2),
            bnb: format_units_fixed(native, self.target.native_decimals, 4),
        };

        // Only apply if the account is still the one we fetched for; a
        // disconnect or account switch during the read wins.
        self.session.send_modify(|s| {
            if s.account.as_ref() == Some(account) {
                s.balances = balances;
            }
        });

        Ok(())
    }

    /// Compare the provider's chain against the configured target.
    ///
    /// Updates `chain_id` and `expected_network`; a failed read logs and
    /// reports a mismatch.
    pub async fn verify_network(&self) -> bool {
        match self.chain.chain_id().await {
            Ok(chain_id) => {
                let matches = chain_id == self.target.chain_id;
                self.session.send_modify(|s| {
                    s.chain_id = Some(chain_id);
                    s.expected_network = matches;
                });
                matches
            }
            Err(err) => {
                warn!(error = %err, "failed to read provider chain id");
                false
            }
        }
    }

    /// Provider notification: the authorized account set changed.
    pub async fn handle_accounts_changed(&self, accounts: Vec<String>) {
        let Some(first) = accounts.first() else {
            // Wallet locked or disconnected on the provider side.
            self.disconnect();
            return;
        };

        let next = match WalletAddress::parse(first) {
            Ok(account) => account,
            Err(err) => {
                warn!(error = %err, "ignoring unparseable account from provider");
                return;
            }
        };

        let current = self.session.borrow().account.clone();
        if current.as_ref() == Some(&next) {
            return;
        }

        info!(account = %next, "provider switched accounts");
        self.session.send_modify(|s| {
            s.connected = true;
            s.account = Some(next);
        });
        self.refresh_balances().await;
        self.start_refresh_task();
    }

    /// Provider notification: the active chain changed.
    pub async fn handle_chain_changed(&self) {
        self.verify_network().await;
    }

    /// Validate and submit a USDT transfer, then record it.
    ///
    /// Validation happens before any external call. A successful submission
    /// records the transaction as completed with the persistence service and
    /// schedules a deferred balance refresh rather than awaiting on-chain
    /// confirmation.
    pub async fn submit_transfer(&self, to: &str, amount: &str) -> Result<String, SessionError> {
        let result = self.submit_transfer_inner(to, amount).await;

        match &result {
            Ok(tx_hash) => {
                let preview = tx_hash.get(..10).unwrap_or(tx_hash.as_str());
                self.notifier.notify(Notice::info(
                    "Transaction Sent",
                    format!("Successfully sent {amount} USDT. Transaction hash: {preview}..."),
                ));
            }
            Err(err) => {
                if let Some(notice) = err.notice() {
                    self.notifier.notify(notice);
                }
            }
        }

        result
    }

    async fn submit_transfer_inner(
        &self,
        to: &str,
        amount: &str,
    ) -> Result<String, SessionError> {
        let from = {
            let session = self.session.borrow();
            session.connected.then(|| session.account.clone()).flatten()
        }
        .ok_or(SessionError::NotConnected)?;

        let recipient = WalletAddress::parse(to)
            .map_err(|_| SessionError::InvalidRecipientAddress(to.to_string()))?;

        let units = parse_units(amount, USDT_TOKEN.decimals)
            .map_err(|_| SessionError::InvalidAmount(amount.to_string()))?;
        if units.is_zero() {
            return Err(SessionError::InvalidAmount(amount.to_string()));
        }

        let tx_hash = self
            .chain
            .send_token(&from, &recipient, units)
            .await
            .map_err(|e| SessionError::TransferSubmissionFailed(e.to_string()))?;

        info!(
            tx_hash = %tx_hash,
            amount = %amount,
            to = %recipient,
            explorer = %self.target.explorer_tx_url(&tx_hash),
            "transfer submitted"
        );

        let record = NewTransaction {
            from_address: from.to_string(),
            to_address: recipient.to_string(),
            amount: amount.to_string(),
            tx_hash: tx_hash.clone(),
            status: TxStatus::Completed,
            kind: TxKind::Send,
        };
        if let Err(err) = self.persistence.record_transaction(&record).await {
            // The transfer is already final on-chain; the missing record is
            // an accepted inconsistency between chain state and the store.
            let err = SessionError::PersistenceWriteFailed(err.to_string());
            error!(error = %err, tx_hash = %tx_hash, "failed to record completed transfer");
        }

        self.schedule_post_transfer_refresh();

        Ok(tx_hash)
    }

    /// Pump provider events into the session until `shutdown` is triggered.
    ///
    /// The subscription guard is owned by the task and drops on every exit
    /// path, so reconnect cycles can never stack duplicate handlers.
    pub fn attach_provider_events(
        &self,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let mut subscription = self.chain.subscribe();
        let weak = self.weak.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = subscription.recv() => {
                        let Some(event) = event else { break };
                        let Some(manager) = weak.upgrade() else { break };
                        match event {
                            ProviderEvent::AccountsChanged(accounts) => {
                                manager.handle_accounts_changed(accounts).await;
                            }
                            ProviderEvent::ChainChanged => {
                                manager.handle_chain_changed().await;
                            }
                        }
                    }
                    _ = shutdown.cancelled() => break,
                }
            }
        })
    }

    async fn switch_to_target(&self) -> Result<(), SessionError> {
        let target = self.target.chain_id;
        match self.chain.switch_chain(target).await {
            Ok(()) => Ok(()),
            Err(ChainClientError::UnrecognizedChain(id)) => {
                // The provider does not know the chain yet: register the
                // definition and retry once.
                self.chain
                    .register_chain(&self.target)
                    .await
                    .map_err(|_| SessionError::UnrecognizedNetwork(id))?;
                self.chain
                    .switch_chain(target)
                    .await
                    .map_err(|_| SessionError::UnrecognizedNetwork(id))
            }
            Err(other) => Err(SessionError::Provider(other.to_string())),
        }
    }

    async fn register_wallet(&self, account: &WalletAddress) {
        let wallet = NewWallet {
            address: account.to_string(),
            is_active: true,
        };
        if let Err(err) = self.persistence.register_wallet(&wallet).await {
            let err = SessionError::PersistenceWriteFailed(err.to_string());
            warn!(error = %err, account = %account, "wallet registration failed");
        }
    }

    fn schedule_post_transfer_refresh(&self) {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            tokio::time::sleep(POST_TRANSFER_REFRESH_DELAY).await;
            if let Some(manager) = weak.upgrade() {
                manager.refresh_balances().await;
            }
        });
    }

    fn start_refresh_task(&self) {
        let mut slot = self.refresh_slot();
        if slot.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let poller = BalancePoller::new(self.weak.clone(), self.refresh_interval);
        tokio::spawn(poller.run(token.clone()));
        *slot = Some(token);
    }

    fn stop_refresh_task(&self) {
        if let Some(token) = self.refresh_slot().take() {
            token.cancel();
        }
    }

    fn refresh_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn refresh_task_active(&self) -> bool {
        self.refresh_slot().is_some()
    }
}

impl<C, P> Drop for WalletSessionManager<C, P> {
    fn drop(&mut self) {
        if let Some(token) = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

fn classify_connect_error(error: ChainClientError) -> SessionError {
    match error {
        ChainClientError::NoProvider => SessionError::NoProviderDetected,
        ChainClientError::NoAccounts => SessionError::NoAuthorizedAccount,
        ChainClientError::UserRejected => SessionError::ConnectionRejected,
        other => SessionError::Provider(other.to_string()),
    }
}
