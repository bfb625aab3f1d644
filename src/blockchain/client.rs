// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The `ChainClient` seam.
//!
//! The session manager never talks to a provider directly; it is constructed
//! with a [`ChainClient`] instance. The production implementation
//! ([`super::RpcChainClient`]) delegates to an EVM JSON-RPC endpoint through
//! alloy; tests substitute an in-memory double.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use alloy::primitives::U256;
use async_trait::async_trait;

use super::types::NetworkConfig;
use crate::models::WalletAddress;

/// Notification pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of authorized accounts changed. Empty means the user locked
    /// or disconnected the wallet on the provider side.
    AccountsChanged(Vec<String>),
    /// The active chain changed.
    ChainChanged,
}

/// Errors surfaced by a chain client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainClientError {
    #[error("no wallet provider available")]
    NoProvider,

    #[error("no authorized accounts")]
    NoAccounts,

    #[error("request rejected by user")]
    UserRejected,

    #[error("chain {0} is not known to the provider")]
    UnrecognizedChain(u64),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

/// Capability seam over the wallet provider and chain RPC.
///
/// `send_token` transfers the application's primary token (USDT); the
/// contract address is resolved from the client's active network.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Accounts already authorized for this session, without prompting.
    async fn authorized_accounts(&self) -> Result<Vec<String>, ChainClientError>;

    /// Request account access; may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<String>, ChainClientError>;

    /// The provider's current chain id.
    async fn chain_id(&self) -> Result<u64, ChainClientError>;

    /// Switch the provider to the given chain.
    ///
    /// Fails with [`ChainClientError::UnrecognizedChain`] when the provider
    /// does not know the chain; the caller registers the network definition
    /// with [`ChainClient::register_chain`] and retries.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ChainClientError>;

    /// Register a network definition with the provider.
    async fn register_chain(&self, network: &NetworkConfig) -> Result<(), ChainClientError>;

    /// Native coin balance in wei.
    async fn native_balance(&self, address: &WalletAddress) -> Result<U256, ChainClientError>;

    /// Primary token balance in the token's smallest unit.
    async fn token_balance(&self, address: &WalletAddress) -> Result<U256, ChainClientError>;

    /// Submit a token transfer and return the transaction hash.
    async fn send_token(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: U256,
    ) -> Result<String, ChainClientError>;

    /// Subscribe to provider events. Dropping the subscription deregisters it.
    fn subscribe(&self) -> EventSubscription;
}

type SubscriberList = Mutex<Vec<(u64, tokio::sync::mpsc::UnboundedSender<ProviderEvent>)>>;

/// Fan-out registry distributing [`ProviderEvent`]s to subscribers.
///
/// Subscriptions deregister themselves on drop, so a reconnect cycle can
/// never accumulate duplicate handlers.
#[derive(Default)]
pub struct EventRegistry {
    subscribers: Arc<SubscriberList>,
    next_id: AtomicU64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> EventSubscription {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, tx));
        EventSubscription {
            id,
            rx,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Deliver an event to every live subscriber.
    pub fn emit(&self, event: ProviderEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle to a provider-event subscription.
///
/// Receives events in provider emission order. Dropping the handle removes
/// the subscriber from the registry on every exit path, including panics in
/// the consuming task.
pub struct EventSubscription {
    id: u64,
    rx: tokio::sync::mpsc::UnboundedReceiver<ProviderEvent>,
    registry: Weak<SubscriberList>,
}

impl EventSubscription {
    /// Wait for the next event; `None` once the registry is gone.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_reaches_all_subscribers_in_order() {
        let registry = EventRegistry::new();
        let mut a = registry.subscribe();
        let mut b = registry.subscribe();

        registry.emit(ProviderEvent::ChainChanged);
        registry.emit(ProviderEvent::AccountsChanged(vec!["0xabc".into()]));

        for sub in [&mut a, &mut b] {
            assert_eq!(sub.recv().await, Some(ProviderEvent::ChainChanged));
            assert_eq!(
                sub.recv().await,
                Some(ProviderEvent::AccountsChanged(vec!["0xabc".into()]))
            );
        }
    }

    #[tokio::test]
    async fn dropping_a_subscription_deregisters_it() {
        let registry = EventRegistry::new();
        let a = registry.subscribe();
        let _b = registry.subscribe();
        assert_eq!(registry.subscriber_count(), 2);

        drop(a);
        assert_eq!(registry.subscriber_count(), 1);

        // Emitting after the drop must not panic or deliver to the dead
        // subscriber.
        registry.emit(ProviderEvent::ChainChanged);
        assert_eq!(registry.subscriber_count(), 1);
    }
}
