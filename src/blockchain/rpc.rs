// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Alloy-backed [`ChainClient`] for BNB Smart Chain.
//!
//! Reads (chain id, balances) go through an HTTP provider; USDT transfers
//! are signed with a locally configured key, the server-side stand-in for
//! the browser wallet's signing capability. Network definitions registered
//! with [`RpcChainClient::register_chain`] can be switched to at runtime,
//! mirroring the `wallet_addEthereumChain` / `wallet_switchEthereumChain`
//! provider flow.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::client::{
    ChainClient, ChainClientError, EventRegistry, EventSubscription, ProviderEvent,
};
use super::erc20::IERC20;
use super::types::{NetworkConfig, USDT_TOKEN};
use crate::models::WalletAddress;

/// HTTP provider type (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// The network the client is currently pointed at.
struct ActiveNetwork {
    config: NetworkConfig,
    rpc_url: String,
    provider: HttpProvider,
}

/// JSON-RPC chain client with a local signing key.
pub struct RpcChainClient {
    /// Network definitions known to this client, switchable at runtime.
    networks: Mutex<Vec<NetworkConfig>>,
    active: RwLock<ActiveNetwork>,
    signer: Option<PrivateKeySigner>,
    events: EventRegistry,
}

impl RpcChainClient {
    /// Create a client pointed at `network` via `rpc_url`.
    ///
    /// `private_key` is a hex-encoded secp256k1 key (`0x` prefix optional);
    /// without one the client reports no authorized accounts.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        private_key: Option<&str>,
    ) -> Result<Self, ChainClientError> {
        let provider = build_provider(rpc_url)?;
        let signer = private_key.map(parse_signer).transpose()?;

        Ok(Self {
            networks: Mutex::new(vec![network.clone()]),
            active: RwLock::new(ActiveNetwork {
                config: network,
                rpc_url: rpc_url.to_string(),
                provider,
            }),
            signer,
            events: EventRegistry::new(),
        })
    }

    /// The signing account in canonical lower-case form, if configured.
    fn signer_account(&self) -> Option<String> {
        self.signer.as_ref().map(|s| format!("{:?}", s.address()))
    }

    async fn active_provider(&self) -> (HttpProvider, NetworkConfig) {
        let active = self.active.read().await;
        (active.provider.clone(), active.config.clone())
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn authorized_accounts(&self) -> Result<Vec<String>, ChainClientError> {
        Ok(self.signer_account().into_iter().collect())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ChainClientError> {
        match self.signer_account() {
            Some(account) => Ok(vec![account]),
            None => Err(ChainClientError::NoAccounts),
        }
    }

    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        let (provider, _) = self.active_provider().await;
        provider
            .get_chain_id()
            .await
            .map_err(|e| ChainClientError::Rpc(e.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ChainClientError> {
        let network = {
            let networks = self.networks.lock().unwrap_or_else(PoisonError::into_inner);
            networks
                .iter()
                .find(|n| n.chain_id == chain_id)
                .cloned()
                .ok_or(ChainClientError::UnrecognizedChain(chain_id))?
        };

        let provider = build_provider(network.rpc_url)?;
        {
            let mut active = self.active.write().await;
            active.rpc_url = network.rpc_url.to_string();
            active.config = network;
            active.provider = provider;
        }

        self.events.emit(ProviderEvent::ChainChanged);
        Ok(())
    }

    async fn register_chain(&self, network: &NetworkConfig) -> Result<(), ChainClientError> {
        let mut networks = self.networks.lock().unwrap_or_else(PoisonError::into_inner);
        if !networks.iter().any(|n| n.chain_id == network.chain_id) {
            networks.push(network.clone());
        }
        Ok(())
    }

    async fn native_balance(&self, address: &WalletAddress) -> Result<U256, ChainClientError> {
        let addr = to_alloy_address(address)?;
        let (provider, _) = self.active_provider().await;

        provider
            .get_balance(addr)
            .await
            .map_err(|e| ChainClientError::Rpc(e.to_string()))
    }

    async fn token_balance(&self, address: &WalletAddress) -> Result<U256, ChainClientError> {
        let addr = to_alloy_address(address)?;
        let (provider, config) = self.active_provider().await;

        let token_addr = token_address_on(config.chain_id)?;

        let contract = IERC20::new(token_addr, provider);
        contract
            .balanceOf(addr)
            .call()
            .await
            .map_err(|e| ChainClientError::Contract(e.to_string()))
    }

    async fn send_token(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: U256,
    ) -> Result<String, ChainClientError> {
        let signer = self
            .signer
            .clone()
            .ok_or(ChainClientError::NoAccounts)?;

        // The signing key is the only account this client can send from.
        let signer_account = format!("{:?}", signer.address());
        if from.as_str() != signer_account {
            return Err(ChainClientError::TransactionFailed(format!(
                "sender {from} does not match the active account {signer_account}"
            )));
        }

        let to_addr = to_alloy_address(to)?;
        let (config, rpc_url) = {
            let active = self.active.read().await;
            (active.config.clone(), active.rpc_url.clone())
        };

        let token_addr = token_address_on(config.chain_id)?;

        // Encode the transfer(to, amount) call
        let call = IERC20::transferCall {
            to: to_addr,
            amount,
        };
        let data = call.abi_encode();

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);

        let tx = TransactionRequest::default()
            .to(token_addr)
            .input(data.into());

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainClientError::TransactionFailed(e.to_string()))?;

        Ok(format!("{:?}", pending.tx_hash()))
    }

    fn subscribe(&self) -> EventSubscription {
        self.events.subscribe()
    }
}

fn to_alloy_address(address: &WalletAddress) -> Result<Address, ChainClientError> {
    Address::from_str(address.as_str())
        .map_err(|e| ChainClientError::InvalidAddress(e.to_string()))
}

/// Resolve the USDT contract on the given chain.
fn token_address_on(chain_id: u64) -> Result<Address, ChainClientError> {
    let raw = USDT_TOKEN.address_on(chain_id).ok_or_else(|| {
        ChainClientError::Contract(format!(
            "{} is not deployed on chain {}",
            USDT_TOKEN.symbol, chain_id
        ))
    })?;
    Address::from_str(raw).map_err(|e| ChainClientError::InvalidAddress(e.to_string()))
}

fn build_provider(rpc_url: &str) -> Result<HttpProvider, ChainClientError> {
    let url: url::Url = rpc_url
        .parse()
        .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

    Ok(ProviderBuilder::new().connect_http(url))
}

fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ChainClientError> {
    let hex = private_key.strip_prefix("0x").unwrap_or(private_key);
    let key_bytes = alloy::hex::decode(hex)
        .map_err(|e| ChainClientError::InvalidAddress(format!("invalid private key: {e}")))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainClientError::InvalidAddress(format!("invalid private key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{BSC_MAINNET, BSC_TESTNET};

    // Throwaway key (hardhat account #0); never funded on a real network.
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn client_with_key() -> RpcChainClient {
        RpcChainClient::new(BSC_MAINNET, BSC_MAINNET.rpc_url, Some(TEST_KEY)).unwrap()
    }

    #[tokio::test]
    async fn authorized_accounts_reports_signer_lower_cased() {
        let client = client_with_key();
        assert_eq!(
            client.authorized_accounts().await.unwrap(),
            vec![TEST_ACCOUNT.to_string()]
        );
        assert_eq!(
            client.request_accounts().await.unwrap(),
            vec![TEST_ACCOUNT.to_string()]
        );
    }

    #[tokio::test]
    async fn without_key_there_is_no_authorized_account() {
        let client = RpcChainClient::new(BSC_MAINNET, BSC_MAINNET.rpc_url, None).unwrap();
        assert!(client.authorized_accounts().await.unwrap().is_empty());
        assert!(matches!(
            client.request_accounts().await,
            Err(ChainClientError::NoAccounts)
        ));
    }

    #[test]
    fn rejects_malformed_private_key() {
        assert!(RpcChainClient::new(BSC_MAINNET, BSC_MAINNET.rpc_url, Some("zz")).is_err());
    }

    #[test]
    fn rejects_malformed_rpc_url() {
        assert!(matches!(
            RpcChainClient::new(BSC_MAINNET, "not a url", None),
            Err(ChainClientError::InvalidRpcUrl(_))
        ));
    }

    #[tokio::test]
    async fn switch_to_unregistered_chain_is_unrecognized() {
        let client = client_with_key();
        assert!(matches!(
            client.switch_chain(BSC_TESTNET.chain_id).await,
            Err(ChainClientError::UnrecognizedChain(97))
        ));
    }

    #[tokio::test]
    async fn register_then_switch_emits_chain_changed() {
        let client = client_with_key();
        let mut events = client.subscribe();

        client.register_chain(&BSC_TESTNET).await.unwrap();
        client.switch_chain(BSC_TESTNET.chain_id).await.unwrap();

        assert_eq!(events.recv().await, Some(ProviderEvent::ChainChanged));
        assert_eq!(
            client.active.read().await.config.chain_id,
            BSC_TESTNET.chain_id
        );
    }

    #[tokio::test]
    async fn send_token_rejects_foreign_sender_before_any_rpc() {
        let client = client_with_key();
        let from =
            WalletAddress::parse("0x742d35cc6634c0532925a3b844bc9e7595f4ab12").unwrap();
        let to = WalletAddress::parse(TEST_ACCOUNT).unwrap();

        let result = client.send_token(&from, &to, U256::from(1u64)).await;
        assert!(matches!(
            result,
            Err(ChainClientError::TransactionFailed(_))
        ));
    }
}
