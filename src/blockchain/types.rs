// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Native currency name
    pub native_name: &'static str,
    /// Native currency symbol
    pub native_symbol: &'static str,
    /// Native currency decimals
    pub native_decimals: u8,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

impl NetworkConfig {
    /// Block explorer URL for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// BNB Smart Chain mainnet configuration.
pub const BSC_MAINNET: NetworkConfig = NetworkConfig {
    name: "BNB Smart Chain",
    chain_id: 56,
    native_name: "BNB",
    native_symbol: "BNB",
    native_decimals: 18,
    rpc_url: "https://bsc-dataseed.binance.org",
    explorer_url: "https://bscscan.com",
};

/// BNB Smart Chain testnet (Chapel) configuration.
pub const BSC_TESTNET: NetworkConfig = NetworkConfig {
    name: "BNB Smart Chain Testnet",
    chain_id: 97,
    native_name: "BNB",
    native_symbol: "tBNB",
    native_decimals: 18,
    rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
    explorer_url: "https://testnet.bscscan.com",
};

/// Known BEP-20 token metadata.
#[derive(Debug, Clone)]
pub struct Erc20Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    /// Mainnet contract address
    pub mainnet_address: Option<&'static str>,
    /// Chapel testnet contract address
    pub testnet_address: Option<&'static str>,
}

impl Erc20Token {
    /// Contract address of this token on the given chain, if deployed there.
    pub fn address_on(&self, chain_id: u64) -> Option<&'static str> {
        match chain_id {
            id if id == BSC_MAINNET.chain_id => self.mainnet_address,
            id if id == BSC_TESTNET.chain_id => self.testnet_address,
            _ => None,
        }
    }
}

/// USDT (BEP-20). 18 decimals on BNB Smart Chain, unlike its 6-decimal
/// deployments elsewhere.
pub const USDT_TOKEN: Erc20Token = Erc20Token {
    symbol: "USDT",
    name: "Tether USD",
    decimals: 18,
    mainnet_address: Some("0x55d398326f99059fF775485246999027B3197955"),
    testnet_address: Some("0x337610d27c682E347C9cD60BD4b3b107C9d34dDd"),
};
