// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for BNB Smart Chain.
//!
//! This module provides:
//! - The [`ChainClient`] seam the session manager is built against
//! - An alloy-backed implementation querying BNB/USDT balances and
//!   submitting USDT transfers over JSON-RPC
//! - Static network and token configuration

pub mod client;
pub mod erc20;
pub mod rpc;
pub mod types;

pub use client::{ChainClient, ChainClientError, EventRegistry, EventSubscription, ProviderEvent};
pub use rpc::RpcChainClient;
pub use types::*;
