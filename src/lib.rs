// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! USDT Session Core - BNB Smart Chain Wallet Session Service
//!
//! This crate owns the wallet-session state machine of the USDT transfer
//! application: one authoritative [`session::Session`] reconciled against
//! connect/disconnect requests, provider account and chain changes, and a
//! periodic balance refresh. Chain reads, signing, and transfer submission
//! are delegated to an EVM JSON-RPC endpoint; wallet and transaction records
//! are delegated to the REST persistence service.
//!
//! ## Modules
//!
//! - `blockchain` - BNB Smart Chain integration (ChainClient seam + alloy)
//! - `persistence` - Typed client for the REST persistence service
//! - `session` - Session state machine and balance synchronization
//! - `notify` - User notification seam

pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod session;
