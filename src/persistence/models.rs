// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire models of the persistence service.
//!
//! Field names are bit-exact against the service's JSON schema (camelCase,
//! `type` for the transaction kind); addresses travel as plain strings and
//! are lower-cased by the writer before they reach the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted but not yet confirmed
    Pending,
    /// Confirmed on chain
    Completed,
    /// Failed or reverted
    Failed,
}

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Send,
    Receive,
    AdminSend,
    AdminCollect,
}

/// Payload for registering (or touching) a wallet.
///
/// Registration is idempotent by case-insensitive address; re-registering
/// refreshes the wallet's `lastActivity` on the service side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    pub address: String,
    pub is_active: bool,
}

/// A stored wallet record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub id: i64,
    pub address: String,
    pub is_active: bool,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub from_address: String,
    pub to_address: String,
    /// Human-readable decimal amount, exactly as the user entered it.
    pub amount: String,
    pub tx_hash: String,
    pub status: TxStatus,
    #[serde(rename = "type")]
    pub kind: TxKind,
}

/// A stored transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: i64,
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
    pub tx_hash: String,
    pub status: TxStatus,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters from the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Wallets ever registered
    pub connected_wallets: u64,
    /// Transactions recorded today
    pub today_transactions: u64,
    /// Wallets active within the last 24 hours
    pub active_users: u64,
    /// All transactions ever recorded
    pub total_transactions: u64,
}
