// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! REST client for the persistence service.

use async_trait::async_trait;
use serde::Deserialize;

use super::models::{AdminStats, NewTransaction, NewWallet, TransactionRecord, WalletRecord};
use crate::models::WalletAddress;

/// Errors from the persistence service.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("persistence API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// The persistence service's interface, as consumed by this crate.
#[async_trait]
pub trait PersistenceApi: Send + Sync {
    /// Register a wallet, or touch its activity if it already exists.
    async fn register_wallet(&self, wallet: &NewWallet)
        -> Result<WalletRecord, PersistenceError>;

    /// All wallet records, ordered by last activity.
    async fn wallets(&self) -> Result<Vec<WalletRecord>, PersistenceError>;

    /// Record a transfer.
    async fn record_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, PersistenceError>;

    /// Transactions where the address appears as sender or receiver.
    async fn transactions_for(
        &self,
        address: &WalletAddress,
    ) -> Result<Vec<TransactionRecord>, PersistenceError>;

    /// Aggregate counters from the admin surface.
    async fn admin_stats(&self) -> Result<AdminStats, PersistenceError>;
}

/// Error body the service returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `reqwest`-backed [`PersistenceApi`] implementation.
pub struct RestPersistence {
    http: reqwest::Client,
    base: String,
}

impl RestPersistence {
    /// Create a client against the service at `base` (scheme + host + port).
    pub fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Turn a non-success response into a typed error, preserving the
    /// service's `message` body when it sends one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PersistenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());

        Err(PersistenceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PersistenceApi for RestPersistence {
    async fn register_wallet(
        &self,
        wallet: &NewWallet,
    ) -> Result<WalletRecord, PersistenceError> {
        let response = self
            .http
            .post(self.endpoint("/api/wallets"))
            .json(wallet)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn wallets(&self) -> Result<Vec<WalletRecord>, PersistenceError> {
        let response = self.http.get(self.endpoint("/api/wallets")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn record_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, PersistenceError> {
        let response = self
            .http
            .post(self.endpoint("/api/transactions"))
            .json(transaction)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn transactions_for(
        &self,
        address: &WalletAddress,
    ) -> Result<Vec<TransactionRecord>, PersistenceError> {
        let response = self
            .http
            .get(self.endpoint("/api/transactions"))
            .query(&[("address", address.as_str())])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn admin_stats(&self) -> Result<AdminStats, PersistenceError> {
        let response = self
            .http
            .get(self.endpoint("/api/admin/stats"))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::models::{TxKind, TxStatus};

    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// In-memory stand-in for the persistence service.
    #[derive(Clone, Default)]
    struct Stub {
        wallets: Arc<Mutex<Vec<Value>>>,
        transactions: Arc<Mutex<Vec<Value>>>,
        reject_wallets: bool,
    }

    async fn create_wallet(
        State(stub): State<Stub>,
        Json(mut body): Json<Value>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        if stub.reject_wallets {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Invalid wallet data"})),
            ));
        }
        stub.wallets.lock().unwrap().push(body.clone());
        body["id"] = json!(1);
        body["lastActivity"] = json!("2026-08-07T10:00:00Z");
        body["createdAt"] = json!("2026-08-07T10:00:00Z");
        Ok(Json(body))
    }

    async fn create_transaction(
        State(stub): State<Stub>,
        Json(mut body): Json<Value>,
    ) -> Json<Value> {
        stub.transactions.lock().unwrap().push(body.clone());
        body["id"] = json!(7);
        body["createdAt"] = json!("2026-08-07T10:00:00Z");
        Json(body)
    }

    async fn list_transactions(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let address = params.get("address").cloned().unwrap_or_default();
        Json(json!([{
            "id": 1,
            "fromAddress": address,
            "toAddress": "0x000000000000000000000000000000000000dead",
            "amount": "1.0",
            "txHash": "0xfeed",
            "status": "completed",
            "type": "send",
            "createdAt": "2026-08-07T10:00:00Z",
        }]))
    }

    async fn admin_stats() -> Json<Value> {
        Json(json!({
            "connectedWallets": 2,
            "todayTransactions": 1,
            "activeUsers": 2,
            "totalTransactions": 9,
        }))
    }

    async fn list_wallets(State(stub): State<Stub>) -> Json<Value> {
        let wallets: Vec<Value> = stub
            .wallets
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let mut record = w.clone();
                record["id"] = json!(i as i64 + 1);
                record["lastActivity"] = json!("2026-08-07T10:00:00Z");
                record["createdAt"] = json!("2026-08-07T10:00:00Z");
                record
            })
            .collect();
        Json(json!(wallets))
    }

    async fn spawn_stub(stub: Stub) -> SocketAddr {
        let app = Router::new()
            .route("/api/wallets", post(create_wallet).get(list_wallets))
            .route("/api/transactions", post(create_transaction).get(list_transactions))
            .route("/api/admin/stats", get(admin_stats))
            .with_state(stub);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> RestPersistence {
        RestPersistence::new(&format!("http://{addr}"))
    }

    #[tokio::test]
    async fn record_transaction_sends_wire_exact_fields() {
        let stub = Stub::default();
        let addr = spawn_stub(stub.clone()).await;
        let client = client_for(addr);

        let record = client
            .record_transaction(&NewTransaction {
                from_address: "0xaaaa".into(),
                to_address: "0xbbbb".into(),
                amount: "10.5".into(),
                tx_hash: "0xhash".into(),
                status: TxStatus::Completed,
                kind: TxKind::Send,
            })
            .await
            .unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.amount, "10.5");
        assert_eq!(record.status, TxStatus::Completed);

        let sent = stub.transactions.lock().unwrap();
        assert_eq!(
            sent[0],
            json!({
                "fromAddress": "0xaaaa",
                "toAddress": "0xbbbb",
                "amount": "10.5",
                "txHash": "0xhash",
                "status": "completed",
                "type": "send",
            })
        );
    }

    #[tokio::test]
    async fn register_wallet_round_trips() {
        let stub = Stub::default();
        let addr = spawn_stub(stub.clone()).await;
        let client = client_for(addr);

        let record = client
            .register_wallet(&NewWallet {
                address: "0x742d35cc6634c0532925a3b844bc9e7595f4ab12".into(),
                is_active: true,
            })
            .await
            .unwrap();

        assert_eq!(record.address, "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
        assert!(record.is_active);
        assert_eq!(
            stub.wallets.lock().unwrap()[0],
            json!({"address": "0x742d35cc6634c0532925a3b844bc9e7595f4ab12", "isActive": true})
        );

        let listed = client.wallets().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].address, record.address);
    }

    #[tokio::test]
    async fn transactions_for_passes_the_address_as_query() {
        let addr = spawn_stub(Stub::default()).await;
        let client = client_for(addr);

        let address =
            WalletAddress::parse("0x742d35cc6634c0532925a3b844bc9e7595f4ab12").unwrap();
        let records = client.transactions_for(&address).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from_address, address.as_str());
        assert_eq!(records[0].kind, TxKind::Send);
    }

    #[tokio::test]
    async fn admin_stats_deserialize() {
        let addr = spawn_stub(Stub::default()).await;
        let client = client_for(addr);

        let stats = client.admin_stats().await.unwrap();
        assert_eq!(stats.connected_wallets, 2);
        assert_eq!(stats.total_transactions, 9);
    }

    #[tokio::test]
    async fn service_error_body_is_preserved() {
        let stub = Stub {
            reject_wallets: true,
            ..Stub::default()
        };
        let addr = spawn_stub(stub).await;
        let client = client_for(addr);

        let err = client
            .register_wallet(&NewWallet {
                address: "0xbad".into(),
                is_active: true,
            })
            .await
            .unwrap_err();

        match err {
            PersistenceError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid wallet data");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
