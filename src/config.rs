// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BSC_RPC_URL` | JSON-RPC endpoint for BNB Smart Chain | Public BSC dataseed |
//! | `PERSISTENCE_API_URL` | Base URL of the REST persistence service | `http://127.0.0.1:5000` |
//! | `WALLET_PRIVATE_KEY` | Hex-encoded signing key (no 0x prefix); absent means no authorized account | Unset |
//! | `BALANCE_REFRESH_SECS` | Interval between periodic balance refreshes | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::time::Duration;

use crate::blockchain::BSC_MAINNET;

/// Environment variable name for the BNB Smart Chain RPC endpoint.
pub const RPC_URL_ENV: &str = "BSC_RPC_URL";

/// Environment variable name for the persistence service base URL.
pub const PERSISTENCE_URL_ENV: &str = "PERSISTENCE_API_URL";

/// Environment variable name for the hex-encoded signing key.
///
/// When unset the session has no authorized account: `resume` finds nothing
/// and `connect` fails the same way a locked browser wallet would.
pub const PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Environment variable name for the periodic balance refresh interval.
pub const REFRESH_SECS_ENV: &str = "BALANCE_REFRESH_SECS";

/// Environment variable name for the logging format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default base URL of the persistence service.
pub const DEFAULT_PERSISTENCE_URL: &str = "http://127.0.0.1:5000";

/// Default interval between periodic balance refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub rpc_url: String,
    pub persistence_url: String,
    pub private_key: Option<String>,
    pub refresh_interval: Duration,
}

impl SessionConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let refresh_interval = env::var(REFRESH_SECS_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);

        Self {
            rpc_url: env::var(RPC_URL_ENV).unwrap_or_else(|_| BSC_MAINNET.rpc_url.to_string()),
            persistence_url: env::var(PERSISTENCE_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_PERSISTENCE_URL.to_string()),
            private_key: env::var(PRIVATE_KEY_ENV).ok(),
            refresh_interval,
        }
    }
}
