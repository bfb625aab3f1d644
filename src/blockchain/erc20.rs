// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BEP-20/ERC-20 contract interface and token-unit helpers.

use alloy::{primitives::U256, sol};

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Errors from parsing a human-readable token amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("invalid amount format")]
    Format,

    #[error("too many decimal places (max {0})")]
    Precision(u8),

    #[error("amount overflow")]
    Overflow,
}

/// Parse a human-readable decimal amount into the token's smallest unit.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "10.5")
/// * `decimals` - Number of decimals (18 for BNB and BSC USDT)
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitError> {
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 {
        return Err(UnitError::Format);
    }

    let whole = parts[0].parse::<u128>().map_err(|_| UnitError::Format)?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.is_empty() {
            return Err(UnitError::Format);
        }
        if dec_str.len() > decimals as usize {
            return Err(UnitError::Precision(decimals));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded.parse::<u128>().map_err(|_| UnitError::Format)?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(UnitError::Overflow)?;

    Ok(U256::from(total))
}

/// Format a raw token amount with a fixed number of decimal places.
///
/// Truncates rather than rounds, so a displayed balance never exceeds the
/// on-chain one. Zero formats as `0.00..` with exactly `places` digits.
pub fn format_units_fixed(value: U256, decimals: u8, places: usize) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;

    if places == 0 {
        return whole.to_string();
    }

    let remainder = value % divisor;
    let frac = format!("{:0>width$}", remainder, width = decimals as usize);
    let frac = if frac.len() >= places {
        frac[..places].to_string()
    } else {
        format!("{:0<places$}", frac)
    };

    format!("{whole}.{frac}")
}
