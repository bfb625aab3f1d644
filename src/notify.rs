// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User notification seam.
//!
//! Every user-initiated operation that fails produces exactly one [`Notice`];
//! background work (the periodic balance refresh) never notifies. The
//! presentation layer supplies its own [`Notifier`] (a toast surface in the
//! browser build); the default [`LogNotifier`] routes notices to `tracing`.

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational (successful connect, disconnect, transfer).
    Info,
    /// A user-visible failure.
    Error,
}

/// A short user-facing notification: title plus human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(title: &'static str, description: impl Into<String>) -> Self {
        Self {
            title,
            description: description.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn error(title: &'static str, description: impl Into<String>) -> Self {
        Self {
            title,
            description: description.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that forwards notices to the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => {
                tracing::info!(title = notice.title, "{}", notice.description);
            }
            NoticeLevel::Error => {
                tracing::warn!(title = notice.title, "{}", notice.description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_level() {
        let info = Notice::info("Wallet Connected", "ok");
        assert_eq!(info.level, NoticeLevel::Info);
        assert_eq!(info.title, "Wallet Connected");

        let error = Notice::error("Connection Failed", "nope");
        assert_eq!(error.level, NoticeLevel::Error);
        assert_eq!(error.description, "nope");
    }
}
