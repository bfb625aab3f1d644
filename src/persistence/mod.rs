// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed client for the REST persistence service.
//!
//! The persistence service owns the relational store behind `/api/*`; this
//! module only invokes it. Wire formats are fixed by the service's schema
//! and must not drift.

pub mod client;
pub mod models;

pub use client::{PersistenceApi, PersistenceError, RestPersistence};
pub use models::*;
