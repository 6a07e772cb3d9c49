// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ferry-core: Shared data model for the ferry client layer
//!
//! This crate provides the persisted records (credential pair, pending
//! operations, cache entries), the clock abstraction, and the durable local
//! store used by the `ferry` client crate.

pub mod clock;
pub mod error;
pub mod id;
pub mod jsonl;
pub mod model;
pub mod store;

pub use clock::{ClockSource, SystemClock};
pub use error::{Error, Result};
pub use id::OpId;
pub use model::{CacheEntry, CredentialPair, Destination, Method, OperationKind, PendingOperation};
pub use store::{LocalStore, Namespace};
