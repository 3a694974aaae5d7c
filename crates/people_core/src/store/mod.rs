//! Storage collaborators.
//!
//! The handler depends on any `tower::Service` speaking
//! [`StoreRequest`](crate::people::api::StoreRequest). This module ships an
//! in-memory document store used by the server binary and by tests; a
//! database-backed store only has to implement the same protocol.

pub mod memory;
