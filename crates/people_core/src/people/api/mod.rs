//! Request-handling pipeline for the `people` resource.
//!
//! - **Router**: maps `(method, path)` to a handler operation and renders
//!   handler outcomes and failures as HTTP responses
//! - **Handler**: one operation per HTTP verb, orchestrating validation and
//!   the storage collaborator
//! - **Types**: request/response enums spoken between these services and by
//!   the storage collaborator

pub mod handler;
pub mod router;
pub mod types;

// Re-export all types for convenience
pub use types::*;
