//! Transports exposing the people API.

pub mod server;
