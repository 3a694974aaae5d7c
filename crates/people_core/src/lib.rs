//! A non-blocking HTTP service for a single `people` resource.
//!
//! Requests are routed by [`people::api::router::PeopleRouter`] to one of five
//! handler operations (find all, find by id, delete by id, create, update). The
//! handler validates incoming payloads and orchestrates an asynchronous storage
//! collaborator, mapping its outcomes (found, absent, saved) to HTTP results.
//!
//! Every component is a [`tower::Service`], so the storage collaborator can be
//! swapped for any implementation of the [`people::api::StoreRequest`] protocol.
//! An in-memory document store is provided in [`store`], and [`transport`]
//! serves the router over HTTP with [`hyper`].
//!
//! [`hyper`]: https://docs.rs/hyper

#[cfg(test)]
pub mod tests;

pub mod people;
pub mod store;
pub mod transport;

#[cfg(feature = "people_tracing")]
pub mod people_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests
    /// This sets up a tracing subscriber that will display logs during test execution.
    /// Call this at the beginning of tests that need to see tracing output.
    pub fn init() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("off"))
                .unwrap();

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
