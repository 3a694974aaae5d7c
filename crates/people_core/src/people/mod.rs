//! The `people` resource.
//!
//! This module contains the request-handling core of the service: routing a
//! request to an operation, validating and decoding the payload, orchestrating
//! the non-blocking interaction with the storage collaborator and mapping
//! storage outcomes to HTTP-level results.
//!
//! ## Components
//!
//! - **Entity**: [`core::person::Person`], an identifier and a name
//! - **Validator**: [`core::validation::PersonValidator`], a static rule table
//!   over person fields producing formatted violations
//! - **Handler**: [`api::handler::PersonHandler`], one pipeline per operation
//! - **Router**: [`api::router::PeopleRouter`], static `(method, path)` table
//!   and the single place where failures become status codes
//! - **Error Handling**: [`error::PeopleError`], the typed failures carried
//!   through every asynchronous chain
//!
//! ## Default Service Stack
//!
//! `PeopleApiDefaultStack<S>` is the router over the handler over a storage
//! collaborator `S`; [`init_people_api`] assembles it.
pub mod api;
pub mod core;
pub mod error;
pub mod infrastructure;

/// Standard people API stack parameterized by storage collaborator type.
pub type PeopleApiDefaultStack<S> = api::router::PeopleRouter<api::handler::PersonHandler<S>>;

/// Initialize the people API over a storage collaborator.
///
/// # Arguments
/// * `config` - API base path and related settings
/// * `store` - Storage collaborator speaking [`api::StoreRequest`]
///
/// # Returns
/// A router service ready to be served over HTTP or called directly
pub fn init_people_api<S>(
    config: infrastructure::config::PeopleConfig,
    store: S,
) -> PeopleApiDefaultStack<S>
where
    S: tower::Service<api::StoreRequest, Response = api::StoreResponse, Error = error::PeopleError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    let handler = api::handler::PersonHandler::new(store, config.clone());
    api::router::PeopleRouter::new(handler, config)
}
