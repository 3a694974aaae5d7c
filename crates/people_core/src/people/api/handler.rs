//! Handler operations for the `people` resource.
//!
//! `PersonHandler` implements one pipeline per [`PeopleRequest`]:
//!
//! - **findAll**: forwards the storage stream untouched
//! - **findById**: absent id fails with [`PeopleError::NotFound`]
//! - **deleteById**: existence check, then delete
//! - **create**: decode, null check, validation, then save
//! - **update**: existence check first, then decode, null check and
//!   validation of the payload, then save under the path id
//!
//! Every storage call is a suspension point; the first failure short-circuits
//! the remaining steps, so a rejected request never reaches `save`.

use std::{future::Future, pin::Pin, task::Poll};

use http::HeaderValue;
use tower::{Service, ServiceExt};
use tracing::{debug, info};

use crate::people::{
    api::types::{
        DELETED_MESSAGE, Payload, PeopleRequest, PeopleResponse, StoreRequest, StoreResponse,
    },
    core::{person::Person, validation::PersonValidator},
    error::PeopleError,
    infrastructure::config::PeopleConfig,
};

/// Handler service, generic over the storage collaborator `S`.
#[derive(Debug, Clone)]
pub struct PersonHandler<S> {
    /// Asynchronous document store owning all persisted state
    store: S,
    validator: PersonValidator,
    config: PeopleConfig,
}

impl<S> PersonHandler<S> {
    pub fn new(store: S, config: PeopleConfig) -> Self {
        Self { store, validator: PersonValidator::default(), config }
    }

    pub fn with_validator(mut self, validator: PersonValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Decodes and validates an incoming payload.
    fn accept(&self, payload: &Payload) -> Result<Person, PeopleError> {
        let person = payload.decode()?.ok_or(PeopleError::MissingPerson)?;
        self.validator.check(&person)?;
        Ok(person)
    }
}

impl<S> PersonHandler<S>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = PeopleError> + Send,
    S::Future: Send,
{
    async fn store_call(&mut self, request: StoreRequest) -> Result<StoreResponse, PeopleError> {
        debug!("[handler] store request: {}", request.kind());
        self.store.ready().await?.call(request).await
    }

    async fn find_existing(&mut self, id: String) -> Result<Person, PeopleError> {
        match self.store_call(StoreRequest::FindById(id)).await? {
            StoreResponse::Person(Some(person)) => Ok(person),
            StoreResponse::Person(None) => Err(PeopleError::NotFound),
            _ => Err(PeopleError::InternalPeopleError),
        }
    }

    async fn save(&mut self, person: Person) -> Result<Person, PeopleError> {
        match self.store_call(StoreRequest::Save(person)).await? {
            StoreResponse::Saved(person) => Ok(person),
            _ => Err(PeopleError::InternalPeopleError),
        }
    }

    async fn find_all(&mut self) -> Result<PeopleResponse, PeopleError> {
        match self.store_call(StoreRequest::FindAll).await? {
            StoreResponse::People(people) => Ok(PeopleResponse::All(people)),
            _ => Err(PeopleError::InternalPeopleError),
        }
    }

    async fn delete_by_id(&mut self, id: String) -> Result<PeopleResponse, PeopleError> {
        let person = self.find_existing(id).await?;
        match self.store_call(StoreRequest::Delete(person)).await? {
            StoreResponse::Ack => Ok(PeopleResponse::Deleted(DELETED_MESSAGE.to_string())),
            _ => Err(PeopleError::InternalPeopleError),
        }
    }

    async fn create(&mut self, payload: Payload) -> Result<PeopleResponse, PeopleError> {
        let person = self.accept(&payload)?;
        // A client-chosen id must fit the Location header before anything is written
        if let Some(id) = person.id()
            && HeaderValue::try_from(self.config.location(id)).is_err()
        {
            return Err(PeopleError::MalformedPayload(format!("id {id:?} is not addressable")));
        }
        let saved = self.save(person).await?;
        // A store that does not assign ids breaks the Location contract
        let location = match saved.id() {
            Some(id) if !id.is_empty() => self.config.location(id),
            _ => return Err(PeopleError::InternalPeopleError),
        };
        info!("[handler] created person at {}", location);
        Ok(PeopleResponse::Created { location, person: saved })
    }

    async fn update(&mut self, id: String, payload: Payload) -> Result<PeopleResponse, PeopleError> {
        // NotFound on the path id takes precedence over any payload failure
        self.find_existing(id.clone()).await?;
        let incoming = self.accept(&payload)?;
        let saved = self.save(incoming.identified(id)).await?;
        Ok(PeopleResponse::Updated(saved))
    }
}

impl<S> Service<PeopleRequest> for PersonHandler<S>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = PeopleError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = PeopleResponse;
    type Error = PeopleError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: PeopleRequest) -> Self::Future {
        let mut this = self.clone();
        Box::pin(async move {
            info!("[handler] {}", request.operation());
            match request {
                PeopleRequest::FindAll => this.find_all().await,
                PeopleRequest::FindById(id) => {
                    this.find_existing(id).await.map(PeopleResponse::Found)
                }
                PeopleRequest::DeleteById(id) => this.delete_by_id(id).await,
                PeopleRequest::Create(payload) => this.create(payload).await,
                PeopleRequest::Update { id, payload } => this.update(id, payload).await,
            }
        })
    }
}
