//! In-memory document store for people.
//!
//! Documents are kept in a shared [`DashMap`] keyed by id. Each document keeps
//! the sequence number of its first insertion so that `FindAll` yields people
//! in insertion order, and overwriting a document keeps its position.
use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    task::Poll,
};

use dashmap::DashMap;
use tower::Service;
use tracing::{debug, info};
use uuid::Uuid;

use crate::people::{
    api::types::{PersonStream, StoreRequest, StoreResponse},
    core::person::Person,
    error::PeopleError,
};

#[derive(Debug, Clone)]
struct Document {
    sequence: u64,
    person: Person,
}

/// Cloneable handle on a shared in-memory collection of people.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Arc<DashMap<String, Document>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store with `count` people named `person@<i>`.
    pub fn with_seeded_people(self, count: u32) -> Self {
        for i in 0..count {
            self.insert(Person::new(format!("person@{i}")));
        }
        if count > 0 {
            info!("[store] seeded {} people", count);
        }
        self
    }

    /// Saves a person, assigning a fresh id when it has none.
    ///
    /// Saving under an existing id overwrites the stored document.
    pub fn insert(&self, person: Person) -> Person {
        let person = if person.is_new() {
            person.identified(Uuid::new_v4().to_string())
        } else {
            person
        };
        let id = person.id().unwrap_or_default().to_string();
        self.documents
            .entry(id)
            .and_modify(|document| document.person = person.clone())
            .or_insert_with(|| Document {
                sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
                person: person.clone(),
            });
        person
    }

    pub fn get(&self, id: &str) -> Option<Person> {
        self.documents.get(id).map(|document| document.person.clone())
    }

    pub fn remove(&self, person: &Person) {
        if let Some(id) = person.id() {
            self.documents.remove(id);
        }
    }

    pub fn clear(&self) {
        self.documents.clear();
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Snapshot of the collection, emitted lazily in insertion order.
    fn find_all(&self) -> PersonStream {
        let mut documents: Vec<Document> =
            self.documents.iter().map(|entry| entry.value().clone()).collect();
        documents.sort_by_key(|document| document.sequence);
        Box::pin(tokio_stream::iter(documents.into_iter().map(|document| Ok(document.person))))
    }
}

impl Service<StoreRequest> for MemoryStore {
    type Response = StoreResponse;
    type Error = PeopleError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: StoreRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            debug!("[store] {}", request.kind());
            Ok(match request {
                StoreRequest::FindAll => StoreResponse::People(this.find_all()),
                StoreRequest::FindById(id) => StoreResponse::Person(this.get(&id)),
                StoreRequest::Save(person) => StoreResponse::Saved(this.insert(person)),
                StoreRequest::SaveAll(people) => StoreResponse::SavedAll(
                    people.into_iter().map(|person| this.insert(person)).collect(),
                ),
                StoreRequest::Delete(person) => {
                    this.remove(&person);
                    StoreResponse::Ack
                }
                StoreRequest::DeleteAll => {
                    this.clear();
                    StoreResponse::Ack
                }
                StoreRequest::Count => StoreResponse::Count(this.len() as u64),
            })
        })
    }
}
