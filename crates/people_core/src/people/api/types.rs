//! People API type definitions.
//!
//! Two protocols are defined here:
//!
//! ## Handler API
//! [`PeopleRequest`] / [`PeopleResponse`] carry one handler operation each. The
//! router builds the request from the matched route and renders the response.
//!
//! ## Storage Collaborator API
//! [`StoreRequest`] / [`StoreResponse`] describe the asynchronous document store
//! the handler depends on: find-all, find-by-id, save, save-all, delete,
//! delete-all and count. Any `tower::Service` speaking this protocol with
//! [`PeopleError`] as its error type can back the handler.

use std::{fmt, pin::Pin};

use bytes::Bytes;
use futures::Stream;

use crate::people::{core::person::Person, error::PeopleError};

/// Lazily emitted sequence of people produced by the storage collaborator.
pub type PersonStream = Pin<Box<dyn Stream<Item = Result<Person, PeopleError>> + Send>>;

/// Body returned by a successful delete.
pub const DELETED_MESSAGE: &str = "successfully deleted!";

/// Undecoded request body.
///
/// Decoding is deferred to the handler operation so that preconditions that do
/// not depend on the body (e.g. the existence check of an update) are
/// evaluated first. A body that could not be read is kept as its read error
/// and reported the same way, on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Result<Bytes, String>);

impl Default for Payload {
    fn default() -> Self {
        Self(Ok(Bytes::new()))
    }
}

impl Payload {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(Ok(bytes.into()))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A body whose transfer failed or exceeded the size limit.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self(Err(reason.into()))
    }

    pub fn from_person(person: &Person) -> Result<Self, PeopleError> {
        serde_json::to_vec(person)
            .map(Self::new)
            .map_err(|e| PeopleError::MalformedPayload(e.to_string()))
    }

    /// Decodes the body as a JSON person.
    ///
    /// An empty body or the JSON literal `null` decode to `None`.
    pub fn decode(&self) -> Result<Option<Person>, PeopleError> {
        let bytes = self.0.as_ref().map_err(|e| PeopleError::MalformedPayload(e.clone()))?;
        let json = bytes.trim_ascii();
        if json.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice::<Option<Person>>(json)
            .map_err(|e| PeopleError::MalformedPayload(e.to_string()))
    }
}

/// Handler operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeopleRequest {
    /// `GET {base}`
    FindAll,
    /// `GET {base}/{id}`
    FindById(String),
    /// `DELETE {base}/{id}`
    DeleteById(String),
    /// `POST {base}`
    Create(Payload),
    /// `PUT {base}/{id}`
    Update {
        /// Identifier taken from the path, authoritative over any id in the payload
        id: String,
        payload: Payload,
    },
}

impl PeopleRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::FindAll => "findAll",
            Self::FindById(_) => "findById",
            Self::DeleteById(_) => "deleteById",
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
        }
    }
}

/// Successful handler outcomes.
pub enum PeopleResponse {
    /// 200, JSON array emitted from the stream
    All(PersonStream),
    /// 200, the person
    Found(Person),
    /// 200, JSON string message
    Deleted(String),
    /// 201, `Location` header plus the saved person
    Created { location: String, person: Person },
    /// 200, the saved person
    Updated(Person),
}

impl fmt::Debug for PeopleResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All(_) => f.write_str("All(..)"),
            Self::Found(person) => f.debug_tuple("Found").field(person).finish(),
            Self::Deleted(message) => f.debug_tuple("Deleted").field(message).finish(),
            Self::Created { location, person } => f
                .debug_struct("Created")
                .field("location", location)
                .field("person", person)
                .finish(),
            Self::Updated(person) => f.debug_tuple("Updated").field(person).finish(),
        }
    }
}

/// Storage collaborator requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    FindAll,
    FindById(String),
    /// Stores the person, assigning an id if it has none. Overwrites blindly.
    Save(Person),
    SaveAll(Vec<Person>),
    Delete(Person),
    DeleteAll,
    Count,
}

impl StoreRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FindAll => "findAll",
            Self::FindById(_) => "findById",
            Self::Save(_) => "save",
            Self::SaveAll(_) => "saveAll",
            Self::Delete(_) => "delete",
            Self::DeleteAll => "deleteAll",
            Self::Count => "count",
        }
    }
}

/// Storage collaborator responses.
pub enum StoreResponse {
    /// Answer to `FindAll`
    People(PersonStream),
    /// Answer to `FindById`, `None` when absent
    Person(Option<Person>),
    /// Answer to `Save`, with the assigned id
    Saved(Person),
    /// Answer to `SaveAll`, in request order
    SavedAll(Vec<Person>),
    /// Answer to `Count`
    Count(u64),
    /// Answer to `Delete` and `DeleteAll`
    Ack,
}

impl fmt::Debug for StoreResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::People(_) => f.write_str("People(..)"),
            Self::Person(person) => f.debug_tuple("Person").field(person).finish(),
            Self::Saved(person) => f.debug_tuple("Saved").field(person).finish(),
            Self::SavedAll(people) => f.debug_tuple("SavedAll").field(people).finish(),
            Self::Count(count) => f.debug_tuple("Count").field(count).finish(),
            Self::Ack => f.write_str("Ack"),
        }
    }
}
