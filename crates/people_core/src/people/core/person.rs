//! The single resource managed by the service.
use serde::{Deserialize, Serialize};

/// A person document.
///
/// `id` is assigned by the storage collaborator on first save and is absent
/// before creation. `name` is optional at the decoding level so that a missing
/// or `null` name reaches the validator instead of failing deserialization.
///
/// Values are never mutated in place: an update builds a new `Person` from the
/// path identifier and the incoming payload (see [`Person::identified`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Person {
    /// A person that has not been stored yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: Some(name.into()) }
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: Some(id.into()), name: Some(name.into()) }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the storage collaborator still has to assign an identifier.
    pub fn is_new(&self) -> bool {
        self.id().is_none_or(str::is_empty)
    }

    /// Rebinds the content of this person to `id`, discarding any identifier
    /// carried by the payload.
    pub fn identified(self, id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), name: self.name }
    }
}
