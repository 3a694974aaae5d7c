use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeopleError {
    #[error("person not found")]
    NotFound,

    #[error("person must not be null")]
    MissingPerson,

    #[error("[{}]", .0.join(", "))]
    InvalidPerson(Vec<String>),

    #[error("failed to read person: {0}")]
    MalformedPayload(String),

    #[error("no route for {method} {path}")]
    NoRoute { method: String, path: String },

    #[error("invalid api base path: {0:?}")]
    InvalidApiBase(String),

    #[error("storage failure: {0}")]
    StoreFailure(String),

    #[error("internal people API error")]
    InternalPeopleError,
}

impl PeopleError {
    /// HTTP status rendered for this failure at the response boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::NoRoute { .. } => StatusCode::NOT_FOUND,
            Self::MissingPerson | Self::InvalidPerson(_) | Self::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidApiBase(_) | Self::StoreFailure(_) | Self::InternalPeopleError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Violation descriptions carried by a validation failure, empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::InvalidPerson(violations) => violations,
            _ => &[],
        }
    }
}
