//! Domain building blocks: the person entity and its validator.

pub mod person;
pub mod validation;
