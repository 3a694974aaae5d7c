//! Constraint validation for incoming people.
//!
//! Field constraints are declared in a static rule table and evaluated in
//! declaration order by [`PersonValidator`]. Each violation is reported as
//! `"<Capitalized field> - <message>"`, e.g. `"Name - must not be null"`.
//!
//! Validation itself never fails: [`PersonValidator::validate`] returns the
//! (possibly empty) list of violations and [`PersonValidator::check`] turns a
//! non-empty list into [`PeopleError::InvalidPerson`].

use std::fmt;

use tracing::info;

use crate::people::{core::person::Person, error::PeopleError};

/// A declarative constraint on an optional string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The field must be present.
    NotNull,
    /// The field length, counted in characters, must lie in `min..=max`.
    /// Absent values are left to [`Constraint::NotNull`].
    Size { min: usize, max: usize },
}

impl Constraint {
    pub fn holds(&self, value: Option<&str>) -> bool {
        match *self {
            Self::NotNull => value.is_some(),
            Self::Size { min, max } => {
                value.is_none_or(|value| (min..=max).contains(&value.chars().count()))
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::NotNull => "must not be null".to_string(),
            Self::Size { min, max } => format!("size must be between {min} and {max}"),
        }
    }
}

/// A constraint bound to one field of [`Person`].
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub value: fn(&Person) -> Option<&str>,
    pub constraint: Constraint,
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("constraint", &self.constraint)
            .finish()
    }
}

/// Constraints declared on [`Person`].
pub const PERSON_RULES: &[FieldRule] = &[
    FieldRule { field: "name", value: Person::name, constraint: Constraint::NotNull },
    FieldRule {
        field: "name",
        value: Person::name,
        constraint: Constraint::Size { min: 1, max: 10 },
    },
];

#[derive(Debug, Clone)]
pub struct PersonValidator {
    rules: &'static [FieldRule],
}

impl Default for PersonValidator {
    fn default() -> Self {
        Self::new(PERSON_RULES)
    }
}

impl PersonValidator {
    pub fn new(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    /// Returns one formatted violation per failed rule, in rule order.
    pub fn validate(&self, person: &Person) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| !rule.constraint.holds((rule.value)(person)))
            .map(|rule| format!("{} - {}", capitalize(rule.field), rule.constraint.message()))
            .collect()
    }

    pub fn check(&self, person: &Person) -> Result<(), PeopleError> {
        let violations = self.validate(person);
        if violations.is_empty() {
            Ok(())
        } else {
            let error = PeopleError::InvalidPerson(violations);
            info!("[validation] person not valid -> {}", error);
            Err(error)
        }
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
