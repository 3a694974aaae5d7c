//! Application-level settings shared by the router and the handler.
use crate::people::error::PeopleError;

/// Base path under which the `people` resource is exposed.
pub const DEFAULT_API_BASE: &str = "/api/people";

/// Configuration supplied by the surrounding application.
///
/// The API base is normalized to a single leading `/` and no trailing `/`,
/// so that `{base}` and `{base}/{id}` can be matched exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleConfig {
    api_base: String,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self { api_base: DEFAULT_API_BASE.to_string() }
    }
}

impl PeopleConfig {
    pub fn new(api_base: &str) -> Result<Self, PeopleError> {
        let trimmed = api_base.trim().trim_matches('/');
        if trimmed.is_empty() || trimmed.contains(['{', '}', '?', '#']) {
            return Err(PeopleError::InvalidApiBase(api_base.to_string()));
        }
        Ok(Self { api_base: format!("/{trimmed}") })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `Location` of a stored person.
    pub fn location(&self, id: &str) -> String {
        format!("{}/{}", self.api_base, id)
    }
}
