//! Greeting model and the request types that feed it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Message returned when a create/update body lacks a usable language or greeting.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Language and greeting are required fields";

/// A single greeting, exactly as stored on disk and returned over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Greeting {
    pub id: i64,
    pub language: String,
    pub greeting: String,
    pub formal: bool,
}

/// Check the record invariants over a whole collection: positive unique ids,
/// non-blank fields and case-insensitively unique languages.
pub fn check_collection(greetings: &[Greeting]) -> Result<(), String> {
    let mut ids = HashSet::new();
    let mut languages = HashSet::new();

    for record in greetings {
        if record.id <= 0 {
            return Err(format!("record has non-positive id {}", record.id));
        }
        if !ids.insert(record.id) {
            return Err(format!("duplicate id {}", record.id));
        }
        if record.language.trim().is_empty() || record.greeting.trim().is_empty() {
            return Err(format!("record {} has an empty language or greeting", record.id));
        }
        if !languages.insert(record.language.to_lowercase()) {
            return Err(format!(
                "record {} duplicates language {:?}",
                record.id, record.language
            ));
        }
    }

    Ok(())
}

/// Request body for creating or replacing a greeting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreetingRequest {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub greeting: Option<String>,
    /// An explicit `null` counts as omitted.
    #[serde(default)]
    pub formal: Option<bool>,
}

impl GreetingRequest {
    /// Trim and check the required fields before anything touches the store.
    pub fn validate(self) -> Result<GreetingDraft, AppError> {
        let language = required(self.language)?;
        let greeting = required(self.greeting)?;

        Ok(GreetingDraft {
            language,
            greeting,
            formal: self.formal,
        })
    }
}

fn required(value: Option<String>) -> Result<String, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::InvalidArgument(REQUIRED_FIELDS_MESSAGE.to_string())),
    }
}

/// A validated create/update payload. Strings are already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingDraft {
    pub language: String,
    pub greeting: String,
    /// `None` means "use the default": `true` on create, the prior value on update.
    pub formal: Option<bool>,
}

#[cfg(test)]
impl GreetingDraft {
    pub fn new(language: &str, greeting: &str, formal: Option<bool>) -> Result<Self, AppError> {
        GreetingRequest {
            language: Some(language.to_string()),
            greeting: Some(greeting.to_string()),
            formal,
        }
        .validate()
    }
}

/// Raw list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreetingQuery {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub formal: Option<String>,
}

/// Narrowing applied by the list operation. Both criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GreetingFilter {
    /// Case-insensitive substring of the language.
    pub language: Option<String>,
    pub formal: Option<bool>,
}

impl From<GreetingQuery> for GreetingFilter {
    fn from(query: GreetingQuery) -> Self {
        Self {
            // An empty `?language=` narrows nothing.
            language: query.language.filter(|l| !l.is_empty()),
            // Only the literal "true" selects formal greetings.
            formal: query.formal.map(|f| f == "true"),
        }
    }
}

impl GreetingFilter {
    pub fn matches(&self, record: &Greeting) -> bool {
        let language_ok = self.language.as_ref().map_or(true, |needle| {
            record
                .language
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let formal_ok = self.formal.map_or(true, |formal| record.formal == formal);

        language_ok && formal_ok
    }
}

/// Parse a path id. Anything that is not a plain integer is rejected.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidArgument("Invalid ID format".to_string()))
}
