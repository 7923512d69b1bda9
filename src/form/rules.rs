//! Declarative validation rules
//!
//! Each field gets an optional [`FieldRules`] group. Rules are evaluated in a
//! fixed order (required, pattern, min length, max length, min, max, custom
//! validator) and the first failure wins.

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::value::{FieldValue, FormValues};

/// Errors raised while building a rule set
#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid pattern for field rules: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result of a custom validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// Invalid with the generic "<field> is invalid" message
    Invalid,
    /// Invalid with a caller supplied message
    Message(String),
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        if valid {
            Verdict::Valid
        } else {
            Verdict::Invalid
        }
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Verdict::Message(message)
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Verdict::Message(message.to_string())
    }
}

/// Custom validation hook, may suspend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FieldValidator: Send + Sync {
    /// Check `value` in the context of every current form value
    async fn validate(&self, value: &FieldValue, values: &FormValues) -> Verdict;
}

/// Adapter so plain closures can serve as validators
struct SyncValidator<F>(F);

#[async_trait]
impl<F> FieldValidator for SyncValidator<F>
where
    F: Fn(&FieldValue, &FormValues) -> Verdict + Send + Sync,
{
    async fn validate(&self, value: &FieldValue, values: &FormValues) -> Verdict {
        (self.0)(value, values)
    }
}

/// A numeric bound with its failure message
#[derive(Debug, Clone, PartialEq)]
pub struct Bound<T> {
    pub value: T,
    pub message: String,
}

impl<T> Bound<T> {
    fn new(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            message: message.into(),
        }
    }
}

/// Whether a field must be filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Required with the generic "<field> is required" message
    Default,
    Message(String),
}

/// The rule group configured for one field
#[derive(Clone, Default)]
pub struct FieldRules {
    pub required: Option<Requirement>,
    pub pattern: Option<(Regex, String)>,
    pub min_length: Option<Bound<usize>>,
    pub max_length: Option<Bound<usize>>,
    pub min: Option<Bound<f64>>,
    pub max: Option<Bound<f64>>,
    pub validate: Option<Arc<dyn FieldValidator>>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a value, reporting the generic message
    pub fn required(mut self) -> Self {
        self.required = Some(Requirement::Default);
        self
    }

    /// Require a value, reporting `message`
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required = Some(Requirement::Message(message.into()));
        self
    }

    /// Match the stringified value against a regular expression
    pub fn pattern(mut self, pattern: &str, message: impl Into<String>) -> Result<Self, FormError> {
        self.pattern = Some((Regex::new(pattern)?, message.into()));
        Ok(self)
    }

    pub fn min_length(mut self, value: usize, message: impl Into<String>) -> Self {
        self.min_length = Some(Bound::new(value, message));
        self
    }

    pub fn max_length(mut self, value: usize, message: impl Into<String>) -> Self {
        self.max_length = Some(Bound::new(value, message));
        self
    }

    pub fn min(mut self, value: f64, message: impl Into<String>) -> Self {
        self.min = Some(Bound::new(value, message));
        self
    }

    pub fn max(mut self, value: f64, message: impl Into<String>) -> Self {
        self.max = Some(Bound::new(value, message));
        self
    }

    /// Attach a synchronous custom validator
    pub fn validate_with<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> Verdict + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(SyncValidator(check)));
        self
    }

    /// Attach an asynchronous custom validator
    pub fn validator(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.validate = Some(Arc::new(validator));
        self
    }

    /// Evaluate the group against `value`, returning the first failure.
    pub async fn check(&self, field: &str, value: &FieldValue, values: &FormValues) -> Option<String> {
        if let Some(requirement) = &self.required {
            if value.is_empty() {
                return Some(match requirement {
                    Requirement::Message(message) => message.clone(),
                    Requirement::Default => format!("{field} is required"),
                });
            }
        }

        if let Some((regex, message)) = &self.pattern {
            if value.is_truthy() && !regex.is_match(&value.to_string()) {
                return Some(message.clone());
            }
        }

        if let Some(text) = value.as_text() {
            // Lengths count UTF-16 code units like the browser does
            let length = text.encode_utf16().count();
            if let Some(bound) = &self.min_length {
                if length < bound.value {
                    return Some(bound.message.clone());
                }
            }
            if let Some(bound) = &self.max_length {
                if length > bound.value {
                    return Some(bound.message.clone());
                }
            }
        }

        if let Some(number) = value.as_number() {
            if let Some(bound) = &self.min {
                if number < bound.value {
                    return Some(bound.message.clone());
                }
            }
            if let Some(bound) = &self.max {
                if number > bound.value {
                    return Some(bound.message.clone());
                }
            }
        }

        if let Some(validator) = &self.validate {
            match validator.validate(value, values).await {
                Verdict::Valid => {}
                Verdict::Invalid => return Some(format!("{field} is invalid")),
                Verdict::Message(message) => return Some(message),
            }
        }

        None
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("required", &self.required)
            .field("pattern", &self.pattern.as_ref().map(|(re, msg)| (re.as_str(), msg)))
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Rule groups for a whole form, keyed by field name
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    fields: BTreeMap<String, FieldRules>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule group for `name`
    pub fn field(mut self, name: &str, rules: FieldRules) -> Self {
        self.fields.insert(name.to_string(), rules);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRules> {
        self.fields.get(name)
    }

    /// Names of every field that has a rule group
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
