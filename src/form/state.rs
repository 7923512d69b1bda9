//! Form state snapshot

use std::collections::{BTreeMap, BTreeSet};

use super::value::{deep_equal, FieldValue, FormValues};

/// Error messages keyed by field name
pub type FormErrors = BTreeMap<String, String>;

/// Everything a view needs to render a form
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub(crate) values: FormValues,
    pub(crate) errors: FormErrors,
    pub(crate) touched: BTreeSet<String>,
    pub(crate) is_submitting: bool,
    /// Snapshot taken at construction; never mutated
    initial: FormValues,
}

impl FormState {
    pub fn new(initial: FormValues) -> Self {
        Self {
            values: initial.clone(),
            errors: FormErrors::new(),
            touched: BTreeSet::new(),
            is_submitting: false,
            initial,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Current value of `field` (Missing when the form has no such field)
    pub fn value(&self, field: &str) -> &FieldValue {
        const MISSING: &FieldValue = &FieldValue::Missing;
        self.values.get(field).unwrap_or(MISSING)
    }

    pub fn initial_values(&self) -> &FormValues {
        &self.initial
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Names of every touched field
    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.touched.iter().map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Current values differ from the initial snapshot
    pub fn is_dirty(&self) -> bool {
        !deep_equal(&self.values, &self.initial)
    }

    /// No field currently has an error
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Back to the initial snapshot with no errors or touched fields
    pub(crate) fn restore(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
        self.is_submitting = false;
    }
}
