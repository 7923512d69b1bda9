//! Form engine: value tracking, validation and the submit lifecycle

use std::collections::BTreeMap;
use std::future::Future;
use std::ops::{Deref, DerefMut};

use super::rules::ValidationRules;
use super::state::{FormErrors, FormState};
use super::value::{FieldValue, FormValues, InputEvent, InputKind};

/// When validation runs automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    /// Revalidate touched fields as they change
    pub validate_on_change: bool,
    /// Validate a field when it loses focus
    pub validate_on_blur: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            validate_on_blur: true,
        }
    }
}

/// How a submit attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed and the handler completed
    Submitted,
    /// Validation failed; the handler was not called
    Invalid,
    /// The handler returned an error (already logged)
    Failed(String),
}

/// Owns one form's state and enforces its rule set
#[derive(Debug)]
pub struct FormEngine {
    state: FormState,
    rules: ValidationRules,
    options: FormOptions,
    input_kinds: BTreeMap<String, InputKind>,
}

impl FormEngine {
    /// Create an engine with validation on change and on blur
    pub fn new(initial: FormValues, rules: ValidationRules) -> Self {
        Self::with_options(initial, rules, FormOptions::default())
    }

    pub fn with_options(initial: FormValues, rules: ValidationRules, options: FormOptions) -> Self {
        Self {
            state: FormState::new(initial),
            rules,
            options,
            input_kinds: BTreeMap::new(),
        }
    }

    /// Declare the kind of input that edits `field`
    pub fn with_input_kind(mut self, field: &str, kind: InputKind) -> Self {
        self.input_kinds.insert(field.to_string(), kind);
        self
    }

    /// Kind of input that edits `field`.
    ///
    /// Undeclared fields take their kind from the initial value, so clearing
    /// a number field does not turn later entries into text.
    pub fn input_kind(&self, field: &str) -> InputKind {
        if let Some(kind) = self.input_kinds.get(field) {
            return *kind;
        }
        match self.state.initial_values().get(field) {
            Some(FieldValue::Number(_)) => InputKind::Number,
            Some(FieldValue::Bool(_)) => InputKind::Checkbox,
            _ => InputKind::Text,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn values(&self) -> &FormValues {
        self.state.values()
    }

    pub fn value(&self, field: &str) -> &FieldValue {
        self.state.value(field)
    }

    pub fn errors(&self) -> &FormErrors {
        self.state.errors()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.state.error(field)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.state.is_touched(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    /// Replace one field's value. Does not validate.
    pub fn set_value(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.state.values.insert(field.to_string(), value.into());
        tracing::debug!(field, dirty = self.state.is_dirty(), "Form value set");
    }

    /// Merge several values at once. Does not validate.
    pub fn set_values<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.state
            .values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        tracing::debug!(dirty = self.state.is_dirty(), "Form values merged");
    }

    /// Apply a change event from an input.
    ///
    /// Only fields that have already been touched are revalidated, so errors
    /// do not flash while the user is still typing into a fresh field.
    pub async fn handle_change(&mut self, event: &InputEvent) {
        let value = event.coerced();
        let was_touched = self.state.is_touched(&event.name);
        self.set_value(&event.name, value.clone());

        if self.options.validate_on_change && was_touched {
            self.validate_field(&event.name, value).await;
        }
    }

    /// Mark `field` touched and validate it if enabled
    pub async fn handle_blur(&mut self, field: &str) {
        self.state.touched.insert(field.to_string());

        if self.options.validate_on_blur {
            let value = self.state.value(field).clone();
            self.validate_field(field, value).await;
        }
    }

    /// Validate one field and record the result in `errors`.
    ///
    /// Fields without a rule group report no error and leave `errors` as is.
    pub async fn validate_field(&mut self, field: &str, value: FieldValue) -> Option<String> {
        let rules = self.rules.get(field)?;
        let error = rules.check(field, &value, &self.state.values).await;

        match &error {
            Some(message) => {
                tracing::debug!(field, error = %message, "Field failed validation");
                self.state
                    .errors
                    .insert(field.to_string(), message.clone());
            }
            None => {
                self.state.errors.remove(field);
            }
        }
        error
    }

    /// Touch every field, validate every ruled field and replace `errors`.
    pub async fn validate_form(&mut self) -> bool {
        let names: Vec<String> = self.state.values.keys().cloned().collect();
        self.state.touched.extend(names);

        let mut errors = FormErrors::new();
        for field in self.rules.names() {
            let Some(rules) = self.rules.get(field) else {
                continue;
            };
            let value = self.state.value(field);
            if let Some(message) = rules.check(field, value, &self.state.values).await {
                errors.insert(field.to_string(), message);
            }
        }

        let is_valid = errors.is_empty();
        tracing::debug!(is_valid, error_count = errors.len(), "Form validated");
        self.state.errors = errors;
        is_valid
    }

    /// Validate and, when valid, hand the current values to `on_submit`.
    ///
    /// The handler is run here rather than wrapped into a reusable event
    /// handler; bind it at the call site (the console's `pay` does this).
    ///
    /// `is_submitting` is true for the whole call and is released on every
    /// exit path, including a panicking handler or a dropped future. Errors
    /// from the handler are logged and reported as [`SubmitOutcome::Failed`].
    /// Overlapping submits are not guarded against here; callers sharing an
    /// engine should check [`FormEngine::is_submitting`] first.
    pub async fn submit<F, Fut>(&mut self, on_submit: F) -> SubmitOutcome
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut form = SubmittingGuard::acquire(self);

        if !form.validate_form().await {
            tracing::info!(errors = ?form.state.errors, "Submit blocked by validation");
            return SubmitOutcome::Invalid;
        }

        match on_submit(form.state.values.clone()).await {
            Ok(()) => SubmitOutcome::Submitted,
            Err(err) => {
                tracing::error!("Form submission error: {err:#}");
                SubmitOutcome::Failed(format!("{err:#}"))
            }
        }
    }

    /// Restore the initial values and clear errors, touched and flags
    pub fn reset(&mut self) {
        self.state.restore();
        tracing::debug!("Form reset");
    }

    pub fn clear_errors(&mut self) {
        self.state.errors.clear();
    }

    /// Force an error onto `field`, e.g. from a server response
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.state.errors.insert(field.to_string(), message.into());
    }
}

/// Holds `is_submitting` for as long as it lives
struct SubmittingGuard<'a> {
    engine: &'a mut FormEngine,
}

impl<'a> SubmittingGuard<'a> {
    fn acquire(engine: &'a mut FormEngine) -> Self {
        engine.state.is_submitting = true;
        Self { engine }
    }
}

impl Deref for SubmittingGuard<'_> {
    type Target = FormEngine;

    fn deref(&self) -> &FormEngine {
        self.engine
    }
}

impl DerefMut for SubmittingGuard<'_> {
    fn deref_mut(&mut self) -> &mut FormEngine {
        self.engine
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.engine.state.is_submitting = false;
    }
}
