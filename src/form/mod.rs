//! Form domain layer
//!
//! Declarative, rule-driven form state: values, touched fields, dirty
//! tracking, per-field validation and a guarded submit lifecycle.

mod engine;
pub mod presets;
mod rules;
mod state;
mod value;

pub use engine::{FormEngine, FormOptions, SubmitOutcome};
pub use rules::{Bound, FieldRules, FieldValidator, FormError, Requirement, ValidationRules, Verdict};
pub use state::{FormErrors, FormState};
pub use value::{deep_equal, FieldValue, FormValues, InputEvent, InputKind};
