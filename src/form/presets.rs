//! Ready-made forms used by the sandbox checkout

use chrono::{Months, NaiveDate};

use super::engine::{FormEngine, FormOptions};
use super::rules::{FieldRules, FormError, ValidationRules, Verdict};
use super::value::{FieldValue, FormValues, InputKind};

/// Card details collected at checkout
pub fn payment_form(options: FormOptions) -> Result<FormEngine, FormError> {
    let mut initial = FormValues::new();
    for field in ["cardNumber", "cardName", "expiryMonth", "expiryYear", "cvv"] {
        initial.insert(field.to_string(), FieldValue::text(""));
    }
    initial.insert("saveCard".to_string(), FieldValue::Bool(false));

    let rules = ValidationRules::new()
        .field(
            "cardNumber",
            FieldRules::new()
                .required_message("Card number is required")
                .pattern(r"^[0-9]{16}$", "Card number must be 16 digits")?,
        )
        .field(
            "cardName",
            FieldRules::new().required_message("Cardholder name is required"),
        )
        .field(
            "expiryMonth",
            FieldRules::new().required_message("Expiry month is required"),
        )
        .field(
            "expiryYear",
            FieldRules::new().required_message("Expiry year is required"),
        )
        .field(
            "cvv",
            FieldRules::new()
                .required_message("CVV is required")
                .pattern(r"^[0-9]{3,4}$", "CVV must be 3 or 4 digits")?,
        );

    Ok(FormEngine::with_options(initial, rules, options))
}

/// Stay dates and party size for an apartment booking.
///
/// Dates are ISO `YYYY-MM-DD` strings checked against `today`.
pub fn booking_form(today: NaiveDate, options: FormOptions) -> FormEngine {
    let mut initial = FormValues::new();
    initial.insert("checkIn".to_string(), FieldValue::text(""));
    initial.insert("checkOut".to_string(), FieldValue::text(""));
    initial.insert("guests".to_string(), FieldValue::Number(1.0));

    let latest = today.checked_add_months(Months::new(12)).unwrap_or(today);

    let rules = ValidationRules::new()
        .field(
            "checkIn",
            FieldRules::new()
                .required_message("Date is required")
                .validate_with(move |value, _| stay_date(value, today, latest)),
        )
        .field(
            "checkOut",
            FieldRules::new()
                .required_message("Date is required")
                .validate_with(move |value, values| {
                    let verdict = stay_date(value, today, latest);
                    if verdict != Verdict::Valid {
                        return verdict;
                    }
                    let check_in = values.get("checkIn").and_then(parse_date);
                    match (check_in, parse_date(value)) {
                        (Some(start), Some(end)) if end <= start => {
                            "Check-out must be after check-in".into()
                        }
                        _ => Verdict::Valid,
                    }
                }),
        )
        .field(
            "guests",
            FieldRules::new()
                .required_message("Number of guests is required")
                .min(1.0, "At least one guest is required")
                .max(8.0, "No more than 8 guests"),
        );

    FormEngine::with_options(initial, rules, options).with_input_kind("guests", InputKind::Number)
}

fn parse_date(value: &FieldValue) -> Option<NaiveDate> {
    value
        .as_text()
        .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
}

fn stay_date(value: &FieldValue, earliest: NaiveDate, latest: NaiveDate) -> Verdict {
    let Some(date) = parse_date(value) else {
        return "Invalid date".into();
    };
    if date < earliest {
        return format!("Date cannot be before {}", earliest.format("%Y-%m-%d")).into();
    }
    if date > latest {
        return format!("Date cannot be after {}", latest.format("%Y-%m-%d")).into();
    }
    Verdict::Valid
}
