//! Coercion and validation of the fields submitted to create a transaction.
//!
//! Every field is checked so that the form can show all of the problems at
//! once, rather than one per submission.

use serde::Deserialize;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

use crate::transaction_type::TransactionType;

// Messages follow the wording of zod 3.

/// The amount is not a number.
pub const AMOUNT_NAN_MSG: &str = "Expected number, received nan";
/// The amount is zero or negative.
pub const AMOUNT_NOT_POSITIVE_MSG: &str = "Number must be greater than 0";
/// The amount has fractions of a cent.
pub const AMOUNT_NOT_CENTS_MSG: &str = "Number must be a multiple of 0.01";
/// The date is not a calendar date or a date-time.
pub const INVALID_DATE_MSG: &str = "Invalid date";
/// The type is neither "income" nor "expense".
pub const INVALID_TYPE_MSG: &str = "Invalid input";

/// An amount as submitted, either a JSON number or text from a form field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// A number from a JSON body.
    Number(f64),
    /// Text from a form field, parsed during validation.
    Text(String),
}

impl Default for RawAmount {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// The unvalidated fields for creating a transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    /// The amount of money, which must be positive and in whole cents.
    #[serde(default)]
    pub amount: RawAmount,
    /// An optional note about the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// A `YYYY-MM-DD` date or an RFC 3339 date-time.
    #[serde(default)]
    pub date: String,
    /// The name of the category.
    #[serde(default)]
    pub category: String,
    /// Either "income" or "expense".
    #[serde(default, rename = "type")]
    pub transaction_type: String,
}

/// A validated transaction that is ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money, always positive.
    pub amount: f64,
    /// A note about the transaction, empty if none was given.
    pub description: String,
    /// The day the transaction happened.
    pub date: Date,
    /// The name of an existing category of the same type.
    pub category: String,
    /// Whether money came in or went out.
    pub transaction_type: TransactionType,
}

/// A problem with one field of the submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The name of the form field, e.g. "amount".
    pub field: &'static str,
    /// What is wrong with the value.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_owned(),
        }
    }
}

/// The first error message for `field`, if any.
pub fn error_for<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|error| error.field == field)
        .map(|error| error.message.as_str())
}

/// Validate `input` into a [NewTransaction].
///
/// # Errors
/// Returns every [FieldError] found, in field order.
pub fn validate(input: &TransactionInput) -> Result<NewTransaction, Vec<FieldError>> {
    let mut errors = Vec::new();

    let amount = match coerce_amount(&input.amount) {
        Some(amount) => {
            if amount <= 0.0 {
                errors.push(FieldError::new("amount", AMOUNT_NOT_POSITIVE_MSG));
            }

            if !is_multiple_of_cents(amount) {
                errors.push(FieldError::new("amount", AMOUNT_NOT_CENTS_MSG));
            }

            amount
        }
        None => {
            errors.push(FieldError::new("amount", AMOUNT_NAN_MSG));
            f64::NAN
        }
    };

    let date = coerce_date(&input.date);
    if date.is_none() {
        errors.push(FieldError::new("date", INVALID_DATE_MSG));
    }

    let transaction_type = input.transaction_type.parse::<TransactionType>().ok();
    if transaction_type.is_none() {
        errors.push(FieldError::new("type", INVALID_TYPE_MSG));
    }

    match (date, transaction_type) {
        (Some(date), Some(transaction_type)) if errors.is_empty() => Ok(NewTransaction {
            amount,
            description: input.description.clone().unwrap_or_default(),
            date,
            category: input.category.clone(),
            transaction_type,
        }),
        _ => Err(errors),
    }
}

/// Convert `raw` to a finite number. Text is trimmed and empty text is zero.
fn coerce_amount(raw: &RawAmount) -> Option<f64> {
    let amount = match raw {
        RawAmount::Number(number) => *number,
        RawAmount::Text(text) => {
            let text = text.trim();

            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>().ok()?
            }
        }
    };

    amount.is_finite().then_some(amount)
}

/// Whether `amount` has at most two decimal places in its shortest representation.
fn is_multiple_of_cents(amount: f64) -> bool {
    let text = amount.to_string();

    match text.split_once('.') {
        Some((_, decimals)) => decimals.len() <= 2,
        None => true,
    }
}

/// Parse a calendar date, or the UTC date of an RFC 3339 date-time.
fn coerce_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(raw, &Rfc3339)
                .ok()
                .map(|date_time| date_time.to_offset(time::UtcOffset::UTC).date())
        })
}
