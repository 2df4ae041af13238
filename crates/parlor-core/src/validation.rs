//! Validation gate for participant names and message payloads.
//!
//! Inputs arrive as raw JSON values so that a missing field and a field of
//! the wrong type can be told apart. Both validators are pure and collect
//! every violated rule before returning.

use parlor_types::message::MessageKind;
use parlor_types::participant::MAX_NAME_LEN;
use parlor_types::validation::{Rule, ValidMessage, ValidName, ValidationErrors, Violation};
use serde_json::Value;

/// Validate a participant name taken from a request body.
///
/// Fails when the value is missing, not a string, empty after trimming, or
/// longer than 30 characters after trimming.
pub fn validate_participant_name(name: Option<&Value>) -> Result<ValidName, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = trimmed_string("name", name, &mut errors);

    if let Some(ref name) = name {
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            errors.push(Violation::new(
                "name",
                Rule::MaxLength,
                format!("must be at most {MAX_NAME_LEN} characters (got {len})"),
            ));
        }
    }

    errors.into_result(|| ValidName::new_unchecked(name.unwrap_or_default()))
}

/// Validate a message payload `{to, text, type}`.
///
/// `to` and `text` must be non-empty after trimming; `type` must be exactly
/// one of `status`, `message`, `private_message`.
pub fn validate_message(
    to: Option<&Value>,
    text: Option<&Value>,
    kind: Option<&Value>,
) -> Result<ValidMessage, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let to = trimmed_string("to", to, &mut errors);
    let text = trimmed_string("text", text, &mut errors);
    let kind = message_kind(kind, &mut errors);

    match (to, text, kind) {
        (Some(to), Some(text), Some(kind)) if errors.is_empty() => {
            Ok(ValidMessage { to, text, kind })
        }
        _ => Err(errors),
    }
}

/// Validate the `{to, text, type}` fields of a JSON object body.
pub fn validate_message_body(body: &Value) -> Result<ValidMessage, ValidationErrors> {
    validate_message(body.get("to"), body.get("text"), body.get("type"))
}

/// Check presence, type, and non-emptiness. Returns the trimmed value only
/// if all three hold.
fn trimmed_string(
    field: &'static str,
    value: Option<&Value>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.push(Violation::new(field, Rule::Required, "is required"));
            None
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                errors.push(Violation::new(field, Rule::NotEmpty, "must not be empty"));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            errors.push(Violation::new(field, Rule::String, "must be a string"));
            None
        }
    }
}

fn message_kind(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<MessageKind> {
    match value {
        None | Some(Value::Null) => {
            errors.push(Violation::new("type", Rule::Required, "is required"));
            None
        }
        Some(Value::String(s)) => match s.parse::<MessageKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                let allowed: Vec<&str> = MessageKind::ALL.iter().map(MessageKind::as_str).collect();
                errors.push(Violation::new(
                    "type",
                    Rule::OneOf,
                    format!("must be one of {}", allowed.join(", ")),
                ));
                None
            }
        },
        Some(_) => {
            errors.push(Violation::new("type", Rule::String, "must be a string"));
            None
        }
    }
}
