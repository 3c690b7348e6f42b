// ============================================================================
// Message Validator
// ============================================================================
//
// Validates inbound RTP messages:
// - Field presence and JSON types (schema-checked deserialization)
// - Enumerated codes (operation, status)
// - Integer ranges and string lengths
//
// Validation is pure and fail-fast: the first violation is reported.
// ============================================================================

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::message::RtpMessage;

/// Length bounds of the optional string fields, counted in characters
const IUV_LEN: (usize, usize) = (1, 35);
const SUBJECT_LEN: (usize, usize) = (0, 255);
const DESCRIPTION_LEN: (usize, usize) = (0, 1024);
const TAX_CODE_LEN: (usize, usize) = (11, 16);
const NAV_LEN: (usize, usize) = (0, 64);
const PSP_CODE_LEN: (usize, usize) = (0, 32);

/// First schema violation found in a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    Field { field: String, message: String },

    /// Violation not attributable to a single field (wrong shape, bad type)
    #[error("{0}")]
    Schema(String),
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        ValidationError::Schema(message.into())
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::Field { field, .. } => Some(field),
            ValidationError::Schema(_) => None,
        }
    }
}

pub struct MessageValidator;

impl MessageValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw JSON payload and produce the typed message.
    ///
    /// String fields are trimmed before their length is checked and the
    /// returned message carries the trimmed values.
    pub fn validate(&self, raw: &Value) -> Result<RtpMessage, ValidationError> {
        if !raw.is_object() {
            return Err(ValidationError::schema("payload must be a JSON object"));
        }

        let mut msg = RtpMessage::deserialize(raw)
            .map_err(|e| ValidationError::schema(e.to_string()))?;

        if msg.id <= 0 {
            return Err(ValidationError::new("id", "must be greater than 0"));
        }
        non_negative("timestamp", Some(msg.timestamp))?;

        bounded("iuv", &mut msg.iuv, IUV_LEN)?;
        bounded("subject", &mut msg.subject, SUBJECT_LEN)?;
        bounded("description", &mut msg.description, DESCRIPTION_LEN)?;
        bounded("ec_tax_code", &mut msg.ec_tax_code, TAX_CODE_LEN)?;
        bounded("debtor_tax_code", &mut msg.debtor_tax_code, TAX_CODE_LEN)?;
        bounded("nav", &mut msg.nav, NAV_LEN)?;
        non_negative("due_date", msg.due_date)?;
        non_negative("amount", msg.amount)?;
        bounded("psp_code", &mut msg.psp_code, PSP_CODE_LEN)?;
        bounded("psp_tax_code", &mut msg.psp_tax_code, TAX_CODE_LEN)?;

        Ok(msg)
    }
}

impl Default for MessageValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative(field: &str, value: Option<i64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::new(
            field,
            "must be greater than or equal to 0",
        )),
        _ => Ok(()),
    }
}

fn bounded(
    field: &str,
    value: &mut Option<String>,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    let Some(raw) = value.as_mut() else {
        return Ok(());
    };

    let trimmed = raw.trim();
    if trimmed.len() != raw.len() {
        *raw = trimmed.to_string();
    }

    let len = raw.chars().count();
    if len < min {
        return Err(ValidationError::new(
            field,
            format!("must have at least {} characters, got {}", min, len),
        ));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("must have at most {} characters, got {}", max, len),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{PaymentPositionStatus, RtpOperationCode};
    use serde_json::json;

    fn full_message() -> Value {
        json!({
            "id": 42,
            "operation": "CREATE",
            "timestamp": 1_700_000_000_000i64,
            "iuv": "01234567890123456",
            "subject": "TARI 2025",
            "description": "Tassa rifiuti",
            "ec_tax_code": "80015010723",
            "debtor_tax_code": "RSSMRA85T10A562S",
            "nav": "301234567890123456",
            "due_date": 1_735_689_600_000i64,
            "amount": 12050,
            "status": "VALID",
            "psp_code": "ABI03069",
            "psp_tax_code": "00799960158",
            "is_partial_payment": false
        })
    }

    #[test]
    fn test_valid_message_keeps_field_values() {
        let validator = MessageValidator::new();
        let raw = full_message();

        let msg = validator.validate(&raw).unwrap();

        assert_eq!(msg.id, 42);
        assert_eq!(msg.operation, RtpOperationCode::Create);
        assert_eq!(msg.status, Some(PaymentPositionStatus::Valid));
        assert_eq!(msg.amount, Some(12050));
        assert_eq!(msg.is_partial_payment, Some(false));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_delete_with_null_domain_fields() {
        let validator = MessageValidator::new();
        let raw = json!({
            "id": 9,
            "operation": "DELETE",
            "timestamp": 0,
            "iuv": null,
            "subject": null,
            "description": null,
            "ec_tax_code": null,
            "debtor_tax_code": null,
            "nav": null,
            "due_date": null,
            "amount": null,
            "status": null,
            "psp_code": null,
            "psp_tax_code": null,
            "is_partial_payment": null
        });

        let msg = validator.validate(&raw).unwrap();
        assert_eq!(msg.operation, RtpOperationCode::Delete);
        assert_eq!(msg.iuv, None);
    }

    #[test]
    fn test_minimal_delete() {
        let validator = MessageValidator::new();
        let raw = json!({"id": 1, "operation": "DELETE", "timestamp": 5});
        assert!(validator.validate(&raw).is_ok());
    }

    #[test]
    fn test_missing_id() {
        let validator = MessageValidator::new();
        let err = validator
            .validate(&json!({"operation": "CREATE", "timestamp": 0}))
            .unwrap_err();
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_non_positive_id() {
        let validator = MessageValidator::new();
        for id in [0, -3] {
            let err = validator
                .validate(&json!({"id": id, "operation": "CREATE", "timestamp": 0}))
                .unwrap_err();
            assert_eq!(err.field(), Some("id"));
        }
    }

    #[test]
    fn test_id_must_be_integer() {
        let validator = MessageValidator::new();
        for id in [json!("1"), json!(1.5), json!(true), Value::Null] {
            let raw = json!({"id": id, "operation": "CREATE", "timestamp": 0});
            assert!(validator.validate(&raw).is_err(), "accepted id {:?}", raw["id"]);
        }
    }

    #[test]
    fn test_unknown_operation() {
        let validator = MessageValidator::new();
        let err = validator
            .validate(&json!({"id": 1, "operation": "UPSERT", "timestamp": 0}))
            .unwrap_err();
        assert!(err.to_string().contains("UPSERT"));
    }

    #[test]
    fn test_unknown_status() {
        let validator = MessageValidator::new();
        let raw = json!({"id": 1, "operation": "UPDATE", "timestamp": 0, "status": "ARCHIVED"});
        assert!(validator.validate(&raw).is_err());
    }

    #[test]
    fn test_negative_timestamp_and_amount() {
        let validator = MessageValidator::new();
        let err = validator
            .validate(&json!({"id": 1, "operation": "CREATE", "timestamp": -1}))
            .unwrap_err();
        assert_eq!(err.field(), Some("timestamp"));

        let err = validator
            .validate(&json!({"id": 1, "operation": "CREATE", "timestamp": 0, "amount": -100}))
            .unwrap_err();
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn test_string_length_bounds() {
        let validator = MessageValidator::new();

        let short_tax_code = json!({
            "id": 1, "operation": "CREATE", "timestamp": 0, "ec_tax_code": "123"
        });
        let err = validator.validate(&short_tax_code).unwrap_err();
        assert_eq!(err.field(), Some("ec_tax_code"));

        let long_iuv = json!({
            "id": 1, "operation": "CREATE", "timestamp": 0, "iuv": "9".repeat(36)
        });
        let err = validator.validate(&long_iuv).unwrap_err();
        assert_eq!(err.field(), Some("iuv"));

        let empty_iuv = json!({"id": 1, "operation": "CREATE", "timestamp": 0, "iuv": "   "});
        assert_eq!(validator.validate(&empty_iuv).unwrap_err().field(), Some("iuv"));
    }

    #[test]
    fn test_strings_are_trimmed() {
        let validator = MessageValidator::new();
        let raw = json!({
            "id": 1, "operation": "CREATE", "timestamp": 0, "psp_tax_code": "  00799960158  "
        });
        let msg = validator.validate(&raw).unwrap();
        assert_eq!(msg.psp_tax_code.as_deref(), Some("00799960158"));
    }

    #[test]
    fn test_non_object_rejected() {
        let validator = MessageValidator::new();
        assert!(validator.validate(&json!([1, 2, 3])).is_err());
        assert!(validator.validate(&json!("CREATE")).is_err());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let validator = MessageValidator::new();
        let raw = json!({"id": 1, "operation": "CREATE", "timestamp": 0, "iupd": "x"});
        assert!(validator.validate(&raw).is_ok());
    }

    #[test]
    fn test_error_display_names_field() {
        let field = ValidationError::new("iuv", "length must be between 1 and 35");
        assert_eq!(field.to_string(), "iuv: length must be between 1 and 35");

        let schema = ValidationError::schema("missing field `id`");
        assert_eq!(schema.to_string(), "missing field `id`");
        assert_eq!(schema.field(), None);
    }
}
