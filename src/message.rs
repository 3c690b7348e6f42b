use serde::{Deserialize, Serialize};

/// Lifecycle operation carried by an RTP message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RtpOperationCode {
    Create,
    Update,
    Delete,
}

/// Status of the debt position referenced by the message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPositionStatus {
    Valid,
    PartiallyValid,
    Paid,
    Expired,
    Invalid,
    Draft,
    Published,
}

/// One debt-position lifecycle event destined for the GPD topic.
///
/// Only `id`, `operation` and `timestamp` are required. Deletion payloads
/// null out every domain field, so all other fields are nullable.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RtpMessage {
    pub id: i64,
    pub operation: RtpOperationCode,
    /// Epoch milliseconds, supplied by the caller
    pub timestamp: i64,
    #[serde(default)]
    pub iuv: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ec_tax_code: Option<String>,
    #[serde(default)]
    pub debtor_tax_code: Option<String>,
    #[serde(default)]
    pub nav: Option<String>,
    #[serde(default)]
    pub due_date: Option<i64>,
    /// Minor currency units (euro cents)
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub status: Option<PaymentPositionStatus>,
    #[serde(default)]
    pub psp_code: Option<String>,
    #[serde(default)]
    pub psp_tax_code: Option<String>,
    #[serde(default)]
    pub is_partial_payment: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(PaymentPositionStatus::PartiallyValid).unwrap(),
            json!("PARTIALLY_VALID")
        );
        assert_eq!(
            serde_json::from_value::<RtpOperationCode>(json!("DELETE")).unwrap(),
            RtpOperationCode::Delete
        );
        assert!(serde_json::from_value::<RtpOperationCode>(json!("delete")).is_err());
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let msg: RtpMessage =
            serde_json::from_value(json!({"id": 7, "operation": "UPDATE", "timestamp": 1}))
                .unwrap();
        assert_eq!(msg.iuv, None);
        assert_eq!(msg.status, None);
        assert_eq!(msg.is_partial_payment, None);
    }
}
