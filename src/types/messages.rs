//! NATS message types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Generic request wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> Request<T> {
    pub fn new(payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Generic success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(request_id: Uuid, payload: T) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    /// Whether the caller may retry the same request later
    #[serde(default)]
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(request_id: Uuid, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                retryable: false,
            },
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.error.retryable = retryable;
        self
    }
}

/// Payload of `golffox.route.suggest`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub passenger_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggestion: String,
}

/// Payload of `golffox.address.validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidationRequest {
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<super::Coordinates>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidationResponse {
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serializes_code_and_retryable() {
        let response = ErrorResponse::new(Uuid::nil(), "DIRECTIONS_API_ERROR", "upstream down")
            .retryable(true);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["code"], "DIRECTIONS_API_ERROR");
        assert_eq!(json["error"]["message"], "upstream down");
        assert_eq!(json["error"]["retryable"], true);
    }

    #[test]
    fn test_request_parses_camel_case_payload() {
        let raw = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "timestamp": "2026-01-01T08:00:00Z",
            "payload": { "passengerCount": 7 }
        }"#;
        let request: Request<SuggestionRequest> = serde_json::from_str(raw).unwrap();
        assert_eq!(request.payload.passenger_count, 7);
    }

    #[test]
    fn test_address_validation_request_coordinates_optional() {
        let raw = r#"{ "address": "Rua Augusta 100" }"#;
        let request: AddressValidationRequest = serde_json::from_str(raw).unwrap();
        assert!(request.coordinates.is_none());
    }
}
