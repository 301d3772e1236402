//! Address validation handler

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::validation::validate_address;
use crate::types::{
    AddressValidationRequest, AddressValidationResponse, ErrorResponse, Request, SuccessResponse,
};

/// Handle golffox.address.validate messages
pub async fn handle_validate(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received address.validate message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let response = process_validate(&msg.payload)?;
        let _ = client.publish(reply, response.into()).await;
    }

    Ok(())
}

pub(crate) fn process_validate(payload: &[u8]) -> Result<Vec<u8>> {
    let request: Request<AddressValidationRequest> = match serde_json::from_slice(payload) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse address.validate request: {}", e);
            let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
            return Ok(serde_json::to_vec(&error)?);
        }
    };

    let valid = validate_address(&request.payload.address, request.payload.coordinates.as_ref());
    Ok(serde_json::to_vec(&SuccessResponse::new(
        request.id,
        AddressValidationResponse { valid },
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn validate(payload: Value) -> Value {
        let body = json!({
            "id": "0b8e7d44-51a4-4d0e-9a55-5f0c5f8f1a22",
            "timestamp": "2026-03-02T07:00:00Z",
            "payload": payload,
        });
        let reply = process_validate(&serde_json::to_vec(&body).unwrap()).unwrap();
        serde_json::from_slice(&reply).unwrap()
    }

    #[test]
    fn accepts_address_with_coordinates() {
        let reply = validate(json!({
            "address": "Av. Paulista, 1000",
            "coordinates": { "lat": -23.5614, "lng": -46.6559 }
        }));
        assert_eq!(reply["payload"]["valid"], true);
    }

    #[test]
    fn rejects_short_address() {
        let reply = validate(json!({ "address": " Rua " }));
        assert_eq!(reply["payload"]["valid"], false);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let reply = validate(json!({
            "address": "Av. Paulista, 1000",
            "coordinates": { "lat": 91.0, "lng": -46.6559 }
        }));
        assert_eq!(reply["payload"]["valid"], false);
    }

    #[test]
    fn malformed_payload_is_invalid_request() {
        let reply: Value = serde_json::from_slice(&process_validate(b"[]").unwrap()).unwrap();
        assert_eq!(reply["error"]["code"], "INVALID_REQUEST");
    }
}
