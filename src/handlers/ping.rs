//! Ping handler for health checks

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Serialize, Deserialize)]
struct PingRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PongResponse {
    message: String,
    timestamp: String,
    provider: String,
}

fn pong(payload: &[u8], provider: &str) -> Result<PongResponse, serde_json::Error> {
    // An empty body is a plain ping
    let request: PingRequest = if payload.is_empty() {
        PingRequest { message: None }
    } else {
        serde_json::from_slice(payload)?
    };

    Ok(PongResponse {
        message: request.message.map(|m| format!("Pong: {}", m)).unwrap_or_else(|| "Pong".to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
        provider: provider.to_string(),
    })
}

/// Handle ping messages
pub async fn handle_ping(client: Client, mut subscriber: Subscriber, provider: String) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received ping message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                error!("Ping message without reply subject");
                continue;
            }
        };

        let response = match pong(&msg.payload, &provider) {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to parse ping request: {}", e);
                let error_response = serde_json::json!({
                    "error": {
                        "code": "INVALID_REQUEST",
                        "message": format!("Failed to parse request: {}", e)
                    }
                });
                let _ = client.publish(reply, error_response.to_string().into()).await;
                continue;
            }
        };

        let response_bytes = serde_json::to_vec(&response)?;
        client.publish(reply, response_bytes.into()).await?;

        debug!("Sent pong response");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_echoes_message() {
        let response = pong(br#"{"message":"hello"}"#, "Estimate").unwrap();
        assert_eq!(response.message, "Pong: hello");
        assert_eq!(response.provider, "Estimate");
    }

    #[test]
    fn test_pong_empty_payload() {
        assert_eq!(pong(b"", "Estimate").unwrap().message, "Pong");
    }

    #[test]
    fn test_pong_invalid_payload() {
        assert!(pong(b"not json", "Estimate").is_err());
    }
}
