//! Route optimization message handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::OptimizationError;
use crate::services::optimizer::{generate_optimization_suggestion, RouteOptimizer};
use crate::types::{
    ErrorResponse, Request, RouteOptimizationOptions, SuccessResponse,
    SuggestionRequest, SuggestionResponse,
};

/// Handle golffox.route.optimize messages
///
/// Each request is processed on its own task so a slow provider call does
/// not hold up the subscription.
pub async fn handle_optimize(
    client: Client,
    mut subscriber: Subscriber,
    optimizer: Arc<RouteOptimizer>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.optimize message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let client = client.clone();
        let optimizer = Arc::clone(&optimizer);
        tokio::spawn(async move {
            match process_optimize(&optimizer, &msg.payload).await {
                Ok(bytes) => {
                    if let Err(e) = client.publish(reply, bytes.into()).await {
                        error!("Failed to publish route.optimize reply: {}", e);
                    }
                }
                Err(e) => error!("Failed to serialize route.optimize reply: {}", e),
            }
        });
    }

    Ok(())
}

/// Decode a request, run the optimizer and encode the reply envelope
pub(crate) async fn process_optimize(optimizer: &RouteOptimizer, payload: &[u8]) -> Result<Vec<u8>> {
    let request: Request<RouteOptimizationOptions> = match serde_json::from_slice(payload) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse route.optimize request: {}", e);
            let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
            return Ok(serde_json::to_vec(&error)?);
        }
    };

    match optimizer.optimize_route(&request.payload).await {
        Ok(route) => Ok(serde_json::to_vec(&SuccessResponse::new(request.id, route))?),
        Err(e) => {
            if let OptimizationError::Unknown(ref detail) = e {
                error!("Route optimization {} failed unexpectedly: {}", request.id, detail);
            } else {
                warn!("Route optimization {} failed: {}", request.id, e);
            }
            let error = ErrorResponse::new(request.id, e.code(), e.to_string())
                .retryable(e.is_retryable());
            Ok(serde_json::to_vec(&error)?)
        }
    }
}

/// Handle golffox.route.suggest messages
pub async fn handle_suggest(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.suggest message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let response = process_suggest(&msg.payload)?;
        let _ = client.publish(reply, response.into()).await;
    }

    Ok(())
}

pub(crate) fn process_suggest(payload: &[u8]) -> Result<Vec<u8>> {
    let request: Request<SuggestionRequest> = match serde_json::from_slice(payload) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse route.suggest request: {}", e);
            let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
            return Ok(serde_json::to_vec(&error)?);
        }
    };

    let response = SuggestionResponse {
        suggestion: generate_optimization_suggestion(request.payload.passenger_count),
    };
    Ok(serde_json::to_vec(&SuccessResponse::new(request.id, response))?)
}
