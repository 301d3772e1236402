//! NATS message handlers

pub mod address;
pub mod ping;
pub mod route;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use tokio::select;
use tracing::{error, info};

use crate::services::optimizer::RouteOptimizer;

pub const PING_SUBJECT: &str = "golffox.ping";
pub const ROUTE_OPTIMIZE_SUBJECT: &str = "golffox.route.optimize";
pub const ROUTE_SUGGEST_SUBJECT: &str = "golffox.route.suggest";
pub const ADDRESS_VALIDATE_SUBJECT: &str = "golffox.address.validate";

/// Subscribe to all subjects and serve them until a handler stops
pub async fn start_handlers(client: Client, optimizer: Arc<RouteOptimizer>) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe(PING_SUBJECT).await?;
    let route_optimize_sub = client.subscribe(ROUTE_OPTIMIZE_SUBJECT).await?;
    let route_suggest_sub = client.subscribe(ROUTE_SUGGEST_SUBJECT).await?;
    let address_validate_sub = client.subscribe(ADDRESS_VALIDATE_SUBJECT).await?;

    info!("Subscribed to NATS subjects");

    let provider = optimizer.provider_name().to_string();

    let client_ping = client.clone();
    let client_route_optimize = client.clone();
    let client_route_suggest = client.clone();
    let client_address_validate = client.clone();

    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub, provider).await
    });

    let optimizer_route = Arc::clone(&optimizer);
    let route_optimize_handle = tokio::spawn(async move {
        route::handle_optimize(client_route_optimize, route_optimize_sub, optimizer_route).await
    });

    let route_suggest_handle = tokio::spawn(async move {
        route::handle_suggest(client_route_suggest, route_suggest_sub).await
    });

    let address_validate_handle = tokio::spawn(async move {
        address::handle_validate(client_address_validate, address_validate_sub).await
    });

    info!("All handlers started, waiting for messages...");

    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = route_optimize_handle => {
            error!("Route optimize handler finished: {:?}", result);
        }
        result = route_suggest_handle => {
            error!("Route suggest handler finished: {:?}", result);
        }
        result = address_validate_handle => {
            error!("Address validate handler finished: {:?}", result);
        }
    }

    Ok(())
}
