//! Google Directions API client
//!
//! API documentation:
//! https://developers.google.com/maps/documentation/directions/get-directions

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{decode_polyline, DirectionsError, DirectionsProvider, DirectionsRequest, DirectionsResponse, RouteLeg};
use crate::types::Coordinates;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Google encodes overview polylines with 5 decimal places
const POLYLINE_PRECISION: u32 = 5;

/// Google Directions client configuration
#[derive(Debug, Clone)]
pub struct GoogleDirectionsConfig {
    pub base_url: String,
    /// Client is not ready until a key is configured
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Google Directions client
pub struct GoogleDirectionsClient {
    client: Client,
    config: GoogleDirectionsConfig,
}

impl GoogleDirectionsClient {
    pub fn new(config: GoogleDirectionsConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Build the request URL (without logging the key anywhere)
    fn build_url(&self, request: &DirectionsRequest, api_key: &str) -> String {
        let mut url = format!(
            "{}/maps/api/directions/json?origin={}&destination={}",
            self.config.base_url.trim_end_matches('/'),
            format_point(&request.origin),
            format_point(&request.destination),
        );

        if !request.waypoints.is_empty() {
            let mut parts: Vec<String> = Vec::with_capacity(request.waypoints.len() + 1);
            if request.optimize_waypoints {
                parts.push("optimize:true".to_string());
            }
            parts.extend(request.waypoints.iter().map(format_point));
            url.push_str("&waypoints=");
            url.push_str(&urlencoding::encode(&parts.join("|")));
        }

        url.push_str("&key=");
        url.push_str(&urlencoding::encode(api_key));
        url
    }
}

fn format_point(c: &Coordinates) -> String {
    format!("{},{}", c.lat, c.lng)
}

#[async_trait]
impl DirectionsProvider for GoogleDirectionsClient {
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, DirectionsError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(DirectionsError::NotReady);
        };

        debug!(
            "Requesting directions from Google with {} waypoints (optimize={})",
            request.waypoints.len(),
            request.optimize_waypoints
        );

        let response = self.client.get(self.build_url(request, api_key)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::Status { status, body });
        }

        let body: DirectionsBody = response.json().await?;
        parse_body(body, request.waypoints.len())
    }

    fn is_ready(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn name(&self) -> &str {
        "Google"
    }
}

fn parse_body(body: DirectionsBody, waypoint_count: usize) -> Result<DirectionsResponse, DirectionsError> {
    if body.status != "OK" {
        return Err(DirectionsError::Api {
            status: body.status,
            message: body.error_message.unwrap_or_else(|| "no error message".to_string()),
        });
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| DirectionsError::InvalidResponse("no routes in response".to_string()))?;

    let waypoint_order = if route.waypoint_order.is_empty() {
        (0..waypoint_count).collect()
    } else {
        route.waypoint_order
    };

    let legs = route
        .legs
        .iter()
        .map(|leg| RouteLeg {
            distance_meters: leg.distance.value,
            duration_seconds: leg.duration.value,
        })
        .collect();

    let polyline = match route.overview_polyline {
        Some(p) => decode_polyline(&p.points, POLYLINE_PRECISION)?,
        None => Vec::new(),
    };

    debug!("Received Google route with {} polyline points", polyline.len());

    Ok(DirectionsResponse {
        waypoint_order,
        legs,
        polyline,
    })
}

// Google API types

#[derive(Debug, Deserialize)]
struct DirectionsBody {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<GoogleRoute>,
}

#[derive(Debug, Deserialize)]
struct GoogleRoute {
    #[serde(default)]
    waypoint_order: Vec<usize>,
    #[serde(default)]
    legs: Vec<GoogleLeg>,
    #[serde(default)]
    overview_polyline: Option<OverviewPolyline>,
}

#[derive(Debug, Deserialize)]
struct GoogleLeg {
    distance: ValueField,
    duration: ValueField,
}

/// `{ "value": 1234, "text": "1.2 km" }`; only the numeric part is used
#[derive(Debug, Deserialize)]
struct ValueField {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> GoogleDirectionsClient {
        GoogleDirectionsClient::new(GoogleDirectionsConfig {
            base_url: "https://maps.example.com/".to_string(),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn request(optimize: bool) -> DirectionsRequest {
        DirectionsRequest {
            origin: Coordinates { lat: -23.55, lng: -46.63 },
            destination: Coordinates { lat: -22.9, lng: -47.06 },
            waypoints: vec![
                Coordinates { lat: -23.18, lng: -46.89 },
                Coordinates { lat: -23.3, lng: -46.7 },
            ],
            optimize_waypoints: optimize,
        }
    }

    #[test]
    fn test_build_url_with_optimized_waypoints() {
        let url = client(Some("k")).build_url(&request(true), "k");

        assert!(url.starts_with("https://maps.example.com/maps/api/directions/json?"));
        assert!(url.contains("origin=-23.55,-46.63"));
        assert!(url.contains("destination=-22.9,-47.06"));
        assert!(url.contains("waypoints=optimize%3Atrue%7C-23.18%2C-46.89%7C-23.3%2C-46.7"));
        assert!(url.ends_with("&key=k"));
    }

    #[test]
    fn test_build_url_without_optimization() {
        let url = client(Some("k")).build_url(&request(false), "k");
        assert!(!url.contains("optimize"));
        assert!(url.contains("waypoints=-23.18%2C-46.89%7C-23.3%2C-46.7"));
    }

    #[test]
    fn test_build_url_without_waypoints() {
        let mut direct = request(true);
        direct.waypoints.clear();
        let url = client(Some("k")).build_url(&direct, "k");
        assert!(!url.contains("waypoints"));
    }

    #[test]
    fn test_readiness_depends_on_key() {
        assert!(client(Some("k")).is_ready());
        assert!(!client(None).is_ready());
        assert_eq!(client(None).name(), "Google");
    }

    #[tokio::test]
    async fn test_directions_without_key_is_not_ready() {
        let result = client(None).directions(&request(true)).await;
        assert!(matches!(result, Err(DirectionsError::NotReady)));
    }

    #[test]
    fn test_parse_ok_body() {
        let raw = r#"{
            "status": "OK",
            "routes": [{
                "waypoint_order": [1, 0],
                "legs": [
                    { "distance": { "value": 1000, "text": "1 km" }, "duration": { "value": 120, "text": "2 mins" } },
                    { "distance": { "value": 2000, "text": "2 km" }, "duration": { "value": 240, "text": "4 mins" } },
                    { "distance": { "value": 3000, "text": "3 km" }, "duration": { "value": 360, "text": "6 mins" } }
                ],
                "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" }
            }]
        }"#;
        let body: DirectionsBody = serde_json::from_str(raw).unwrap();
        let response = parse_body(body, 2).unwrap();

        assert_eq!(response.waypoint_order, vec![1, 0]);
        assert_eq!(response.legs.len(), 3);
        assert_eq!(response.legs[2].distance_meters, 3000.0);
        assert_eq!(response.legs[0].duration_seconds, 120.0);
        assert_eq!(response.polyline.len(), 3);
    }

    #[test]
    fn test_parse_defaults_waypoint_order_to_identity() {
        let raw = r#"{
            "status": "OK",
            "routes": [{
                "legs": [
                    { "distance": { "value": 1000 }, "duration": { "value": 60 } },
                    { "distance": { "value": 1000 }, "duration": { "value": 60 } }
                ]
            }]
        }"#;
        let body: DirectionsBody = serde_json::from_str(raw).unwrap();
        let response = parse_body(body, 1).unwrap();

        assert_eq!(response.waypoint_order, vec![0]);
        assert!(response.polyline.is_empty());
    }

    #[test]
    fn test_parse_error_status() {
        let raw = r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "routes": [] }"#;
        let body: DirectionsBody = serde_json::from_str(raw).unwrap();

        match parse_body(body, 0) {
            Err(DirectionsError::Api { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ok_without_routes_is_invalid() {
        let body: DirectionsBody = serde_json::from_str(r#"{ "status": "OK", "routes": [] }"#).unwrap();
        assert!(matches!(parse_body(body, 0), Err(DirectionsError::InvalidResponse(_))));
    }

    #[tokio::test]
    #[ignore = "Requires GOOGLE_MAPS_API_KEY and network access"]
    async fn test_google_integration_sao_paulo_campinas() {
        let key = std::env::var("GOOGLE_MAPS_API_KEY").unwrap();
        let client = GoogleDirectionsClient::new(GoogleDirectionsConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: Some(key),
            timeout: Duration::from_secs(10),
        })
        .unwrap();

        let response = client.directions(&request(true)).await.unwrap();
        assert_eq!(response.legs.len(), 3);
        assert!(response.polyline.len() > 10);
    }
}
