//! Wire models for the platform's REST API.
//!
//! Lightweight serde models for the request and response bodies this
//! crate exchanges with the platform: expression evaluation, map
//! creation, and the structured error envelope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use floodmap_core::{Expr, VisParams};

use crate::error::PlatformError;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body for `POST /v1/projects/{project}/value:compute`.
#[derive(Debug, Serialize)]
pub struct ComputeValueRequest<'a> {
    pub expression: &'a Expr,
}

/// Body for `POST /v1/projects/{project}/maps`.
#[derive(Debug, Serialize)]
pub struct CreateMapRequest<'a> {
    pub expression: &'a Expr,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<&'a VisParams>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response of `value:compute`: the forced value of the expression.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueResponse {
    pub result: Value,
}

/// Response of map creation: a server-side map resource.
#[derive(Debug, Clone, Deserialize)]
pub struct MapResponse {
    /// Resource path of the created map (e.g. `projects/p/maps/abc123`).
    pub name: String,

    /// Fields we don't model explicitly.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl MapResponse {
    /// The tile URL template for this map, with `{z}/{x}/{y}`
    /// placeholders for standard tile-consuming clients.
    pub fn tile_url_template(&self, base_url: &str) -> String {
        format!(
            "{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}",
            base_url.trim_end_matches('/'),
            self.name
        )
    }
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Structured error body returned by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorStatus {
    #[serde(default)]
    pub code: Option<i64>,

    pub message: String,

    #[serde(default)]
    pub status: Option<String>,
}

/// Convert a non-success HTTP response body into a [`PlatformError`].
///
/// Prefers the platform's structured envelope; falls back to the HTTP
/// status and a body snippet when the body is not structured.
pub fn api_error(http_status: reqwest::StatusCode, body: &str) -> PlatformError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(envelope) => PlatformError::Api {
            status: envelope
                .error
                .status
                .unwrap_or_else(|| http_status.to_string()),
            message: envelope.error.message,
        },
        Err(_) => PlatformError::Api {
            status: http_status.to_string(),
            message: body.chars().take(500).collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use floodmap_core::{Collection, ImageCollection};
    use serde_json::json;

    #[test]
    fn map_response_parses_and_builds_template() {
        let raw = r#"{
            "name": "projects/demo/maps/abc123",
            "expiresAt": "2023-02-01T00:00:00Z"
        }"#;
        let resp: MapResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.name, "projects/demo/maps/abc123");
        assert!(resp.extra.contains_key("expiresAt"));

        let template = resp.tile_url_template("https://earthengine.googleapis.com/");
        assert_eq!(
            template,
            "https://earthengine.googleapis.com/v1/projects/demo/maps/abc123/tiles/{z}/{x}/{y}"
        );
    }

    #[test]
    fn value_response_parses() {
        let resp: ValueResponse = serde_json::from_str(r#"{"result": 7}"#).unwrap();
        assert_eq!(resp.result, json!(7));
    }

    #[test]
    fn create_map_request_omits_missing_visualization() {
        let image = ImageCollection::load(&Collection::Sentinel2Sr).median();
        let req = CreateMapRequest {
            expression: image.expr(),
            visualization: None,
        };
        let encoded = serde_json::to_value(&req).unwrap();
        assert!(encoded.get("visualization").is_none());
        assert_eq!(encoded["expression"]["op"], "median");
    }

    #[test]
    fn structured_error_body_is_preferred() {
        let body = r#"{"error": {"code": 403, "message": "Not signed up", "status": "PERMISSION_DENIED"}}"#;
        let err = api_error(reqwest::StatusCode::FORBIDDEN, body);
        match err {
            PlatformError::Api { status, message } => {
                assert_eq!(status, "PERMISSION_DENIED");
                assert_eq!(message, "Not signed up");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn unstructured_error_body_falls_back_to_snippet() {
        let err = api_error(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        match err {
            PlatformError::Api { status, message } => {
                assert_eq!(status, "502 Bad Gateway");
                assert!(message.contains("bad gateway"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
