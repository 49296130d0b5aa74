//! Areas of interest and their platform-native geometry.
//!
//! Callers describe a region either as a `[minX, minY, maxX, maxY]`
//! bounding box in WGS84 degrees or as a GeoJSON Polygon mapping. The
//! platform wants its own geometry shape, so [`AreaOfInterest`] converts
//! into [`Geometry`] and rejects everything else before a single byte
//! goes over the wire.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Area of interest
// ---------------------------------------------------------------------------

/// A user-supplied area of interest.
///
/// Exactly two shapes are accepted: an ordered bounding box or a GeoJSON
/// mapping whose `type` is `"Polygon"`. The GeoJSON variant is kept as
/// raw JSON; its `coordinates` are passed through to the platform
/// unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaOfInterest {
    /// `[minX, minY, maxX, maxY]` in WGS84 degrees.
    BoundingBox([f64; 4]),
    /// A GeoJSON geometry mapping (must be `"Polygon"`-typed).
    GeoJson(Value),
}

impl AreaOfInterest {
    /// Convert to the platform's native geometry.
    ///
    /// Fails with [`Error::InvalidAreaOfInterest`] when the GeoJSON
    /// variant is not a `"Polygon"`-typed mapping.
    pub fn to_geometry(&self) -> Result<Geometry> {
        match self {
            Self::BoundingBox(bounds) => Ok(Geometry::Rectangle {
                coordinates: *bounds,
            }),
            Self::GeoJson(value) => {
                let tag = value.get("type").and_then(Value::as_str);
                if tag != Some("Polygon") {
                    return Err(Error::InvalidAreaOfInterest {
                        found: describe(value),
                    });
                }
                let coordinates = value.get("coordinates").cloned().ok_or_else(|| {
                    Error::InvalidAreaOfInterest {
                        found: "Polygon without coordinates".to_string(),
                    }
                })?;
                Ok(Geometry::Polygon { coordinates })
            }
        }
    }
}

impl From<[f64; 4]> for AreaOfInterest {
    fn from(bounds: [f64; 4]) -> Self {
        Self::BoundingBox(bounds)
    }
}

impl From<(f64, f64, f64, f64)> for AreaOfInterest {
    fn from((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> Self {
        Self::BoundingBox([min_x, min_y, max_x, max_y])
    }
}

impl From<Value> for AreaOfInterest {
    fn from(value: Value) -> Self {
        Self::GeoJson(value)
    }
}

/// Short human-readable description of an unsupported GeoJSON value.
fn describe(value: &Value) -> String {
    match value.get("type").and_then(Value::as_str) {
        Some(tag) => format!("GeoJSON type {:?}", tag),
        None => match value {
            Value::Object(_) => "mapping without a \"type\" field".to_string(),
            other => format!("JSON {}", json_kind(other)),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Platform geometry
// ---------------------------------------------------------------------------

/// Platform-native geometry, as embedded in expression payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Axis-aligned rectangle from `[minX, minY, maxX, maxY]`.
    Rectangle { coordinates: [f64; 4] },
    /// Polygon with a nested ring structure, passed through unvalidated.
    Polygon { coordinates: Value },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
