//! Error types for floodmap core.

use thiserror::Error;

/// Errors raised locally, before any remote request is made.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported area of interest: {found} (provide a bbox [minX, minY, maxX, maxY] or a GeoJSON Polygon)")]
    InvalidAreaOfInterest { found: String },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
