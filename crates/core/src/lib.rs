//! # Floodmap Core
//!
//! Pure types for the floodmap water-index agent.
//!
//! This crate provides:
//! - `AreaOfInterest` / `Geometry`: user-supplied regions and their
//!   platform-native representation
//! - `Expr`, `ImageCollection`, `Image`: the server-side expression
//!   vocabulary and its JSON wire encoding
//! - `Collection`: well-known optical imagery collections
//! - Spectral index expression builders (`ndwi` and friends)
//!
//! Nothing in this crate performs I/O. All imagery filtering,
//! compositing and pixel arithmetic happens remotely; the types here
//! only describe the computation to request.

pub mod error;
pub mod expression;
pub mod geometry;
pub mod indices;

pub use error::{Error, Result};
pub use expression::{Collection, Expr, Image, ImageCollection, Reducer, VisParams};
pub use geometry::{AreaOfInterest, Geometry};
pub use indices::{mndwi, ndvi, ndwi, normalized_difference};
