//! # Floodmap Platform
//!
//! Client for the remote-sensing platform and the NDWI orchestration on
//! top of it. All imagery storage, filtering, compositing and tile
//! rendering happens server-side; this crate marshals the requests and
//! unwraps the responses.
//!
//! ## Typical use
//!
//! ```ignore
//! use floodmap_platform::{ClientOptions, FloodMapper, RestPlatform, RunParams};
//! use floodmap_core::AreaOfInterest;
//!
//! let service = RestPlatform::new(ClientOptions::from_env())?;
//! let mut mapper = FloodMapper::new(service);
//!
//! let aoi = AreaOfInterest::from([-122.6, 37.6, -122.2, 37.9]);
//! let result = mapper.run(&aoi, "2023-01-01", "2023-02-01", &RunParams::default())?;
//! println!("{} images, tiles at {}", result.images_used, result.ndwi_tile_url);
//! ```

pub mod agent;
pub mod auth;
pub mod client;
pub mod error;
pub mod imagery;
pub mod models;
pub mod service;
pub mod tiles;

pub use agent::{FloodMapper, RunParams, RunResult, STATS_MAX_PIXELS, STATS_SCALE};
pub use auth::{NoAuth, RequestAuth, TokenAuth};
pub use client::{ClientOptions, PlatformClient};
pub use error::{PlatformError, Result};
pub use imagery::{load_imagery, ImageCount};
pub use models::{MapResponse, ValueResponse};
pub use service::{PlatformService, RestPlatform};
pub use tiles::get_tile_url;
