//! The NDWI orchestrator.
//!
//! Composes initialization, imagery loading, index construction, tile
//! resolution and the statistics reduction into one blocking `run`
//! call. The call either fully succeeds with a [`RunResult`] or fails
//! with the first error; there are no partial results.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use floodmap_core::{ndwi, AreaOfInterest, Collection, Reducer};

use crate::error::{PlatformError, Result};
use crate::imagery::load_imagery;
use crate::service::{uninitialized_guidance, PlatformService};
use crate::tiles::get_tile_url;

/// Spatial resolution of the statistics reduction, in meters.
pub const STATS_SCALE: f64 = 30.0;

/// Pixel budget of the statistics reduction, bounding remote cost.
pub const STATS_MAX_PIXELS: u64 = 1_000_000;

/// Demonstration area: San Francisco Bay.
pub const DEMO_AOI: [f64; 4] = [-122.6, 37.6, -122.2, 37.9];
pub const DEMO_START_DATE: &str = "2023-01-01";
pub const DEMO_END_DATE: &str = "2023-02-01";

// ---------------------------------------------------------------------------
// Run parameters and result
// ---------------------------------------------------------------------------

/// Tunable parameters of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    /// Cloud-cover ceiling in percent (unvalidated; the platform
    /// rejects nonsense at evaluation time).
    pub cloud_pct: u32,
    /// Green band name.
    pub green_band: String,
    /// Near-infrared band name.
    pub nir_band: String,
}

impl RunParams {
    pub fn cloud_pct(mut self, pct: u32) -> Self {
        self.cloud_pct = pct;
        self
    }

    pub fn bands(mut self, green: &str, nir: &str) -> Self {
        self.green_band = green.to_string();
        self.nir_band = nir.to_string();
        self
    }
}

impl Default for RunParams {
    /// Sentinel-2 defaults: 20% ceiling, green `B3`, NIR `B8`.
    fn default() -> Self {
        Self {
            cloud_pct: 20,
            green_band: "B3".to_string(),
            nir_band: "B8".to_string(),
        }
    }
}

/// Output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Number of images contributing to the composite.
    pub images_used: u64,
    /// Tile URL template with `{z}/{x}/{y}` placeholders.
    pub ndwi_tile_url: String,
    /// Statistics of the index over the area (`mean`, `min`, `max`).
    pub ndwi_stats: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Computes an NDWI raster and its summary statistics for an area of
/// interest and date range.
pub struct FloodMapper<S> {
    service: S,
    collection: Collection,
}

impl<S: PlatformService> FloodMapper<S> {
    /// Create an agent over Sentinel-2 surface reflectance.
    pub fn new(service: S) -> Self {
        Self {
            service,
            collection: Collection::Sentinel2Sr,
        }
    }

    /// Use a different imagery collection.
    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collection = collection;
        self
    }

    /// The underlying platform service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run the full pipeline.
    ///
    /// Fails with [`PlatformError::Uninitialized`] when no
    /// initialization strategy succeeds; every other failure is the
    /// first remote error, surfaced as-is.
    pub fn run(
        &mut self,
        aoi: &AreaOfInterest,
        start_date: &str,
        end_date: &str,
        params: &RunParams,
    ) -> Result<RunResult> {
        if !self.service.ensure_initialized() {
            if let Err(cause) = self.service.initialize() {
                return Err(PlatformError::Uninitialized {
                    guidance: uninitialized_guidance(&cause),
                });
            }
        }

        let (image, count) =
            load_imagery(&self.collection, aoi, start_date, end_date, params.cloud_pct)?;
        let images_used = count.resolve(&self.service)?;
        debug!(images_used, "filtered collection resolved");

        let index = ndwi(&image, &params.green_band, &params.nir_band);
        let ndwi_tile_url = get_tile_url(&self.service, &index, None)?;

        // Statistics over the AOI, converted independently of the
        // loader's internal conversion.
        let geometry = aoi.to_geometry()?;
        let reducer = Reducer::mean().combine(Reducer::min_max(), true);
        let stats_expr = index.reduce_region(reducer, &geometry, STATS_SCALE, STATS_MAX_PIXELS);
        let ndwi_stats = as_stats(self.service.compute_value(&stats_expr)?)?;

        Ok(RunResult {
            images_used,
            ndwi_tile_url,
            ndwi_stats,
        })
    }

    /// Run over the demonstration bay area and a fixed winter month,
    /// with default parameters. Useful as a smoke test.
    pub fn run_demo(&mut self) -> Result<RunResult> {
        let aoi = AreaOfInterest::from(DEMO_AOI);
        self.run(&aoi, DEMO_START_DATE, DEMO_END_DATE, &RunParams::default())
    }
}

/// Unwrap a statistics mapping into named floats.
fn as_stats(value: serde_json::Value) -> Result<BTreeMap<String, f64>> {
    let object = value.as_object().ok_or_else(|| {
        PlatformError::Decode(format!("expected a statistics mapping, got {value}"))
    })?;

    let mut stats = BTreeMap::new();
    for (name, stat) in object {
        let number = stat.as_f64().ok_or_else(|| {
            PlatformError::Decode(format!("statistic {name} is not numeric: {stat}"))
        })?;
        stats.insert(name.clone(), number);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_params_match_sentinel2() {
        let params = RunParams::default();
        assert_eq!(params.cloud_pct, 20);
        assert_eq!(params.green_band, "B3");
        assert_eq!(params.nir_band, "B8");
    }

    #[test]
    fn params_builders_chain() {
        let params = RunParams::default().cloud_pct(35).bands("SR_B3", "SR_B5");
        assert_eq!(params.cloud_pct, 35);
        assert_eq!(params.green_band, "SR_B3");
        assert_eq!(params.nir_band, "SR_B5");
    }

    #[test]
    fn stats_mapping_unwraps_to_floats() {
        let stats = as_stats(json!({"mean": 0.12, "min": -0.8, "max": 0.9})).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats["mean"], 0.12);
        assert_eq!(stats["min"], -0.8);
        assert_eq!(stats["max"], 0.9);
    }

    #[test]
    fn non_numeric_statistic_is_a_decode_error() {
        assert!(matches!(
            as_stats(json!({"mean": "n/a"})),
            Err(PlatformError::Decode(_))
        ));
        assert!(matches!(
            as_stats(json!(3.0)),
            Err(PlatformError::Decode(_))
        ));
    }
}
