//! Imagery loading: filter, composite, clip.
//!
//! Builds the filtered-collection expression for an area of interest,
//! date range and cloud-cover ceiling, takes the per-pixel median
//! composite clipped to the area, and hands back the composite together
//! with a deferred image count. Everything here is expression building;
//! the network is touched only when the count is forced.

use floodmap_core::{AreaOfInterest, Collection, Expr, Image, ImageCollection};

use crate::error::{PlatformError, Result};
use crate::service::PlatformService;

/// Deferred count of images contributing to a composite.
///
/// Holds the unforced collection-size expression; the remote round trip
/// happens only in [`resolve`](Self::resolve). The count depends on
/// collection membership alone, so forcing order relative to the
/// composite is irrelevant.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCount {
    expr: Expr,
}

impl ImageCount {
    pub(crate) fn new(expr: Expr) -> Self {
        Self { expr }
    }

    /// Force the count.
    pub fn resolve<S: PlatformService + ?Sized>(&self, service: &S) -> Result<u64> {
        let value = service.compute_value(&self.expr)?;
        value
            .as_u64()
            .ok_or_else(|| {
                PlatformError::Decode(format!("expected an integer image count, got {value}"))
            })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// Build the clipped median composite for the given area, date range
/// and cloud-cover ceiling, plus the deferred count of contributing
/// images.
///
/// Date semantics are the platform's: start inclusive, end exclusive.
/// Neither the date ordering nor the cloud percentage is validated
/// locally; a bad value is rejected remotely at evaluation time.
pub fn load_imagery(
    collection: &Collection,
    aoi: &AreaOfInterest,
    start_date: &str,
    end_date: &str,
    cloud_pct: u32,
) -> Result<(Image, ImageCount)> {
    let geometry = aoi.to_geometry()?;

    let filtered = ImageCollection::load(collection)
        .filter_bounds(&geometry)
        .filter_date(start_date, end_date)
        .filter_lte(collection.cloud_cover_property(), f64::from(cloud_pct));

    let count = ImageCount::new(filtered.size());
    let image = filtered.median().clip(&geometry);

    Ok((image, count))
}
