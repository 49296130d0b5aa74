//! Server-side expression vocabulary and its JSON wire encoding.
//!
//! The platform evaluates named operations over opaque handles; locally
//! an [`Expr`] tree only *describes* the computation. [`ImageCollection`]
//! and [`Image`] wrap the tree with chained builders so request
//! construction reads the way the computation is meant to run. Building
//! expressions is pure and infallible; nothing here touches the network.

use serde::Serialize;
use serde_json::Value;

use crate::geometry::Geometry;

// ---------------------------------------------------------------------------
// Well-known collections
// ---------------------------------------------------------------------------

/// Well-known optical imagery collections plus custom identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    /// Sentinel-2 surface reflectance.
    Sentinel2Sr,
    /// Landsat 9 Collection 2 Tier 1 Level-2.
    Landsat9L2,
    /// Any collection (provide the platform's asset identifier).
    Custom(String),
}

impl Collection {
    /// The platform asset identifier for this collection.
    pub fn id(&self) -> &str {
        match self {
            Self::Sentinel2Sr => "COPERNICUS/S2_SR",
            Self::Landsat9L2 => "LANDSAT/LC09/C02/T1_L2",
            Self::Custom(id) => id,
        }
    }

    /// The per-image metadata property holding cloud cover percentage.
    ///
    /// Custom collections get the EO-convention `CLOUD_COVER` name.
    pub fn cloud_cover_property(&self) -> &str {
        match self {
            Self::Sentinel2Sr => "CLOUDY_PIXEL_PERCENTAGE",
            Self::Landsat9L2 | Self::Custom(_) => "CLOUD_COVER",
        }
    }

    /// Parse a shorthand string into a collection.
    ///
    /// Recognized shorthands: `"s2"`, `"sentinel-2"`, `"l9"`,
    /// `"landsat-9"`. Anything else is treated as a custom identifier.
    pub fn from_str_or_id(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "s2" | "sentinel-2" | "sentinel2" => Self::Sentinel2Sr,
            "l9" | "landsat-9" | "landsat9" => Self::Landsat9L2,
            _ => Self::Custom(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Expression tree
// ---------------------------------------------------------------------------

/// One node of a server-side computation.
///
/// Serializes to the platform's wire form: an object tagged with `"op"`
/// whose remaining fields are the operation's arguments, with inputs
/// nested recursively.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Expr {
    LoadCollection {
        id: String,
    },
    FilterBounds {
        input: Box<Expr>,
        geometry: Geometry,
    },
    FilterDate {
        input: Box<Expr>,
        start: String,
        end: String,
    },
    /// Keep images whose metadata `property` is `<=` `value`.
    FilterLte {
        input: Box<Expr>,
        property: String,
        value: f64,
    },
    Median {
        input: Box<Expr>,
    },
    Size {
        input: Box<Expr>,
    },
    Clip {
        input: Box<Expr>,
        geometry: Geometry,
    },
    Select {
        input: Box<Expr>,
        band: String,
    },
    Add {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Subtract {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Divide {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Rename {
        input: Box<Expr>,
        bands: Vec<String>,
    },
    Clamp {
        input: Box<Expr>,
        min: f64,
        max: f64,
    },
    Visualize {
        input: Box<Expr>,
        visualization: VisParams,
    },
    #[serde(rename_all = "camelCase")]
    ReduceRegion {
        input: Box<Expr>,
        reducer: Reducer,
        geometry: Geometry,
        scale: f64,
        max_pixels: u64,
    },
}

/// A statistics reducer, applied server-side over a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reducer", rename_all = "camelCase")]
pub enum Reducer {
    Mean,
    MinMax,
    #[serde(rename_all = "camelCase")]
    Combine {
        first: Box<Reducer>,
        second: Box<Reducer>,
        shared_inputs: bool,
    },
}

impl Reducer {
    pub fn mean() -> Self {
        Self::Mean
    }

    pub fn min_max() -> Self {
        Self::MinMax
    }

    /// Combine with another reducer, optionally sharing inputs.
    pub fn combine(self, other: Reducer, shared_inputs: bool) -> Self {
        Self::Combine {
            first: Box::new(self),
            second: Box::new(other),
            shared_inputs,
        }
    }
}

// ---------------------------------------------------------------------------
// Visualization parameters
// ---------------------------------------------------------------------------

/// Visualization parameters for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    /// Ordered color stops; empty means the platform's default ramp.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
}

impl VisParams {
    /// Create parameters with the given value range and no palette.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            palette: Vec::new(),
        }
    }

    /// Set the color palette.
    pub fn palette(mut self, colors: &[&str]) -> Self {
        self.palette = colors.iter().map(|c| c.to_string()).collect();
        self
    }
}

impl Default for VisParams {
    /// The water-index ramp: blue through cyan to white over [-0.2, 0.8].
    fn default() -> Self {
        Self::new(-0.2, 0.8).palette(&["#0000FF", "#00FFFF", "#FFFFFF"])
    }
}

// ---------------------------------------------------------------------------
// Collection and image handles
// ---------------------------------------------------------------------------

/// A filtered view of a server-side image collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection {
    expr: Expr,
}

impl ImageCollection {
    /// Start from a well-known or custom collection.
    pub fn load(collection: &Collection) -> Self {
        Self {
            expr: Expr::LoadCollection {
                id: collection.id().to_string(),
            },
        }
    }

    /// Keep images intersecting `geometry`.
    pub fn filter_bounds(self, geometry: &Geometry) -> Self {
        Self {
            expr: Expr::FilterBounds {
                input: Box::new(self.expr),
                geometry: geometry.clone(),
            },
        }
    }

    /// Keep images acquired in `[start, end)` (ISO-8601 dates).
    pub fn filter_date(self, start: &str, end: &str) -> Self {
        Self {
            expr: Expr::FilterDate {
                input: Box::new(self.expr),
                start: start.to_string(),
                end: end.to_string(),
            },
        }
    }

    /// Keep images whose metadata `property` is at most `value`.
    pub fn filter_lte(self, property: &str, value: f64) -> Self {
        Self {
            expr: Expr::FilterLte {
                input: Box::new(self.expr),
                property: property.to_string(),
                value,
            },
        }
    }

    /// Per-pixel median composite across the collection.
    pub fn median(self) -> Image {
        Image {
            expr: Expr::Median {
                input: Box::new(self.expr),
            },
        }
    }

    /// The number of images in the collection, as an unforced expression.
    pub fn size(&self) -> Expr {
        Expr::Size {
            input: Box::new(self.expr.clone()),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// An opaque server-side image handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    expr: Expr,
}

impl Image {
    /// Clip to `geometry`.
    pub fn clip(self, geometry: &Geometry) -> Self {
        Self {
            expr: Expr::Clip {
                input: Box::new(self.expr),
                geometry: geometry.clone(),
            },
        }
    }

    /// Select a single named band.
    pub fn select(&self, band: &str) -> Self {
        Self {
            expr: Expr::Select {
                input: Box::new(self.expr.clone()),
                band: band.to_string(),
            },
        }
    }

    pub fn add(&self, other: &Image) -> Self {
        self.binary(other, |left, right| Expr::Add { left, right })
    }

    pub fn subtract(&self, other: &Image) -> Self {
        self.binary(other, |left, right| Expr::Subtract { left, right })
    }

    pub fn divide(&self, other: &Image) -> Self {
        self.binary(other, |left, right| Expr::Divide { left, right })
    }

    /// Rename the image's single band.
    pub fn rename(self, band: &str) -> Self {
        Self {
            expr: Expr::Rename {
                input: Box::new(self.expr),
                bands: vec![band.to_string()],
            },
        }
    }

    /// Clamp pixel values to `[min, max]`.
    pub fn clamp(self, min: f64, max: f64) -> Self {
        Self {
            expr: Expr::Clamp {
                input: Box::new(self.expr),
                min,
                max,
            },
        }
    }

    /// Render with the given visualization parameters.
    pub fn visualize(&self, visualization: &VisParams) -> Self {
        Self {
            expr: Expr::Visualize {
                input: Box::new(self.expr.clone()),
                visualization: visualization.clone(),
            },
        }
    }

    /// Reduce over `geometry` at `scale` with a pixel budget.
    pub fn reduce_region(
        &self,
        reducer: Reducer,
        geometry: &Geometry,
        scale: f64,
        max_pixels: u64,
    ) -> Expr {
        Expr::ReduceRegion {
            input: Box::new(self.expr.clone()),
            reducer,
            geometry: geometry.clone(),
            scale,
            max_pixels,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    fn binary(&self, other: &Image, build: impl FnOnce(Box<Expr>, Box<Expr>) -> Expr) -> Self {
        Self {
            expr: build(Box::new(self.expr.clone()), Box::new(other.expr.clone())),
        }
    }
}

impl From<Image> for Expr {
    fn from(image: Image) -> Self {
        image.expr
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_geometry() -> Geometry {
        Geometry::Rectangle {
            coordinates: [-122.6, 37.6, -122.2, 37.9],
        }
    }

    #[test]
    fn collection_ids_and_cloud_properties() {
        assert_eq!(Collection::Sentinel2Sr.id(), "COPERNICUS/S2_SR");
        assert_eq!(
            Collection::Sentinel2Sr.cloud_cover_property(),
            "CLOUDY_PIXEL_PERCENTAGE"
        );
        assert_eq!(Collection::Landsat9L2.cloud_cover_property(), "CLOUD_COVER");
        assert_eq!(
            Collection::Custom("MODIS/006/MOD09GA".into()).id(),
            "MODIS/006/MOD09GA"
        );
    }

    #[test]
    fn collection_shorthands() {
        assert_eq!(Collection::from_str_or_id("s2"), Collection::Sentinel2Sr);
        assert_eq!(
            Collection::from_str_or_id("Landsat-9"),
            Collection::Landsat9L2
        );
        assert!(matches!(
            Collection::from_str_or_id("MODIS/006/MOD09GA"),
            Collection::Custom(_)
        ));
    }

    #[test]
    fn filter_chain_nests_in_application_order() {
        let geom = demo_geometry();
        let col = ImageCollection::load(&Collection::Sentinel2Sr)
            .filter_bounds(&geom)
            .filter_date("2023-01-01", "2023-02-01")
            .filter_lte("CLOUDY_PIXEL_PERCENTAGE", 20.0);

        let encoded = serde_json::to_value(col.expr()).unwrap();
        assert_eq!(encoded["op"], "filterLte");
        assert_eq!(encoded["property"], "CLOUDY_PIXEL_PERCENTAGE");
        assert_eq!(encoded["input"]["op"], "filterDate");
        assert_eq!(encoded["input"]["start"], "2023-01-01");
        assert_eq!(encoded["input"]["input"]["op"], "filterBounds");
        assert_eq!(
            encoded["input"]["input"]["input"],
            json!({"op": "loadCollection", "id": "COPERNICUS/S2_SR"})
        );
    }

    #[test]
    fn median_clip_wraps_the_collection() {
        let geom = demo_geometry();
        let image = ImageCollection::load(&Collection::Sentinel2Sr)
            .filter_bounds(&geom)
            .median()
            .clip(&geom);

        let encoded = serde_json::to_value(image.expr()).unwrap();
        assert_eq!(encoded["op"], "clip");
        assert_eq!(encoded["input"]["op"], "median");
    }

    #[test]
    fn size_leaves_the_collection_untouched() {
        let col = ImageCollection::load(&Collection::Sentinel2Sr);
        let size = col.size();
        assert!(matches!(size, Expr::Size { .. }));
        // The collection is still usable after asking for its size.
        let _ = col.median();
    }

    #[test]
    fn reduce_region_serializes_camel_case() {
        let geom = demo_geometry();
        let image = ImageCollection::load(&Collection::Sentinel2Sr).median();
        let reducer = Reducer::mean().combine(Reducer::min_max(), true);
        let expr = image.reduce_region(reducer, &geom, 30.0, 1_000_000);

        let encoded = serde_json::to_value(&expr).unwrap();
        assert_eq!(encoded["op"], "reduceRegion");
        assert_eq!(encoded["scale"], 30.0);
        assert_eq!(encoded["maxPixels"], 1_000_000);
        assert_eq!(encoded["reducer"]["reducer"], "combine");
        assert_eq!(encoded["reducer"]["first"], json!({"reducer": "mean"}));
        assert_eq!(encoded["reducer"]["second"], json!({"reducer": "minMax"}));
        assert_eq!(encoded["reducer"]["sharedInputs"], true);
    }

    #[test]
    fn default_visualization_is_the_water_ramp() {
        let vis = VisParams::default();
        assert_eq!(vis.min, -0.2);
        assert_eq!(vis.max, 0.8);
        assert_eq!(vis.palette, vec!["#0000FF", "#00FFFF", "#FFFFFF"]);
    }

    #[test]
    fn empty_palette_is_omitted_from_the_wire() {
        let vis = VisParams::new(0.0, 1.0);
        let encoded = serde_json::to_value(&vis).unwrap();
        assert_eq!(encoded, json!({"min": 0.0, "max": 1.0}));
    }
}
