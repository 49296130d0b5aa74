//! Spectral index expression builders.
//!
//! Common remote sensing indices expressed as server-side band
//! arithmetic. Each builder selects the relevant bands from a composite
//! and returns the index expression; the platform does the pixel work.

use crate::expression::Image;

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Build the normalized difference of two single-band images:
///
/// `(a - b) / (a + b)`
///
/// Pixels where `a + b == 0` are left to the platform's floating-point
/// semantics; no masking is applied.
pub fn normalized_difference(a: &Image, b: &Image) -> Image {
    a.subtract(b).divide(&a.add(b))
}

// ---------------------------------------------------------------------------
// NDWI
// ---------------------------------------------------------------------------

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// `NDWI = (Green - NIR) / (Green + NIR)`
///
/// Positive values indicate water bodies. The output band is renamed to
/// `"NDWI"` and clamped to [-1, 1].
///
/// # Arguments
/// * `green_band` - Green band name (e.g. `"B3"` for Sentinel-2)
/// * `nir_band` - Near-infrared band name (e.g. `"B8"`)
pub fn ndwi(image: &Image, green_band: &str, nir_band: &str) -> Image {
    let green = image.select(green_band);
    let nir = image.select(nir_band);
    normalized_difference(&green, &nir)
        .rename("NDWI")
        .clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// NDVI
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
pub fn ndvi(image: &Image, nir_band: &str, red_band: &str) -> Image {
    normalized_difference(&image.select(nir_band), &image.select(red_band))
}

// ---------------------------------------------------------------------------
// MNDWI
// ---------------------------------------------------------------------------

/// Modified Normalized Difference Water Index (Xu, 2006)
///
/// `MNDWI = (Green - SWIR) / (Green + SWIR)`
///
/// Better discrimination between water and built-up areas than NDWI.
pub fn mndwi(image: &Image, green_band: &str, swir_band: &str) -> Image {
    normalized_difference(&image.select(green_band), &image.select(swir_band))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
