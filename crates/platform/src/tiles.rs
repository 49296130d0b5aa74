//! Tile URL resolution with a rendered-image fallback.

use tracing::warn;

use floodmap_core::{Image, VisParams};

use crate::error::Result;
use crate::service::PlatformService;

/// Resolve a tile URL template for `image`.
///
/// Without explicit `visualization` the water ramp default applies.
/// The primary path asks for a map of the raw image with the
/// visualization parameters attached; if that fails for any reason, the
/// image is first rendered server-side with the same parameters and a
/// map is requested for the rendered result with no further
/// visualization. A second failure propagates unchanged.
pub fn get_tile_url<S: PlatformService + ?Sized>(
    service: &S,
    image: &Image,
    visualization: Option<&VisParams>,
) -> Result<String> {
    let default_vis;
    let vis = match visualization {
        Some(vis) => vis,
        None => {
            default_vis = VisParams::default();
            &default_vis
        }
    };

    match service.create_map(image, Some(vis)) {
        Ok(url) => Ok(url),
        Err(primary) => {
            warn!(error = %primary, "map request failed; retrying with a pre-rendered image");
            let rendered = image.visualize(vis);
            service.create_map(&rendered, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use floodmap_core::{Collection, Expr, ImageCollection};
    use serde_json::Value;
    use std::cell::RefCell;

    /// Records map requests; fails the first `failures` of them.
    struct FlakyMaps {
        failures: usize,
        calls: RefCell<Vec<(Image, Option<VisParams>)>>,
    }

    impl FlakyMaps {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PlatformService for FlakyMaps {
        fn ensure_initialized(&mut self) -> bool {
            true
        }

        fn initialize(&mut self) -> Result<()> {
            Ok(())
        }

        fn compute_value(&self, _expression: &Expr) -> Result<Value> {
            unreachable!("not used by these tests")
        }

        fn create_map(&self, image: &Image, vis: Option<&VisParams>) -> Result<String> {
            let mut calls = self.calls.borrow_mut();
            calls.push((image.clone(), vis.cloned()));
            if calls.len() <= self.failures {
                return Err(PlatformError::Network("map service unavailable".into()));
            }
            Ok("https://tiles.example.com/v1/maps/demo/tiles/{z}/{x}/{y}".to_string())
        }
    }

    fn test_image() -> Image {
        ImageCollection::load(&Collection::Sentinel2Sr).median()
    }

    #[test]
    fn primary_path_passes_visualization_through() {
        let service = FlakyMaps::new(0);
        let url = get_tile_url(&service, &test_image(), None).unwrap();
        assert!(url.contains("{z}") && url.contains("{x}") && url.contains("{y}"));

        let calls = service.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, Some(VisParams::default()));
        assert_eq!(calls[0].0, test_image());
    }

    #[test]
    fn fallback_renders_then_requests_bare_map() {
        let service = FlakyMaps::new(1);
        let url = get_tile_url(&service, &test_image(), None).unwrap();
        assert!(!url.is_empty());

        let calls = service.calls.borrow();
        assert_eq!(calls.len(), 2);
        // Second request: rendered image, no visualization parameters.
        assert_eq!(calls[1].1, None);
        assert!(matches!(calls[1].0.expr(), Expr::Visualize { .. }));
        assert_eq!(calls[1].0, test_image().visualize(&VisParams::default()));
    }

    #[test]
    fn second_failure_propagates() {
        let service = FlakyMaps::new(2);
        let err = get_tile_url(&service, &test_image(), None).unwrap_err();
        assert!(matches!(err, PlatformError::Network(_)));
    }

    #[test]
    fn explicit_visualization_overrides_the_default() {
        let service = FlakyMaps::new(0);
        let vis = VisParams::new(-1.0, 1.0).palette(&["#000000", "#FFFFFF"]);
        get_tile_url(&service, &test_image(), Some(&vis)).unwrap();
        assert_eq!(service.calls.borrow()[0].1, Some(vis));
    }
}
