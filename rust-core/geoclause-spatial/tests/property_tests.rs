// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for spatial primitives

use geoclause_spatial::{close_ring, BoundingBox, FeatureGeometry, PolygonSource};
use proptest::prelude::*;

/// Generate a valid (south-west, north-east) bounding box
fn arb_bounds() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-90.0f64..90.0, -180.0f64..180.0).prop_flat_map(|(lat, lon)| {
        (Just(lat), Just(lon), lat..=90.0, lon..=180.0)
    })
}

proptest! {
    #[test]
    fn test_bounding_box_ring_contains_corners((min_lat, min_lon, max_lat, max_lon) in arb_bounds()) {
        let bounds = BoundingBox::new(min_lat, min_lon, max_lat, max_lon).unwrap();
        let ring = bounds.as_geometry();

        prop_assert_eq!(ring.len(), 5);
        prop_assert_eq!(ring[0], ring[4]);
        prop_assert!(ring.contains(&[min_lon, min_lat]));
        prop_assert!(ring.contains(&[max_lon, max_lat]));
    }

    #[test]
    fn test_close_ring_is_idempotent(points in prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 1..12)) {
        let ring: Vec<[f64; 2]> = points.into_iter().map(|(x, y)| [x, y]).collect();
        let closed = close_ring(ring);
        prop_assert_eq!(closed.first(), closed.last());
        prop_assert_eq!(close_ring(closed.clone()), closed);
    }

    #[test]
    fn test_polygon_geojson_roundtrip(points in prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 3..8)) {
        let ring = close_ring(points.into_iter().map(|(x, y)| [x, y]).collect());
        let geometry = FeatureGeometry::Polygon(vec![ring]);
        let parsed = FeatureGeometry::from_geojson(&geometry.to_geojson()).unwrap();
        prop_assert_eq!(parsed, geometry);
    }
}
