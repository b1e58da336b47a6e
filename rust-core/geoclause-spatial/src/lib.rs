// SPDX-License-Identifier: PMPL-1.0-or-later
//! Geoclause Spatial
//!
//! Geometry primitives consumed by spatial query predicates.
//!
//! # Architecture
//!
//! - **Position / Ring**: GeoJSON-ordered `[x, y]` pairs (longitude first) and
//!   closed sequences of them.
//! - **BoundingBox**: south-west / north-east corners of a map viewport.
//! - **FeatureGeometry**: the geometry carried by a feature, serialized in
//!   GeoJSON shape (`{"type": "Polygon", "coordinates": [...]}`).
//! - **PolygonSource** trait: anything that can produce the outer ring of a
//!   polygon. Geometry operands built from a `PolygonSource` are normalized
//!   into GeoJSON polygons when a predicate is constructed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Spatial-specific errors
#[derive(Error, Debug, PartialEq)]
pub enum SpatialError {
    /// Invalid coordinate values (out of WGS84 range, NaN, etc.)
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Bounding box corners are inverted
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// Geometry value could not be read as GeoJSON
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// A single `[x, y]` position (longitude, latitude for WGS84).
pub type Position = [f64; 2];

/// A closed sequence of positions. The first and last position are equal.
pub type Ring = Vec<Position>;

/// Close a ring by repeating its first position, if it is not closed already.
pub fn close_ring(mut ring: Ring) -> Ring {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Anything that can be converted into the outer ring of a polygon.
///
/// Map viewports, drawn shapes and selection outlines implement this so that
/// `intersects` predicates can be built from them directly.
pub trait PolygonSource {
    /// The outer ring of the polygon, in `[x, y]` order.
    fn as_geometry(&self) -> Ring;
}

/// Supported geometry types.
///
/// Follows the OGC Simple Features specification naming.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// A single point in 2D space
    Point,
    /// An ordered sequence of points forming a line
    LineString,
    /// A closed ring of points forming a polygon
    Polygon,
    /// A collection of points
    MultiPoint,
    /// A collection of polygons
    MultiPolygon,
}

impl GeometryType {
    /// Whether geometries of this type enclose an area.
    pub fn is_polygonal(self) -> bool {
        matches!(self, GeometryType::Polygon | GeometryType::MultiPolygon)
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryType::Point => write!(f, "Point"),
            GeometryType::LineString => write!(f, "LineString"),
            GeometryType::Polygon => write!(f, "Polygon"),
            GeometryType::MultiPoint => write!(f, "MultiPoint"),
            GeometryType::MultiPolygon => write!(f, "MultiPolygon"),
        }
    }
}

/// Geometry of a feature, serialized in GeoJSON shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "coordinates")]
pub enum FeatureGeometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Ring>),
    MultiPoint(Vec<Position>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl FeatureGeometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            FeatureGeometry::Point(_) => GeometryType::Point,
            FeatureGeometry::LineString(_) => GeometryType::LineString,
            FeatureGeometry::Polygon(_) => GeometryType::Polygon,
            FeatureGeometry::MultiPoint(_) => GeometryType::MultiPoint,
            FeatureGeometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// GeoJSON object for this geometry.
    pub fn to_geojson(&self) -> Value {
        let coordinates = match self {
            FeatureGeometry::Point(p) => json!(p),
            FeatureGeometry::LineString(line) | FeatureGeometry::MultiPoint(line) => json!(line),
            FeatureGeometry::Polygon(rings) => json!(rings),
            FeatureGeometry::MultiPolygon(polygons) => json!(polygons),
        };
        json!({ "type": self.geometry_type().to_string(), "coordinates": coordinates })
    }

    /// Parse a GeoJSON geometry object.
    pub fn from_geojson(value: &Value) -> Result<Self, SpatialError> {
        serde_json::from_value(value.clone())
            .map_err(|e| SpatialError::InvalidGeometry(e.to_string()))
    }
}

/// GeoJSON polygon with a single outer ring, the normalized form of a
/// [`PolygonSource`].
pub fn polygon_geojson(ring: Ring) -> Value {
    json!({ "type": "Polygon", "coordinates": [ring] })
}

/// A bounding box, typically the current map viewport.
///
/// Defined by the south-west (min) and north-east (max) corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a bounding box, validating WGS84 range and corner order.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self, SpatialError> {
        for lat in [min_lat, max_lat] {
            if lat.is_nan() || !(-90.0..=90.0).contains(&lat) {
                return Err(SpatialError::InvalidCoordinates(format!(
                    "Latitude {} out of range [-90, 90]",
                    lat
                )));
            }
        }
        for lon in [min_lon, max_lon] {
            if lon.is_nan() || !(-180.0..=180.0).contains(&lon) {
                return Err(SpatialError::InvalidCoordinates(format!(
                    "Longitude {} out of range [-180, 180]",
                    lon
                )));
            }
        }
        if min_lat > max_lat || min_lon > max_lon {
            return Err(SpatialError::InvalidBounds(format!(
                "south-west ({}, {}) is not below north-east ({}, {})",
                min_lat, min_lon, max_lat, max_lon
            )));
        }
        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }
}

impl PolygonSource for BoundingBox {
    /// Counter-clockwise ring starting at the south-west corner.
    fn as_geometry(&self) -> Ring {
        vec![
            [self.min_lon, self.min_lat],
            [self.max_lon, self.min_lat],
            [self.max_lon, self.max_lat],
            [self.min_lon, self.max_lat],
            [self.min_lon, self.min_lat],
        ]
    }
}
