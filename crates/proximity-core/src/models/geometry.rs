//! Canonical geometry types used across all proximity crates.
//!
//! These types provide a bridge between GeoJSON serialization and the
//! computational geo crate types.

use serde::{Deserialize, Serialize};

use super::reference::ReferenceId;

/// Spatial relationship requested from a layer query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpatialPredicate {
    /// Geometry is completely within the query geometry
    Within,
    /// Geometry intersects (overlaps) the query geometry
    #[default]
    Intersects,
    /// Geometry contains the query geometry
    Contains,
    /// Bounding boxes intersect (fast approximation)
    BoundingBox,
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

/// GeoJSON-compatible geometry representation
///
/// This enum directly maps to GeoJSON geometry types with coordinate arrays.
/// It can be serialized/deserialized as GeoJSON and converted to/from `geo` crate types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPoint { .. } => GeometryType::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
        }
    }
}

/// Polygon searched around a clicked point
///
/// Rings are closed (first vertex repeated last); the first ring is the
/// exterior. A search area is created by the buffer builder or the
/// normalizer and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    rings: Vec<Vec<[f64; 2]>>,
    reference: ReferenceId,
}

impl SearchArea {
    pub fn new(rings: Vec<Vec<[f64; 2]>>, reference: ReferenceId) -> Self {
        Self { rings, reference }
    }

    pub fn rings(&self) -> &[Vec<[f64; 2]>] {
        &self.rings
    }

    pub fn reference(&self) -> ReferenceId {
        self.reference
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    /// The area as a polygon geometry in its own reference
    pub fn to_geometry(&self) -> Geometry {
        Geometry::polygon(self.rings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serialization() {
        let point = Geometry::point(115.0, -8.5);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("Point"));
        assert!(json.contains("115"));

        let parsed: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_geojson_value_parsing() {
        let value = serde_json::json!({
            "type": "LineString",
            "coordinates": [[0.0, 0.0], [1.0, 1.0]]
        });
        let geometry: Geometry = serde_json::from_value(value).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::LineString);
        assert!(serde_json::from_value::<Geometry>(serde_json::json!({"type": "Circle"})).is_err());
    }

    #[test]
    fn test_search_area_geometry() {
        let area = SearchArea::new(
            vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            ReferenceId::WEB_MERCATOR,
        );
        assert_eq!(area.vertex_count(), 4);
        assert_eq!(area.reference(), ReferenceId(3857));
        assert!(matches!(area.to_geometry(), Geometry::Polygon { .. }));
    }
}
