//! Conversions between the canonical proximity geometries and `geo` types.

use geo::{Coord, Geometry as GeoGeometry, LineString, MultiLineString, MultiPoint, MultiPolygon};
use geo::{Point, Polygon};

pub use proximity_core::models::{Geometry, SearchArea, SpatialPredicate};

fn to_coord(c: &[f64; 2]) -> Coord {
    Coord { x: c[0], y: c[1] }
}

fn to_line_string(coords: &[[f64; 2]]) -> LineString {
    LineString::new(coords.iter().map(to_coord).collect())
}

/// Build a polygon from GeoJSON-style rings, the first ring being the exterior
fn to_polygon(rings: &[Vec<[f64; 2]>]) -> Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(to_line_string(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(MultiPoint::new(
            coordinates.iter().map(|c| Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            MultiLineString::new(coordinates.iter().map(|line| to_line_string(line)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(MultiPolygon::new(
            coordinates.iter().map(|poly| to_polygon(poly)).collect(),
        )),
    }
}

/// The search area as a geo polygon in its own reference system
pub fn search_area_polygon(area: &SearchArea) -> Polygon {
    to_polygon(area.rings())
}
