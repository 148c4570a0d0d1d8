//! Search polygon construction around a clicked point.

use geo::{Destination, Haversine, Point};
use proximity_core::error::{ProximityError, Result};
use proximity_core::models::{Coordinate, ReferenceKind, SearchArea};

/// Vertices on a buffer ring, not counting the closing vertex
pub const BUFFER_SEGMENTS: usize = 64;

/// Half of the earth's circumference on the haversine sphere, in meters
const MAX_GEODESIC_RADIUS: f64 = std::f64::consts::PI * 6_371_008.8;

/// Half the width of the Web Mercator square, in meters
pub(crate) const WEB_MERCATOR_EXTENT: f64 = 20_037_508.342_789_244;

/// Buffer a point into a closed search polygon in the point's own reference
///
/// Metric systems are buffered in the plane; geographic points are buffered
/// geodesically so the radius stays in meters. Geographic rings that cross the
/// antimeridian extend past ±180° longitude, and rings around a pole are
/// closed along it; features stored on the far side of the antimeridian are
/// not matched.
pub fn build_search_area(point: &Coordinate, radius_meters: f64) -> Result<SearchArea> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(ProximityError::geometry(format!(
            "buffer radius must be a positive number of meters, got {}",
            radius_meters
        )));
    }

    if !point.is_finite() {
        return Err(ProximityError::geometry(format!(
            "degenerate point ({}, {})",
            point.x(),
            point.y()
        )));
    }

    let reference = point.reference();
    let kind = reference.kind().ok_or_else(|| {
        ProximityError::geometry(format!("unsupported spatial reference WKID {}", reference))
    })?;

    let ring = match kind {
        ReferenceKind::Geographic => geodesic_ring(point, radius_meters)?,
        ReferenceKind::WebMercator => {
            if point.x().abs() > WEB_MERCATOR_EXTENT || point.y().abs() > WEB_MERCATOR_EXTENT {
                return Err(ProximityError::geometry(format!(
                    "point ({}, {}) lies outside the Web Mercator extent",
                    point.x(),
                    point.y()
                )));
            }
            planar_ring(point, radius_meters)
        }
        ReferenceKind::Projected => planar_ring(point, radius_meters),
    };

    tracing::debug!(
        wkid = reference.wkid(),
        radius_meters,
        vertices = ring.len(),
        "Built search area"
    );

    Ok(SearchArea::new(vec![ring], reference))
}

fn planar_ring(point: &Coordinate, radius: f64) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = (0..BUFFER_SEGMENTS)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / BUFFER_SEGMENTS as f64;
            [point.x() + radius * angle.cos(), point.y() + radius * angle.sin()]
        })
        .collect();
    close_ring(&mut ring);
    ring
}

fn geodesic_ring(point: &Coordinate, radius: f64) -> Result<Vec<[f64; 2]>> {
    let (lon, lat) = (point.x(), point.y());
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(ProximityError::geometry(format!(
            "geographic point ({}, {}) is outside lon/lat bounds",
            lon, lat
        )));
    }
    if radius >= MAX_GEODESIC_RADIUS {
        return Err(ProximityError::geometry(format!(
            "radius {} m exceeds half the earth's circumference",
            radius
        )));
    }

    let origin = Point::new(lon, lat);
    let mut ring: Vec<[f64; 2]> = Vec::with_capacity(BUFFER_SEGMENTS + 3);
    for i in 0..BUFFER_SEGMENTS {
        let bearing = 360.0 * i as f64 / BUFFER_SEGMENTS as f64;
        let vertex = Haversine.destination(origin, bearing, radius);
        let x = match ring.last() {
            Some(previous) => unwrap_longitude(vertex.x(), previous[0]),
            None => vertex.x(),
        };
        ring.push([x, vertex.y()]);
    }

    // A circle around a pole winds once through every longitude; cap it along
    // the pole so the ring stays simple
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if (last[0] - first[0]).abs() > 180.0 {
            let pole = if lat >= 0.0 { 90.0 } else { -90.0 };
            let closing = unwrap_longitude(first[0], last[0]);
            ring.push([closing, first[1]]);
            ring.push([closing, pole]);
            ring.push([first[0], pole]);
        }
    }

    close_ring(&mut ring);
    Ok(ring)
}

/// Shift `lon` by whole turns so it lies within 180° of `previous`
///
/// Rings crossing the antimeridian keep going past ±180° instead of jumping
/// across the map.
fn unwrap_longitude(lon: f64, previous: f64) -> f64 {
    lon - 360.0 * ((lon - previous) / 360.0).round()
}

fn close_ring(ring: &mut Vec<[f64; 2]>) {
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Euclidean};
    use proximity_core::models::ReferenceId;

    #[test]
    fn test_planar_buffer_radius() {
        let point = Coordinate::new(1000.0, -2000.0, ReferenceId::WEB_MERCATOR_AUXILIARY);
        let area = build_search_area(&point, 100.0).unwrap();

        assert_eq!(area.reference(), ReferenceId(102100));
        assert_eq!(area.rings().len(), 1);

        let ring = &area.rings()[0];
        assert_eq!(ring.len(), BUFFER_SEGMENTS + 1);
        assert_eq!(ring.first(), ring.last());

        let center = Point::new(1000.0, -2000.0);
        for vertex in ring {
            let d = Euclidean.distance(center, Point::new(vertex[0], vertex[1]));
            assert!((d - 100.0).abs() < 1e-6, "vertex at {} m", d);
        }
    }

    #[test]
    fn test_geodesic_buffer_radius() {
        let point = Coordinate::new(115.2625, -8.5069, ReferenceId::WGS84);
        let area = build_search_area(&point, 250.0).unwrap();

        assert_eq!(area.reference(), ReferenceId::WGS84);
        let center = Point::new(115.2625, -8.5069);
        for vertex in &area.rings()[0] {
            let d = Haversine.distance(center, Point::new(vertex[0], vertex[1]));
            assert!((d - 250.0).abs() < 0.5, "vertex at {} m", d);
        }
    }

    #[test]
    fn test_utm_is_buffered_planar() {
        let point = Coordinate::new(500_000.0, 9_000_000.0, ReferenceId(32748));
        let area = build_search_area(&point, 10.0).unwrap();
        assert_eq!(area.reference(), ReferenceId(32748));
        assert!((area.rings()[0][0][0] - 500_010.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_radius_fails() {
        let point = Coordinate::new(0.0, 0.0, ReferenceId::WEB_MERCATOR);
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = build_search_area(&point, radius);
            assert!(matches!(result, Err(ProximityError::Geometry { .. })), "radius {}", radius);
        }
    }

    #[test]
    fn test_degenerate_point_fails() {
        let point = Coordinate::new(f64::NAN, 0.0, ReferenceId::WEB_MERCATOR);
        assert!(matches!(build_search_area(&point, 100.0), Err(ProximityError::Geometry { .. })));
    }

    #[test]
    fn test_unsupported_reference_fails() {
        let point = Coordinate::new(0.0, 0.0, ReferenceId(2193));
        assert!(matches!(build_search_area(&point, 100.0), Err(ProximityError::Geometry { .. })));
    }

    #[test]
    fn test_geographic_bounds_checked() {
        let point = Coordinate::new(0.0, 91.0, ReferenceId::WGS84);
        assert!(build_search_area(&point, 100.0).is_err());

        let point = Coordinate::new(0.0, 0.0, ReferenceId::WGS84);
        assert!(build_search_area(&point, 30_000_000.0).is_err());
    }

    /// True when two segments cross at a point interior to both
    fn segments_cross(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> bool {
        let orient = |p: [f64; 2], q: [f64; 2], r: [f64; 2]| {
            (q[0] - p[0]) * (r[1] - p[1]) - (q[1] - p[1]) * (r[0] - p[0])
        };
        let (d1, d2) = (orient(c, d, a), orient(c, d, b));
        let (d3, d4) = (orient(a, b, c), orient(a, b, d));
        d1 * d2 < 0.0 && d3 * d4 < 0.0
    }

    fn is_simple(ring: &[[f64; 2]]) -> bool {
        let n = ring.len() - 1;
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if segments_cross(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_antimeridian_ring_stays_simple() {
        let point = Coordinate::new(179.999, 10.0, ReferenceId::WGS84);
        let area = build_search_area(&point, 5_000.0).unwrap();
        let ring = &area.rings()[0];

        assert_eq!(ring.len(), BUFFER_SEGMENTS + 1);
        assert_eq!(ring.first(), ring.last());
        assert!(ring.iter().any(|v| v[0] > 180.0));
        assert!(ring.windows(2).all(|w| (w[1][0] - w[0][0]).abs() < 1.0));
        assert!(is_simple(ring));

        let center = Point::new(179.999, 10.0);
        for vertex in ring {
            let d = Haversine.distance(center, Point::new(vertex[0], vertex[1]));
            assert!((d - 5_000.0).abs() < 1.0, "vertex at {} m", d);
        }
    }

    #[test]
    fn test_ring_around_pole_is_capped() {
        let point = Coordinate::new(30.0, 89.99, ReferenceId::WGS84);
        let area = build_search_area(&point, 5_000.0).unwrap();
        let ring = &area.rings()[0];

        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.iter().filter(|v| v[1] == 90.0).count(), 2);
        assert!(is_simple(ring));
    }

    #[test]
    fn test_web_mercator_extent_checked() {
        let point = Coordinate::new(3.0e7, 0.0, ReferenceId::WEB_MERCATOR);
        assert!(build_search_area(&point, 100.0).is_err());
    }
}
