use crate::models::{search_area_polygon, to_geo_geometry, Geometry, SearchArea, SpatialPredicate};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::algorithm::intersects::Intersects;
use geo::{Geometry as GeoGeometry, Rect};

/// Evaluate if a geometry satisfies a predicate against a search area
///
/// Both must already share a reference system.
pub fn evaluate_predicate(
    geometry: &Geometry,
    area: &SearchArea,
    predicate: SpatialPredicate,
) -> bool {
    let area_polygon = search_area_polygon(area);
    if area_polygon.exterior().0.is_empty() {
        return false;
    }

    let geo_geom = to_geo_geometry(geometry);
    let area_polygon = GeoGeometry::Polygon(area_polygon);

    match predicate {
        SpatialPredicate::Within => evaluate_within(&geo_geom, &area_polygon),
        SpatialPredicate::Intersects => evaluate_intersects(&geo_geom, &area_polygon),
        SpatialPredicate::Contains => evaluate_contains(&geo_geom, &area_polygon),
        SpatialPredicate::BoundingBox => evaluate_bounding_box(&geo_geom, &area_polygon),
    }
}

/// Check if geometry is within the search area
fn evaluate_within(geometry: &GeoGeometry, area: &GeoGeometry) -> bool {
    // Within means the geometry is completely inside the area
    area.contains(geometry)
}

/// Check if geometry intersects the search area
fn evaluate_intersects(geometry: &GeoGeometry, area: &GeoGeometry) -> bool {
    geometry.intersects(area)
}

/// Check if geometry contains the search area
fn evaluate_contains(geometry: &GeoGeometry, area: &GeoGeometry) -> bool {
    geometry.contains(area)
}

/// Check if geometry's bounding box intersects the area's bounding box
fn evaluate_bounding_box(geometry: &GeoGeometry, area: &GeoGeometry) -> bool {
    let geom_bbox = match geometry.bounding_rect() {
        Some(bbox) => bbox,
        None => return false,
    };

    let area_bbox = match area.bounding_rect() {
        Some(bbox) => bbox,
        None => return false,
    };

    bounding_boxes_intersect(&geom_bbox, &area_bbox)
}

/// Check if two bounding boxes intersect
fn bounding_boxes_intersect(bbox1: &Rect, bbox2: &Rect) -> bool {
    // Two rectangles intersect if they overlap in both x and y dimensions
    let x_overlap = bbox1.min().x <= bbox2.max().x && bbox1.max().x >= bbox2.min().x;
    let y_overlap = bbox1.min().y <= bbox2.max().y && bbox1.max().y >= bbox2.min().y;

    x_overlap && y_overlap
}
