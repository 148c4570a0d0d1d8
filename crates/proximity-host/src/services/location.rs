use proximity_core::models::{Geometry, ReferenceId};
use proximity_core::ports::Notification;

use crate::state::HostState;

/// Title of location notices
pub const LOCATION_TITLE: &str = "Geometric Location";

/// Describes where a geometry, or the map centre, lies
#[derive(Debug, Clone)]
pub struct LocationService {
    state: HostState,
}

impl LocationService {
    pub fn new(state: HostState) -> Self {
        Self { state }
    }

    /// Describe the geometry, falling back to the map centre, and display it
    pub fn show(&self, geometry: Option<&Geometry>, reference: Option<ReferenceId>) -> String {
        let message = match geometry {
            Some(geometry) => {
                let reference = reference.or_else(|| self.state.map.as_ref().map(|m| m.reference()));
                describe_geometry(geometry, reference)
            }
            None => self.describe_map_center(),
        };

        tracing::debug!(%message, "Showing location");
        self.state.sink.notify(Notification::info(LOCATION_TITLE, message.clone()));
        message
    }

    fn describe_map_center(&self) -> String {
        let Some(map) = self.state.map.as_ref() else {
            return "Location information not available".to_string();
        };
        let Some(center) = map.center() else {
            return "Map center not available".to_string();
        };

        format!(
            "Map Center Location:\nX: {:.6}\nY: {:.6}\nSpatial Reference: {}",
            center.x(),
            center.y(),
            center.reference()
        )
    }
}

/// Human readable location of a geometry
pub fn describe_geometry(geometry: &Geometry, reference: Option<ReferenceId>) -> String {
    match geometry {
        Geometry::Point { coordinates } => describe_point(coordinates, reference),
        Geometry::LineString { coordinates } => describe_path(coordinates),
        Geometry::MultiLineString { coordinates } => match coordinates.first() {
            Some(path) => describe_path(path),
            None => "Polyline: No path data available".to_string(),
        },
        Geometry::Polygon { coordinates } => describe_rings(coordinates),
        Geometry::MultiPolygon { coordinates } => match coordinates.first() {
            Some(rings) => describe_rings(rings),
            None => "Polygon: No ring data available".to_string(),
        },
        Geometry::MultiPoint { .. } => format!(
            "Geometry Type: {:?}\nCoordinates available in geometry object",
            geometry.geometry_type()
        ),
    }
}

fn describe_point(coordinates: &[f64; 2], reference: Option<ReferenceId>) -> String {
    let reference = reference.map(|r| r.to_string()).unwrap_or_else(|| "Unknown".to_string());
    format!(
        "Click Location:\nX: {:.6}\nY: {:.6}\nSpatial Reference: {}",
        coordinates[0], coordinates[1], reference
    )
}

fn describe_path(path: &[[f64; 2]]) -> String {
    let (Some(start), Some(end)) = (path.first(), path.last()) else {
        return "Polyline: Empty path".to_string();
    };
    format!(
        "Polyline Location:\nStart: [{:.6}, {:.6}]\nEnd: [{:.6}, {:.6}]\nVertices: {}",
        start[0],
        start[1],
        end[0],
        end[1],
        path.len()
    )
}

/// The centre is the plain vertex average of the exterior ring
fn describe_rings(rings: &[Vec<[f64; 2]>]) -> String {
    let Some(ring) = rings.first() else {
        return "Polygon: No ring data available".to_string();
    };
    if ring.is_empty() {
        return "Polygon: Empty ring".to_string();
    }

    let n = ring.len() as f64;
    let center_x = ring.iter().map(|v| v[0]).sum::<f64>() / n;
    let center_y = ring.iter().map(|v| v[1]).sum::<f64>() / n;
    format!(
        "Polygon Location:\nApprox Center: [{:.6}, {:.6}]\nVertices: {}",
        center_x,
        center_y,
        ring.len()
    )
}
