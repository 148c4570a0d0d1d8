//! GeoJSON layer reader implementation

use async_trait::async_trait;
use geojson::{GeoJson, Value as GeoJsonValue};
use proximity_core::error::{ProximityError, Result};
use proximity_core::models::{Geometry, LayerDescriptor, ReferenceId};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use crate::memory::{MemoryLayer, DEFAULT_IDENTIFIER_FIELD};

/// Builds a queryable layer from a file
#[async_trait]
pub trait LayerReader: Send + Sync {
    async fn read(&self, path: &Path) -> Result<LayerDescriptor>;

    fn supported_extensions(&self) -> &[&str];

    fn format_name(&self) -> &str;
}

/// Loads a GeoJSON file into a [`MemoryLayer`]
///
/// The layer reference comes from the legacy `crs` member and defaults to
/// WGS 84 when absent.
#[derive(Debug, Clone)]
pub struct GeoJsonLayerReader {
    identifier_field: String,
}

impl GeoJsonLayerReader {
    pub fn new() -> Self {
        Self { identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string() }
    }

    pub fn with_identifier_field(field: impl Into<String>) -> Self {
        Self { identifier_field: field.into() }
    }

    /// Parse GeoJSON text into a layer with the given fallback title
    pub fn parse(&self, title: &str, content: &str) -> Result<LayerDescriptor> {
        let geojson: GeoJson = content.parse().map_err(|e| {
            ProximityError::Serialization(format!("Failed to parse GeoJSON for '{}': {}", title, e))
        })?;

        let mut title = title.to_string();
        let mut reference = ReferenceId::WGS84;
        let layer_features: Vec<(Option<Map<String, Value>>, Option<Geometry>)> = match geojson {
            GeoJson::FeatureCollection(fc) => {
                if let Some(members) = fc.foreign_members.as_ref() {
                    if let Some(epsg) = members.get("crs").and_then(extract_epsg_from_crs) {
                        reference = ReferenceId(epsg);
                    }
                    if let Some(name) = members.get("name").and_then(Value::as_str) {
                        title = name.to_string();
                    }
                }
                fc.features
                    .into_iter()
                    .map(|f| (f.properties, f.geometry.and_then(|g| convert_geometry(&g.value))))
                    .collect()
            }
            GeoJson::Feature(f) => {
                vec![(f.properties, f.geometry.and_then(|g| convert_geometry(&g.value)))]
            }
            GeoJson::Geometry(g) => vec![(None, convert_geometry(&g.value))],
        };

        let layer = MemoryLayer::with_identifier_field(title.clone(), self.identifier_field.clone());
        let mut skipped = 0;
        for (properties, geometry) in layer_features {
            if geometry.is_none() {
                skipped += 1;
            }
            layer.insert(properties.unwrap_or_default(), geometry)?;
        }

        if skipped > 0 {
            tracing::warn!(layer = %title, skipped, "Features without a supported geometry will never match");
        }
        tracing::info!(layer = %title, features = layer.len(), wkid = reference.wkid(), "Loaded GeoJSON layer");

        Ok(LayerDescriptor::feature(title, reference, Arc::new(layer)))
    }
}

impl Default for GeoJsonLayerReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LayerReader for GeoJsonLayerReader {
    async fn read(&self, path: &Path) -> Result<LayerDescriptor> {
        let content = tokio::fs::read_to_string(path).await?;

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed");

        self.parse(name, &content)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }
}

/// Convert a GeoJSON geometry, dropping any third ordinate
///
/// Geometry collections are not supported and yield `None`.
fn convert_geometry(value: &GeoJsonValue) -> Option<Geometry> {
    fn pos(p: &[f64]) -> Option<[f64; 2]> {
        match p {
            [x, y, ..] => Some([*x, *y]),
            _ => None,
        }
    }
    fn line(points: &[Vec<f64>]) -> Option<Vec<[f64; 2]>> {
        points.iter().map(|p| pos(p)).collect()
    }
    fn rings(rings: &[Vec<Vec<f64>>]) -> Option<Vec<Vec<[f64; 2]>>> {
        rings.iter().map(|r| line(r)).collect()
    }

    match value {
        GeoJsonValue::Point(p) => pos(p).map(|coordinates| Geometry::Point { coordinates }),
        GeoJsonValue::MultiPoint(points) => {
            line(points).map(|coordinates| Geometry::MultiPoint { coordinates })
        }
        GeoJsonValue::LineString(points) => {
            line(points).map(|coordinates| Geometry::LineString { coordinates })
        }
        GeoJsonValue::MultiLineString(lines) => {
            rings(lines).map(|coordinates| Geometry::MultiLineString { coordinates })
        }
        GeoJsonValue::Polygon(polygon) => {
            rings(polygon).map(|coordinates| Geometry::Polygon { coordinates })
        }
        GeoJsonValue::MultiPolygon(polygons) => polygons
            .iter()
            .map(|p| rings(p))
            .collect::<Option<Vec<_>>>()
            .map(|coordinates| Geometry::MultiPolygon { coordinates }),
        GeoJsonValue::GeometryCollection(_) => None,
    }
}

/// Extract the EPSG code from a legacy GeoJSON `crs` object
///
/// Understands `EPSG:3857`, `urn:ogc:def:crs:EPSG::3857` and the OGC CRS84
/// alias of WGS 84.
fn extract_epsg_from_crs(crs: &Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    if name.ends_with("CRS84") {
        return Some(4326);
    }
    name.rsplit(':').next()?.parse().ok()
}
