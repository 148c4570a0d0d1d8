use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::geometry::{Geometry, SearchArea, SpatialPredicate};
use super::reference::ReferenceId;
use crate::ports::QueryCapability;

/// Kind of layer in the map's layer list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayerKind {
    /// Vector features that answer attribute/geometry queries
    #[default]
    Feature,
    /// Raster or vector tiles, not queryable
    Tile,
    /// Client-side graphics
    Graphics,
    /// Container of other layers
    Group,
}

/// Field selection for a layer query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutFields {
    #[default]
    All,
    Named(Vec<String>),
}

impl OutFields {
    pub fn includes(&self, field: &str) -> bool {
        match self {
            OutFields::All => true,
            OutFields::Named(fields) => fields.iter().any(|f| f == field),
        }
    }
}

/// Query handed to a layer's query capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerQuery {
    pub geometry: SearchArea,
    pub predicate: SpatialPredicate,
    pub out_fields: OutFields,
    pub return_geometry: bool,
}

impl LayerQuery {
    /// Intersects query requesting every attribute and the geometry
    pub fn intersects(geometry: SearchArea) -> Self {
        Self {
            geometry,
            predicate: SpatialPredicate::Intersects,
            out_fields: OutFields::All,
            return_geometry: true,
        }
    }

    pub fn with_out_fields(mut self, out_fields: OutFields) -> Self {
        self.out_fields = out_fields;
        self
    }

    pub fn with_return_geometry(mut self, return_geometry: bool) -> Self {
        self.return_geometry = return_geometry;
        self
    }
}

/// A single match returned by a query capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueriedFeature {
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub geometry: Option<Geometry>,
}

/// A queryable data layer as the map exposes it
#[derive(Clone)]
pub struct LayerDescriptor {
    pub title: String,
    pub reference: ReferenceId,
    pub kind: LayerKind,
    capability: Arc<dyn QueryCapability>,
}

impl LayerDescriptor {
    /// Create a feature layer descriptor
    pub fn feature(
        title: impl Into<String>,
        reference: ReferenceId,
        capability: Arc<dyn QueryCapability>,
    ) -> Self {
        Self { title: title.into(), reference, kind: LayerKind::Feature, capability }
    }

    pub fn with_kind(mut self, kind: LayerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Only feature layers take part in proximity queries
    pub fn is_queryable(&self) -> bool {
        self.kind == LayerKind::Feature
    }

    pub fn capability(&self) -> &Arc<dyn QueryCapability> {
        &self.capability
    }
}

impl fmt::Debug for LayerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerDescriptor")
            .field("title", &self.title)
            .field("reference", &self.reference)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
