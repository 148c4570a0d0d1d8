use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::geometry::Geometry;
use super::layer::QueriedFeature;

/// A matched record together with the title of the layer it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub layer_title: String,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub geometry: Option<Geometry>,
}

impl FeatureRecord {
    pub fn new(layer_title: impl Into<String>, feature: QueriedFeature) -> Self {
        Self {
            layer_title: layer_title.into(),
            attributes: feature.attributes,
            geometry: feature.geometry,
        }
    }
}

/// How a single layer fared during a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerStatus {
    /// Query succeeded with this many records
    Matched(usize),
    /// Query succeeded without records
    Empty,
    /// Normalization, query, or timeout failure
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerReport {
    pub title: String,
    pub status: LayerStatus,
}

/// Aggregated result of querying every layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Records in layer order, then in the order each layer returned them
    pub records: Vec<FeatureRecord>,
    pub failed_layers: usize,
    pub layers: Vec<LayerReport>,
}

impl QueryOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn queried_layers(&self) -> usize {
        self.layers.len()
    }

    /// Layers that returned at least one record
    pub fn matched_layers(&self) -> usize {
        self.layers.iter().filter(|l| matches!(l.status, LayerStatus::Matched(_))).count()
    }

    /// Layers that were queried successfully but matched nothing
    pub fn empty_layers(&self) -> usize {
        self.layers.iter().filter(|l| l.status == LayerStatus::Empty).count()
    }

    /// Append the result of one layer, keeping counts consistent
    pub fn push_layer(
        &mut self,
        title: &str,
        result: std::result::Result<Vec<QueriedFeature>, String>,
    ) {
        let status = match result {
            Ok(features) if features.is_empty() => LayerStatus::Empty,
            Ok(features) => {
                let count = features.len();
                self.records.extend(features.into_iter().map(|f| FeatureRecord::new(title, f)));
                LayerStatus::Matched(count)
            }
            Err(reason) => {
                self.failed_layers += 1;
                LayerStatus::Failed(reason)
            }
        };
        self.layers.push(LayerReport { title: title.to_string(), status });
    }
}
