use proximity_core::config::QuerySettings;
use proximity_core::error::Result;
use proximity_core::models::{Coordinate, FeatureRecord, LayerDescriptor, QueryOutcome};
use proximity_geo::{build_search_area, ProjectionSupport};
use serde::Serialize;
use std::sync::Arc;

use crate::fanout::LayerFanout;
use crate::report::Reporter;

/// Result of a proximity query that did not fail outright
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "outcome", rename_all = "snake_case")]
pub enum NearbyOutcome {
    /// The map has no feature layers to query
    NoQueryableLayers,
    /// Layers were queried but nothing lies within the radius
    NoFeatures(QueryOutcome),
    Found(QueryOutcome),
}

impl NearbyOutcome {
    pub fn outcome(&self) -> Option<&QueryOutcome> {
        match self {
            NearbyOutcome::NoQueryableLayers => None,
            NearbyOutcome::NoFeatures(outcome) | NearbyOutcome::Found(outcome) => Some(outcome),
        }
    }

    pub fn records(&self) -> &[FeatureRecord] {
        self.outcome().map(|o| o.records.as_slice()).unwrap_or_default()
    }
}

/// Finds the features near a clicked point
///
/// One instance owns the projection support, so the tables are loaded at
/// most once across all the clicks it serves.
#[derive(Debug, Clone)]
pub struct ProximityQuery {
    settings: QuerySettings,
    projection: Arc<ProjectionSupport>,
    fanout: LayerFanout,
    reporter: Reporter,
}

impl ProximityQuery {
    pub fn new(settings: QuerySettings) -> Self {
        Self::with_projection(settings, Arc::new(ProjectionSupport::new()))
    }

    pub fn with_projection(settings: QuerySettings, projection: Arc<ProjectionSupport>) -> Self {
        let fanout = LayerFanout::new(projection.clone(), &settings);
        let reporter = Reporter::new(settings.identifier_field.clone());
        Self { settings, projection, fanout, reporter }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    pub fn projection(&self) -> &Arc<ProjectionSupport> {
        &self.projection
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Buffer the point and query every queryable layer around it
    ///
    /// Only an invalid point or radius is an error; layer failures are
    /// reported inside the outcome.
    pub async fn find_nearby(&self, point: &Coordinate, layers: &[LayerDescriptor]) -> Result<NearbyOutcome> {
        let area = build_search_area(point, self.settings.radius_meters)?;

        if !layers.iter().any(LayerDescriptor::is_queryable) {
            tracing::info!(layers = layers.len(), "No queryable feature layers");
            return Ok(NearbyOutcome::NoQueryableLayers);
        }

        let outcome = self.fanout.query_layers(&area, layers).await;

        if outcome.is_empty() {
            tracing::info!(
                x = point.x(),
                y = point.y(),
                radius = self.settings.radius_meters,
                "No features near point"
            );
            Ok(NearbyOutcome::NoFeatures(outcome))
        } else {
            Ok(NearbyOutcome::Found(outcome))
        }
    }

    /// Summary of an outcome bounded by the configured item count
    pub fn summarize(&self, outcome: &QueryOutcome) -> String {
        self.reporter.summarize(outcome, self.settings.summary_max_items)
    }
}
