use futures::stream::{self, StreamExt};
use proximity_core::config::QuerySettings;
use proximity_core::error::{ProximityError, Result};
use proximity_core::models::{LayerDescriptor, LayerQuery, QueriedFeature, QueryOutcome, SearchArea};
use proximity_geo::{normalize, ProjectionSupport};
use std::sync::Arc;
use std::time::Duration;

/// Queries a search area against many layers with bounded concurrency
///
/// Results come back in layer order no matter which layer answers first. A
/// layer that fails to reproject, errors or times out is reported as failed
/// and does not affect the others.
#[derive(Debug, Clone)]
pub struct LayerFanout {
    projection: Arc<ProjectionSupport>,
    max_concurrency: usize,
    layer_timeout: Duration,
}

impl LayerFanout {
    pub fn new(projection: Arc<ProjectionSupport>, settings: &QuerySettings) -> Self {
        Self {
            projection,
            max_concurrency: settings.max_concurrency.max(1),
            layer_timeout: settings.layer_timeout,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Query every queryable layer for records intersecting the area
    pub async fn query_layers(&self, area: &SearchArea, layers: &[LayerDescriptor]) -> QueryOutcome {
        let queryable: Vec<&LayerDescriptor> = layers.iter().filter(|l| l.is_queryable()).collect();
        if queryable.is_empty() {
            tracing::debug!(layers = layers.len(), "No queryable layers");
            return QueryOutcome::empty();
        }

        tracing::debug!(
            layers = queryable.len(),
            concurrency = self.max_concurrency,
            "Querying layers"
        );

        let queries: Vec<_> =
            queryable.into_iter().map(|layer| self.query_titled(area, layer)).collect();
        let results: Vec<(&str, Result<Vec<QueriedFeature>>)> =
            stream::iter(queries).buffered(self.max_concurrency).collect().await;

        let mut outcome = QueryOutcome::empty();
        for (title, result) in results {
            let result = result.map_err(|e| {
                tracing::warn!(layer = %title, error = %e, "Layer query failed, skipping");
                e.to_string()
            });
            outcome.push_layer(title, result);
        }

        tracing::info!(
            records = outcome.len(),
            matched = outcome.matched_layers(),
            empty = outcome.empty_layers(),
            failed = outcome.failed_layers,
            "Layer fan-out complete"
        );

        outcome
    }

    async fn query_titled<'a>(
        &self,
        area: &SearchArea,
        layer: &'a LayerDescriptor,
    ) -> (&'a str, Result<Vec<QueriedFeature>>) {
        (layer.title.as_str(), self.query_layer(area, layer).await)
    }

    /// Reprojection and the query share one timeout, so a stalled table
    /// load fails only the layers waiting on it
    async fn query_layer(&self, area: &SearchArea, layer: &LayerDescriptor) -> Result<Vec<QueriedFeature>> {
        let work = async {
            let geometry = if area.reference() == layer.reference {
                area.clone()
            } else {
                tracing::debug!(
                    layer = %layer.title,
                    from = area.reference().wkid(),
                    to = layer.reference.wkid(),
                    "Reprojecting search area"
                );
                let tables = self.projection.load().await?;
                normalize(area, layer.reference, tables)?
            };

            layer.capability().query_features(&LayerQuery::intersects(geometry)).await
        };

        match tokio::time::timeout(self.layer_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(ProximityError::Timeout {
                layer: layer.title.clone(),
                seconds: self.layer_timeout.as_secs_f64(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity_core::models::{LayerKind, LayerStatus, ReferenceId};
    use proximity_core::ports::QueryCapability;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl QueryCapability for Counting {
        async fn query_features(&self, _query: &LayerQuery) -> Result<Vec<QueriedFeature>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![QueriedFeature::default()])
        }
    }

    fn area() -> SearchArea {
        SearchArea::new(vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]], ReferenceId(102100))
    }

    #[tokio::test]
    async fn test_non_queryable_layers_are_skipped() {
        let capability = Arc::new(Counting { calls: AtomicUsize::new(0) });
        let layers = vec![
            LayerDescriptor::feature("Basemap", ReferenceId(102100), capability.clone())
                .with_kind(LayerKind::Tile),
            LayerDescriptor::feature("Sketch", ReferenceId(102100), capability.clone())
                .with_kind(LayerKind::Graphics),
        ];

        let projection = Arc::new(ProjectionSupport::new());
        let fanout = LayerFanout::new(projection.clone(), &QuerySettings::default());
        let outcome = fanout.query_layers(&area(), &layers).await;

        assert!(outcome.is_empty());
        assert_eq!(outcome.queried_layers(), 0);
        assert_eq!(capability.calls.load(Ordering::SeqCst), 0);
        assert!(!projection.is_loaded());
    }

    #[tokio::test]
    async fn test_same_reference_skips_table_load() {
        let capability = Arc::new(Counting { calls: AtomicUsize::new(0) });
        let layers = vec![LayerDescriptor::feature("Parcels", ReferenceId(102100), capability.clone())];

        let projection = Arc::new(ProjectionSupport::new());
        let fanout = LayerFanout::new(projection.clone(), &QuerySettings::default());
        let outcome = fanout.query_layers(&area(), &layers).await;

        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome.layers[0].status, LayerStatus::Matched(1));
        assert!(!projection.is_loaded());
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let settings = QuerySettings { max_concurrency: 0, ..Default::default() };
        let fanout = LayerFanout::new(Arc::new(ProjectionSupport::new()), &settings);
        assert_eq!(fanout.max_concurrency(), 1);
    }
}
