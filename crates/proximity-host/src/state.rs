use proximity_core::models::{Coordinate, LayerDescriptor, ReferenceId};
use proximity_core::ports::NotificationSink;
use proximity_query::ProximityQuery;
use std::fmt;
use std::sync::Arc;

/// The active map as seen by the operations
#[derive(Debug, Clone)]
pub struct MapContext {
    reference: ReferenceId,
    center: Option<Coordinate>,
    layers: Vec<LayerDescriptor>,
}

impl MapContext {
    pub fn new(reference: ReferenceId, layers: Vec<LayerDescriptor>) -> Self {
        Self { reference, center: None, layers }
    }

    pub fn with_center(mut self, center: Coordinate) -> Self {
        self.center = Some(center);
        self
    }

    pub fn reference(&self) -> ReferenceId {
        self.reference
    }

    pub fn center(&self) -> Option<&Coordinate> {
        self.center.as_ref()
    }

    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }
}

/// Shared state handed to every service
#[derive(Clone)]
pub struct HostState {
    /// `None` until a map is attached
    pub map: Option<Arc<MapContext>>,
    pub query: Arc<ProximityQuery>,
    pub sink: Arc<dyn NotificationSink>,
}

impl HostState {
    pub fn new(map: Option<MapContext>, query: ProximityQuery, sink: Arc<dyn NotificationSink>) -> Self {
        Self { map: map.map(Arc::new), query: Arc::new(query), sink }
    }
}

impl fmt::Debug for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostState")
            .field("map", &self.map)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
