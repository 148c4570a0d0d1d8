//! In-memory feature layer for development and testing.

use async_trait::async_trait;
use proximity_core::error::{ProximityError, Result};
use proximity_core::models::{Geometry, LayerQuery, QueriedFeature};
use proximity_core::ports::QueryCapability;
use proximity_geo::evaluate_predicate;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// Field used when none is configured
pub const DEFAULT_IDENTIFIER_FIELD: &str = "OBJECTID";

#[derive(Debug, Default)]
struct LayerState {
    features: Vec<QueriedFeature>,
    // JSON text of every identifier in use
    ids: HashSet<String>,
    next_id: i64,
}

/// Features held in memory, queried by evaluating the spatial predicate on
/// each stored geometry
///
/// Geometries are stored in the layer's own reference system. Every feature
/// carries a unique identifier, assigned on insert when missing; inserting a
/// feature whose identifier is already taken fails.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    name: String,
    identifier_field: String,
    state: Arc<RwLock<LayerState>>,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_identifier_field(name, DEFAULT_IDENTIFIER_FIELD)
    }

    pub fn with_identifier_field(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier_field: field.into(),
            state: Arc::new(RwLock::new(LayerState { features: Vec::new(), ids: HashSet::new(), next_id: 1 })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// Add a feature, returning its identifier
    pub fn insert(&self, mut attributes: Map<String, Value>, geometry: Option<Geometry>) -> Result<Value> {
        let mut state = self.state.write().map_err(|_| self.poisoned())?;

        let id = match attributes.get(&self.identifier_field) {
            Some(id) if !id.is_null() => id.clone(),
            _ => {
                let id = Value::from(state.next_id);
                attributes.insert(self.identifier_field.clone(), id.clone());
                id
            }
        };

        let key = id.to_string();
        if state.ids.contains(&key) {
            return Err(ProximityError::query(
                &self.name,
                format!("duplicate {} {}", self.identifier_field, key),
            ));
        }

        // Auto-assigned ids continue after the largest integer seen
        if let Some(n) = id.as_i64() {
            state.next_id = state.next_id.max(n.saturating_add(1));
        }

        state.ids.insert(key);
        state.features.push(QueriedFeature { attributes: attributes.into_iter().collect(), geometry });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.features.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(&self) -> ProximityError {
        ProximityError::query(&self.name, "feature storage is unavailable")
    }
}

#[async_trait]
impl QueryCapability for MemoryLayer {
    async fn query_features(&self, query: &LayerQuery) -> Result<Vec<QueriedFeature>> {
        let state = self.state.read().map_err(|_| self.poisoned())?;

        let matches: Vec<QueriedFeature> = state
            .features
            .iter()
            .filter(|feature| {
                let Some(ref geometry) = feature.geometry else {
                    return false;
                };
                evaluate_predicate(geometry, &query.geometry, query.predicate)
            })
            .map(|feature| {
                let attributes: BTreeMap<String, Value> = feature
                    .attributes
                    .iter()
                    .filter(|(key, _)| query.out_fields.includes(key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                let geometry =
                    if query.return_geometry { feature.geometry.clone() } else { None };
                QueriedFeature { attributes, geometry }
            })
            .collect();

        tracing::debug!(layer = %self.name, matches = matches.len(), "Queried memory layer");
        Ok(matches)
    }
}
