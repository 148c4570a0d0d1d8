use async_trait::async_trait;

use crate::error::Result;
use crate::models::{LayerQuery, QueriedFeature};

/// Port for a layer's query capability
///
/// The query geometry is always expressed in the layer's own reference
/// system; callers normalize before calling.
#[async_trait]
pub trait QueryCapability: Send + Sync {
    /// Return the records satisfying the query's spatial predicate
    async fn query_features(&self, query: &LayerQuery) -> Result<Vec<QueriedFeature>>;
}
