pub mod geometry;
pub mod layer;
pub mod record;
pub mod reference;

pub use geometry::{Geometry, GeometryType, SearchArea, SpatialPredicate};
pub use layer::{LayerDescriptor, LayerKind, LayerQuery, OutFields, QueriedFeature};
pub use record::{FeatureRecord, LayerReport, LayerStatus, QueryOutcome};
pub use reference::{Coordinate, ReferenceId, ReferenceKind};
