//! Proximity Geo - Buffering, reprojection, and spatial predicates
//!
//! This crate handles the geometric half of the proximity query: building the
//! search polygon around a click, normalizing it into each layer's reference
//! system, and evaluating spatial predicates with the `geo` crate.

pub mod buffer;
pub mod models;
pub mod spatial;
pub mod transform;

pub use buffer::{build_search_area, BUFFER_SEGMENTS};
pub use spatial::evaluate_predicate;
pub use transform::{normalize, BuiltinTables, ProjectionSupport, ProjectionTables, TableLoader};
