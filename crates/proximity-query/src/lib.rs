//! Proximity Query - Fan-out, aggregation and reporting
//!
//! Runs the search area against every queryable layer, collects the matches in
//! layer order and turns them into a bounded human readable summary.

pub mod fanout;
pub mod pipeline;
pub mod report;

pub use fanout::LayerFanout;
pub use pipeline::{NearbyOutcome, ProximityQuery};
pub use report::{display_value, summarize, Reporter};
