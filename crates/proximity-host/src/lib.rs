//! Proximity Host - Operations exposed to a map application
//!
//! Wires the proximity query and the location describer to named operations
//! and routes their notices to a notification sink.

pub mod dto;
pub mod operations;
pub mod registry;
pub mod services;
pub mod sinks;
pub mod state;

pub use operations::{register_operations, FIND_NEARBY_FEATURES, SHOW_FEATURE_POPUP, SHOW_LOCATION};
pub use registry::{OperationHandler, OperationRegistry};
pub use services::{LocationService, NearbyFeaturesService};
pub use sinks::{MemorySink, TracingSink};
pub use state::{HostState, MapContext};
