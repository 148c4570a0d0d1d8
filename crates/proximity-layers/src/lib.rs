//! Proximity Layers - Queryable feature layers
//!
//! Layer implementations that answer spatial queries for the proximity
//! pipeline: an in-memory feature layer and a GeoJSON reader that loads one.

pub mod memory;
pub mod reader;

pub use memory::MemoryLayer;
pub use reader::{GeoJsonLayerReader, LayerReader};
