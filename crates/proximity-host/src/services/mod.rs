pub mod location;
pub mod nearby;

pub use location::LocationService;
pub use nearby::NearbyFeaturesService;
