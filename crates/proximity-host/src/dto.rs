use proximity_core::error::{ProximityError, Result};
use proximity_core::models::{FeatureRecord, Geometry};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Arguments of `map.click.find-nearby-features`, in the map's reference
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FindNearbyArgs {
    pub x: f64,
    pub y: f64,
}

/// Arguments of `map.click.show-feature-popup`
#[derive(Debug, Clone, Deserialize)]
pub struct ShowPopupArgs {
    pub features: Vec<FeatureRecord>,
}

/// Arguments of `geometric-location.show`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowLocationArgs {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Reference of `geometry`, the map's when absent
    #[serde(default)]
    pub wkid: Option<u32>,
}

/// Decode operation arguments, reporting failures against the operation
pub fn parse_args<T: DeserializeOwned>(operation: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| ProximityError::InvalidArguments {
        operation: operation.to_string(),
        reason: e.to_string(),
    })
}

/// Like [`parse_args`], treating `null` as the default arguments
pub fn parse_optional_args<T: DeserializeOwned + Default>(operation: &str, args: Value) -> Result<T> {
    if args.is_null() {
        return Ok(T::default());
    }
    parse_args(operation, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_find_nearby() {
        let args: FindNearbyArgs = parse_args("find", json!({"x": 1.5, "y": -2})).unwrap();
        assert_eq!(args.x, 1.5);
        assert_eq!(args.y, -2.0);
    }

    #[test]
    fn test_missing_coordinate_rejected() {
        let result: Result<FindNearbyArgs> = parse_args("find", json!({"x": 1.5}));
        assert!(matches!(result, Err(ProximityError::InvalidArguments { operation, .. }) if operation == "find"));
    }

    #[test]
    fn test_location_args_optional() {
        let args: ShowLocationArgs = parse_optional_args("show", Value::Null).unwrap();
        assert!(args.geometry.is_none());

        let args: ShowLocationArgs =
            parse_optional_args("show", json!({"geometry": {"type": "Point", "coordinates": [1, 2]}})).unwrap();
        assert_eq!(args.geometry, Some(Geometry::point(1.0, 2.0)));
    }
}
