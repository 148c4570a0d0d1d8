//! Names and handlers of the operations a map application can invoke.

use proximity_core::error::{ProximityError, Result};
use proximity_core::models::ReferenceId;
use serde_json::Value;
use std::sync::Arc;

use crate::dto::{parse_args, parse_optional_args, FindNearbyArgs, ShowLocationArgs, ShowPopupArgs};
use crate::registry::OperationRegistry;
use crate::services::{LocationService, NearbyFeaturesService};
use crate::state::HostState;

pub const FIND_NEARBY_FEATURES: &str = "map.click.find-nearby-features";
pub const SHOW_FEATURE_POPUP: &str = "map.click.show-feature-popup";
pub const SHOW_LOCATION: &str = "geometric-location.show";

/// Register every host operation against one shared state
pub fn register_operations(registry: &mut OperationRegistry, state: HostState) -> Result<()> {
    let nearby = Arc::new(NearbyFeaturesService::new(state.clone()));
    let location = Arc::new(LocationService::new(state));

    let service = nearby.clone();
    registry.register(FIND_NEARBY_FEATURES, move |args| {
        let service = service.clone();
        async move {
            let args: FindNearbyArgs = parse_args(FIND_NEARBY_FEATURES, args)?;
            let records = service.find_nearby(args.x, args.y).await?;
            Ok::<_, ProximityError>(serde_json::to_value(records)?)
        }
    })?;

    let service = nearby;
    registry.register(SHOW_FEATURE_POPUP, move |args| {
        let service = service.clone();
        async move {
            let args: ShowPopupArgs = parse_args(SHOW_FEATURE_POPUP, args)?;
            service.show_feature_popup(&args.features);
            Ok::<_, ProximityError>(Value::from(args.features.len()))
        }
    })?;

    registry.register(SHOW_LOCATION, move |args| {
        let service = location.clone();
        async move {
            let args: ShowLocationArgs = parse_optional_args(SHOW_LOCATION, args)?;
            let message = service.show(args.geometry.as_ref(), args.wkid.map(ReferenceId));
            Ok::<_, ProximityError>(Value::String(message))
        }
    })?;

    tracing::info!(operations = registry.len(), "Host operations registered");
    Ok(())
}
