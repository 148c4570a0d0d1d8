use crate::cli::LocateArgs;
use crate::output::OutputWriter;
use anyhow::{bail, Context, Result};
use proximity_core::config::LayeredConfig;
use proximity_core::models::Coordinate;
use proximity_host::{register_operations, HostState, MapContext, MemorySink, OperationRegistry, SHOW_LOCATION};
use proximity_query::ProximityQuery;
use serde_json::{json, Value};
use std::sync::Arc;

use super::show_notifications;

pub async fn execute(args: LocateArgs, config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let reference = config.reference_id();

    let mut map = MapContext::new(reference, Vec::new());
    if let Some(center) = args.center.as_deref() {
        let [x, y] = center else {
            bail!("--center takes exactly two values");
        };
        map = map.with_center(Coordinate::new(*x, *y, reference));
    }

    let mut arguments = json!({});
    if let Some(text) = args.geometry.as_deref() {
        let geometry: Value = serde_json::from_str(text).context("--geometry is not valid JSON")?;
        arguments["geometry"] = geometry;
    }
    if let Some(wkid) = args.wkid {
        arguments["wkid"] = json!(wkid);
    }

    let sink = Arc::new(MemorySink::new());
    let state = HostState::new(Some(map), ProximityQuery::new(config.to_query_settings()), sink.clone());
    let mut registry = OperationRegistry::new();
    register_operations(&mut registry, state)?;

    let message = registry.execute(SHOW_LOCATION, arguments).await.context("Failed to describe location")?;

    show_notifications(&sink, output);
    if output.is_json() {
        output.result(message)?;
    }

    Ok(())
}
