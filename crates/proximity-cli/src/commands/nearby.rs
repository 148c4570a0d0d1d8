use crate::cli::NearbyArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use proximity_core::config::{CliConfigOverrides, LayeredConfig};
use proximity_host::{register_operations, HostState, MapContext, MemorySink, OperationRegistry, FIND_NEARBY_FEATURES};
use proximity_layers::{GeoJsonLayerReader, LayerReader};
use proximity_query::ProximityQuery;
use std::sync::Arc;
use tracing::debug;

use super::show_notifications;

pub async fn execute(args: NearbyArgs, mut config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    config.update_from_cli(CliConfigOverrides {
        reference: args.wkid,
        search_radius: args.radius,
        max_concurrency: args.concurrency,
        layer_timeout_secs: args.timeout_secs,
        summary_max_items: args.max_items,
    });
    let settings = config.to_query_settings();

    let reader = GeoJsonLayerReader::with_identifier_field(settings.identifier_field.clone());
    let mut layers = Vec::with_capacity(args.layers.len());
    for path in &args.layers {
        let layer = reader
            .read(path)
            .await
            .with_context(|| format!("Failed to load layer {}", path.display()))?;
        debug!(path = %path.display(), title = %layer.title, "Loaded layer");
        layers.push(layer);
    }

    let reference = config.reference_id();
    output.section("Proximity Query");
    output.kv("Point", format!("({}, {})", args.x, args.y));
    output.kv("Reference", format!("WKID:{} ({})", reference, reference.name()));
    output.kv("Radius", format!("{} m", settings.radius_meters));
    output.kv("Layers", layers.len());
    output.section("Result");

    let sink = Arc::new(MemorySink::new());
    let state = HostState::new(
        Some(MapContext::new(reference, layers)),
        ProximityQuery::new(settings),
        sink.clone(),
    );
    let mut registry = OperationRegistry::new();
    register_operations(&mut registry, state)?;

    let result = registry
        .execute(FIND_NEARBY_FEATURES, serde_json::json!({ "x": args.x, "y": args.y }))
        .await;

    show_notifications(&sink, output);

    let records = result.context("Proximity query failed")?;
    if output.is_json() {
        output.result(records)?;
    }

    Ok(())
}
