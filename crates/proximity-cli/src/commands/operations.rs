use crate::output::OutputWriter;
use anyhow::Result;
use proximity_core::config::LayeredConfig;
use proximity_host::{
    register_operations, HostState, OperationRegistry, TracingSink, FIND_NEARBY_FEATURES,
    SHOW_FEATURE_POPUP, SHOW_LOCATION,
};
use proximity_query::ProximityQuery;
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct OperationRow {
    #[tabled(rename = "Operation")]
    name: String,
    #[tabled(rename = "Arguments")]
    arguments: &'static str,
}

pub fn execute(config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let state = HostState::new(None, ProximityQuery::new(config.to_query_settings()), Arc::new(TracingSink));
    let mut registry = OperationRegistry::new();
    register_operations(&mut registry, state)?;

    let rows: Vec<OperationRow> = registry
        .names()
        .into_iter()
        .map(|name| OperationRow { name: name.to_string(), arguments: arguments_of(name) })
        .collect();

    output.section("Registered Operations");
    output.table(rows);

    Ok(())
}

fn arguments_of(name: &str) -> &'static str {
    match name {
        FIND_NEARBY_FEATURES => "{ x, y }",
        SHOW_FEATURE_POPUP => "{ features: [...] }",
        SHOW_LOCATION => "{ geometry?, wkid? }",
        _ => "",
    }
}
