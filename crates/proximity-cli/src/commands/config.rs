use crate::output::OutputWriter;
use anyhow::Result;
use proximity_core::config::LayeredConfig;
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn execute(config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.section("Configuration Values");
    output.table(rows);

    output.section("Configuration Precedence");
    if !output.is_json() {
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
