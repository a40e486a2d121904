//! Config command implementation

use crate::commands::Globals;
use crate::config_loader;
use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;

pub fn execute(globals: &Globals, output: &OutputWriter) -> Result<()> {
    let config = config_loader::load_config(&globals.config_path, globals.overrides())?;

    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.section(format!("Configuration ({})", globals.config_path.display()));
    output.table(rows)
}
