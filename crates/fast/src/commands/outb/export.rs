use std::path::PathBuf;

use clap::Args;
use fast_table::{Table, Values};
use itertools::Itertools;
use miette::{IntoDiagnostic, Result};
use tracing::info;

#[derive(Args)]
pub struct ExportArgs {
    /// An input binary output file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print JSON instead of tab separated values
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn cell(values: &Values, row: usize) -> String {
    match values {
        Values::Numeric(v) => v.get(row).map(|x| x.to_string()).unwrap_or_default(),
        Values::Text(v) => v.get(row).cloned().unwrap_or_default(),
    }
}

/// Header of column labels, then one tab separated line per row
fn tab_separated(table: &Table) -> String {
    let header = table.labels().join("\t");
    let rows = (0..table.row_count())
        .map(|r| table.columns.iter().map(|c| cell(&c.values, r)).join("\t"));
    std::iter::once(header).chain(rows).join("\n")
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let file = super::open(&self.file)?;
        let table = Table::from_output(&file);
        info!("exporting {} channels", table.columns.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&table).into_diagnostic()?);
        } else {
            println!("{}", tab_separated(&table));
        }
        Ok(())
    }
}
