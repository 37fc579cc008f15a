use std::path::PathBuf;

use clap::Args;
use fast_input::{Entry, InputFile};
use miette::{Context, Result};
use owo_colors::OwoColorize;

#[derive(Args)]
pub struct TablesArgs {
    /// An input file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

/// Label and a short description of every table-like entry
fn describe(file: &InputFile) -> Vec<(String, String)> {
    file.entries()
        .iter()
        .filter_map(|entry| {
            let shape = match entry {
                Entry::Table(t) => {
                    let (rows, cols) = t.shape();
                    format!("{rows} x {cols} {}", t.kind().to_string().to_lowercase())
                }
                Entry::FileTable(t) => format!("{} file names", t.filenames.len()),
                Entry::OutputList(l) => format!("{} channels", l.names().len()),
                Entry::BeamSections(b) => format!("{} stations", b.span.len()),
                Entry::Block(b) => format!("{} lines kept as written", b.lines.len()),
                Entry::Comment(_) | Entry::Scalar(_) => return None,
            };
            Some((entry.label().unwrap_or_default().to_string(), shape))
        })
        .collect()
}

impl TablesArgs {
    pub fn handle(&self) -> Result<()> {
        let file = InputFile::read(&self.file).context(format!("parsing {}", self.file.display()))?;

        let tables = describe(&file);
        if tables.is_empty() {
            println!("no tables in {}", self.file.display());
            return Ok(());
        }

        let width = tables.iter().map(|(label, _)| label.len()).max().unwrap_or_default();
        for (label, shape) in tables {
            println!("{:<width$}  {shape}", label.bold());
        }
        Ok(())
    }
}
