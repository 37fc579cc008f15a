use std::{fs::File, io::BufReader, path::Path};

use fast_outb::OutputFile;
use miette::{Context, IntoDiagnostic, Result};

pub mod export;
pub mod info;
pub mod repack;

#[derive(clap::Subcommand)]
pub enum OutbCommands {
    /// Summarize the header and channels of a binary output file
    Info(info::InfoArgs),
    /// Print a binary output file as a table
    Export(export::ExportArgs),
    /// Write a binary output file again, optionally in another format
    Repack(repack::RepackArgs),
}

impl OutbCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            OutbCommands::Info(info) => info.handle(),
            OutbCommands::Export(export) => export.handle(),
            OutbCommands::Repack(repack) => repack.handle(),
        }
    }
}

fn open(path: &Path) -> Result<OutputFile> {
    let f = File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;
    fast_outb::decode(BufReader::new(f)).context(format!("decoding {}", path.display()))
}
