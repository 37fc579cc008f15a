use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Args;
use fast_outb::{FileFormat, OutbWriter, OutbWriterOptions};
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

#[derive(Args)]
pub struct RepackArgs {
    /// An input binary output file
    #[arg(value_name = "IN")]
    input: PathBuf,

    /// A target binary output file
    #[arg(value_name = "OUT")]
    output: PathBuf,

    /// Format to write, the format of the input by default
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(i16).range(1..=4))]
    format: Option<i16>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

fn format_of(id: i16) -> FileFormat {
    match id {
        1 => FileFormat::WithTime,
        3 => FileFormat::NoCompressWithoutTime,
        4 => FileFormat::ChanLenIn,
        _ => FileFormat::WithoutTime,
    }
}

impl RepackArgs {
    pub fn handle(&self) -> Result<()> {
        let file = super::open(&self.input)?;
        let format = self.format.map_or(file.format, format_of);
        info!("writing {} as {format}", self.output.display());

        let out = if !self.overwrite {
            File::create_new(&self.output)
                .into_diagnostic()
                .context(format!("creating {}", self.output.display()))?
        } else {
            File::create(&self.output)
                .into_diagnostic()
                .context(format!("creating {}", self.output.display()))?
        };

        let writer = OutbWriter::new(
            BufWriter::new(out),
            OutbWriterOptions::builder()
                .format(format)
                .description(file.description.as_str())
                .build(),
        );
        writer
            .write(&file.samples, &file.channel_names, &file.channel_units)
            .context(format!("encoding {}", self.output.display()))?
            .flush()
            .into_diagnostic()
    }
}
