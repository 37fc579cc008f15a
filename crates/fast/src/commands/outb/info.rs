use std::path::PathBuf;

use clap::Args;
use fast_outb::{OutputFile, TimeEncoding};
use miette::Result;
use owo_colors::OwoColorize;

#[derive(Args)]
pub struct InfoArgs {
    /// An input binary output file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn time_line(file: &OutputFile) -> String {
    let range = file
        .samples
        .column_range(0)
        .map(|(start, end)| format!("{start} .. {end} s"))
        .unwrap_or_else(|| "empty".into());
    match file.time {
        TimeEncoding::Packed { .. } => format!("{range}, packed"),
        TimeEncoding::Uniform { increment, .. } => format!("{range}, step {increment}"),
    }
}

/// One line per channel: name, unit, smallest and largest value
fn channel_lines(file: &OutputFile) -> Vec<String> {
    let width = file
        .channel_names
        .iter()
        .map(String::len)
        .max()
        .unwrap_or_default();
    file.channel_names
        .iter()
        .zip(&file.channel_units)
        .enumerate()
        .map(|(i, (name, unit))| {
            let range = file
                .samples
                .column_range(i)
                .map(|(min, max)| format!("{min:>14.6e} {max:>14.6e}"))
                .unwrap_or_default();
            format!("{name:<width$} {:<10} {range}", format!("({unit})"))
        })
        .collect()
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let file = super::open(&self.file)?;

        println!("{}", self.file.display().bold());
        println!("  format:      {} ({})", file.format, file.format as i16);
        if !file.description.is_empty() {
            println!("  description: {}", file.description);
        }
        println!("  channels:    {}", file.channel_count());
        println!("  samples:     {}", file.sample_count());
        println!("  time:        {}", time_line(&file));
        println!();
        for line in channel_lines(&file) {
            println!("  {line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use fast_outb::Samples;
    use pretty_assertions::assert_eq;

    use super::{channel_lines, time_line};

    #[test]
    fn summary_lines() -> fast_outb::error::Result<()> {
        let samples = Samples::from_rows(&[[0.0, 5.0], [0.5, -5.0]])?;
        let bytes = fast_outb::encode(&samples, &["Time", "BldPitch1"], &["s", "deg"], "")?;
        let file = fast_outb::decode(Cursor::new(bytes))?;

        assert_eq!(time_line(&file), "0 .. 0.5 s, step 0.5");
        let lines = channel_lines(&file);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("BldPitch1 (deg)"));
        Ok(())
    }
}
