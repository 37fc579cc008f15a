use std::{fs, path::PathBuf};

use clap::Args;
use fast_input::{file::decode_text, InputFile};
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use tracing::info;

#[derive(Args)]
pub struct FmtArgs {
    /// An input file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the changes instead of writing the file
    #[arg(long, default_value_t = false)]
    check: bool,
}

/// Unified diff of the two texts, `None` when they are equal
fn changes(original: &str, formatted: &str) -> Option<String> {
    if original == formatted {
        return None;
    }
    let diff = TextDiff::from_lines(original, formatted);

    let mut out = String::new();
    for (i, group) in diff.grouped_ops(3).iter().enumerate() {
        if i > 0 {
            out.push_str(&format!("{}\n", "...".dimmed()));
        }
        for op in group {
            for change in diff.iter_inline_changes(op) {
                let (sign, mut line) = match change.tag() {
                    ChangeTag::Delete => ("-", format!("{}", "-".red())),
                    ChangeTag::Insert => ("+", format!("{}", "+".green())),
                    ChangeTag::Equal => (" ", " ".to_string()),
                };
                for (emphasized, value) in change.iter_strings_lossy() {
                    let value = value.trim_end_matches(['\n', '\r']);
                    match (emphasized, sign) {
                        (true, "+") => line.push_str(&format!("{}", value.green().underline())),
                        (true, _) => line.push_str(&format!("{}", value.red().underline())),
                        (false, "+") => line.push_str(&format!("{}", value.green())),
                        (false, "-") => line.push_str(&format!("{}", value.red())),
                        (false, _) => line.push_str(&format!("{}", value.dimmed())),
                    }
                }
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    Some(out)
}

impl FmtArgs {
    pub fn handle(&self) -> Result<()> {
        let bytes = fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", self.file.display()))?;
        let original = decode_text(&bytes).context(format!("parsing {}", self.file.display()))?;
        let file = InputFile::parse(&original).context(format!("parsing {}", self.file.display()))?;
        let formatted = file.to_string();

        if !self.check {
            info!("writing {}", self.file.display());
            return file
                .write(&self.file)
                .context(format!("writing {}", self.file.display()));
        }

        match changes(&original, &formatted) {
            Some(diff) => {
                println!("{} {}", "---".red(), self.file.display());
                println!("{} {} (formatted)", "+++".green(), self.file.display());
                print!("{diff}");
                Err(miette!("{} is not formatted", self.file.display()))
            }
            None => {
                info!("{} is already formatted", self.file.display());
                Ok(())
            }
        }
    }
}
