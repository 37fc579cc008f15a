use std::path::{Path, PathBuf};

use clap::Args;
use fast_input::InputFile;
use miette::{miette, Context, Result};
use owo_colors::OwoColorize;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Args)]
pub struct CheckArgs {
    /// An input file, or a directory searched for `.dat` and `.fst` files
    #[arg(value_name = "FILE|DIR")]
    path: PathBuf,
}

fn is_input_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dat") || e.eq_ignore_ascii_case("fst"))
}

/// Input files below `dir`, sorted
fn input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir() && is_input_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

impl CheckArgs {
    pub fn handle(&self) -> Result<()> {
        if !self.path.is_dir() {
            let file = InputFile::read(&self.path)
                .context(format!("parsing {}", self.path.display()))?;
            report(&self.path, &file);
            return Ok(());
        }

        let files = input_files(&self.path);
        if files.is_empty() {
            return Err(miette!("no input files found in {}", self.path.display()));
        }

        let mut rejected = 0;
        for path in &files {
            debug!("checking {}", path.display());
            match InputFile::read(path) {
                Ok(file) => report(path, &file),
                Err(e) => {
                    rejected += 1;
                    println!("❌ {}: {}", path.display(), e.red());
                }
            }
        }

        info!("{} files checked, {rejected} rejected", files.len());
        if rejected > 0 {
            return Err(miette!("{rejected} of {} files could not be parsed", files.len()));
        }
        Ok(())
    }
}

fn report(path: &Path, file: &InputFile) {
    println!("✅ {} ({} entries)", path.display(), file.entries().len());
    for warning in file.warnings() {
        println!("  ⚠ {}", warning.yellow());
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::{input_files, is_input_file};

    #[test]
    fn dat_and_fst_only() {
        assert!(is_input_file(Path::new("5MW/ElastoDyn.dat")));
        assert!(is_input_file(Path::new("5MW/Main.FST")));
        assert!(!is_input_file(Path::new("5MW/Main.outb")));
        assert!(!is_input_file(Path::new("5MW/README")));
    }

    #[test]
    fn resources_are_found() {
        let dir = PathBuf::from(format!("{}/../fast_input/resources", env!("CARGO_MANIFEST_DIR")));
        let names: Vec<String> = input_files(&dir)
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "AeroDyn_blade.dat");
    }
}
