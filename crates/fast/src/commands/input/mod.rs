pub mod check;
pub mod fmt;
pub mod tables;

#[derive(clap::Subcommand)]
pub enum InputCommands {
    /// Parse input files and report warnings and rejections
    Check(check::CheckArgs),
    /// List the tables found in an input file
    Tables(tables::TablesArgs),
    /// Write an input file in canonical form
    Fmt(fmt::FmtArgs),
}

impl InputCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            InputCommands::Check(check) => check.handle(),
            InputCommands::Tables(tables) => tables.handle(),
            InputCommands::Fmt(fmt) => fmt.handle(),
        }
    }
}
