pub mod input;
pub mod outb;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle binary output files
    Outb {
        #[command(subcommand)]
        command: outb::OutbCommands,
    },
    /// Handle text input files
    Input {
        #[command(subcommand)]
        command: input::InputCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Outb { command } => command.handle(),
            Commands::Input { command } => command.handle(),
        }
    }
}
