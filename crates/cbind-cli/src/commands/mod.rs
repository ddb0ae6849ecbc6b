pub mod config;
pub mod dump;
pub mod shared;
pub mod translate;

use crate::cli::{Commands, GlobalFlags};

/// Route a parsed command to its handler.
pub fn dispatch(command: &Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Translate(args) => translate::handle(args, flags),
        Commands::Dump(args) => dump::handle(args, flags),
        Commands::Config(args) => config::handle(args, flags),
    }
}
