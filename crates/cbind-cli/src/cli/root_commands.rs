use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use cbind_translate::AnonymousNaming;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Translate a C header into Rust FFI declarations.
    Translate(TranslateArgs),
    /// Print the parsed cursor tree of a C header.
    Dump(DumpArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

/// Anonymous naming scheme as a command-line value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum NamingArg {
    Counter,
    Location,
}

impl From<NamingArg> for AnonymousNaming {
    fn from(value: NamingArg) -> Self {
        match value {
            NamingArg::Counter => Self::Counter,
            NamingArg::Location => Self::Location,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct TranslateArgs {
    /// Header to translate (`.h` or `.c`).
    pub input: PathBuf,

    /// Write the Rust source here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail when any declaration degraded during translation.
    #[arg(long)]
    pub strict: bool,

    /// How anonymous declarations are named.
    #[arg(long, value_enum)]
    pub naming: Option<NamingArg>,

    /// Skip `#define` constants.
    #[arg(long)]
    pub no_macros: bool,

    /// Skip doc comments.
    #[arg(long)]
    pub no_docs: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DumpArgs {
    /// Header to parse (`.h` or `.c`).
    pub input: PathBuf,

    /// Stop descending below this depth (text format only).
    #[arg(long)]
    pub depth: Option<usize>,
}

#[derive(Clone, Debug, Args)]
pub struct ConfigArgs {
    /// Show which config files are consulted instead of the values.
    #[arg(long)]
    pub paths: bool,
}
