use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `cbind` binary.
#[derive(Debug, Parser)]
#[command(name = "cbind", version, about = "cbind - Rust FFI declarations from C headers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no diagnostics)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra config file, layered above `cbind.toml`
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Define a macro before parsing, as NAME or NAME=VALUE (repeatable)
    #[arg(short = 'D', long = "define", global = true)]
    pub defines: Vec<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            config: self.config.clone(),
            defines: self.defines.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::root_commands::NamingArg;
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "cbind",
            "--format",
            "json",
            "--verbose",
            "-D",
            "FEATURE",
            "dump",
            "api.h",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert_eq!(cli.defines, vec!["FEATURE"]);
        assert!(matches!(cli.command, Commands::Dump(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cbind",
            "translate",
            "api.h",
            "--quiet",
            "-D",
            "LEVEL=3",
            "--define",
            "DEBUG",
        ])
        .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.defines, vec!["LEVEL=3", "DEBUG"]);
        let Commands::Translate(args) = cli.command else {
            panic!("expected translate");
        };
        assert_eq!(args.input.to_str(), Some("api.h"));
        assert!(args.output.is_none());
    }

    #[test]
    fn translate_options_parse() {
        let cli = Cli::try_parse_from([
            "cbind",
            "translate",
            "api.h",
            "-o",
            "api.rs",
            "--strict",
            "--naming",
            "location",
            "--no-macros",
        ])
        .expect("cli should parse");

        let Commands::Translate(args) = cli.command else {
            panic!("expected translate");
        };
        assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("api.rs"));
        assert!(args.strict);
        assert_eq!(args.naming, Some(NamingArg::Location));
        assert!(args.no_macros);
        assert!(!args.no_docs);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["cbind", "--format", "xml", "config"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["cbind", "--config", "/tmp/cbind.toml", "config"])
            .expect("cli should parse");
        let flags = cli.global_flags();
        assert_eq!(
            flags.config.as_deref().and_then(|p| p.to_str()),
            Some("/tmp/cbind.toml")
        );
    }
}
