//! CLI tool for wheel metadata rewriting.

mod commands;
mod exit_codes;
mod output;

use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Add extra core metadata fields to built wheels
#[derive(Parser)]
#[command(name = "wheelext")]
#[command(author, version, about = "Add extra core metadata fields to built wheels", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a wheel's METADATA in place (alias: p)
    #[command(alias = "p")]
    Patch {
        /// Wheel file to rewrite
        wheel: PathBuf,

        /// pyproject.toml holding a [tool.setuptools-ext] table
        #[arg(long)]
        pyproject: Option<PathBuf>,

        /// Additional field, e.g. --field requires-external=libpng (repeatable)
        #[arg(long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },

    /// Print a wheel's METADATA (alias: s)
    #[command(alias = "s")]
    Show {
        /// Wheel file to inspect
        wheel: PathBuf,
    },

    /// Check RECORD against the wheel's members (alias: t)
    #[command(alias = "t")]
    Verify {
        /// Wheel file to verify
        wheel: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let exit_code = match cli.command {
        Commands::Patch {
            wheel,
            pyproject,
            fields,
        } => commands::patch(&commands::PatchConfig {
            wheel_path: &wheel,
            pyproject: pyproject.as_deref(),
            fields: &fields,
            format: cli.format,
        }),

        Commands::Show { wheel } => commands::show(&wheel, cli.format),

        Commands::Verify { wheel } => commands::verify(&wheel, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
