mod commands;
mod preset;

use anyhow::{Context, Result};
use chunkwise_core::{Language, SizeWindow};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Chunkwise — split source files into size-bounded, syntax-aligned chunks.
#[derive(Parser, Debug)]
#[command(name = "chunkwise", version, about)]
pub struct Cli {
    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (default: auto-detect)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Auto,
    Json,
    Jsonl,
    Human,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a file into chunks
    Chunk {
        /// File to chunk
        file: PathBuf,

        /// Source language (default: detect from extension)
        #[arg(long)]
        language: Option<Language>,

        /// Size preset: small, medium, large
        #[arg(long, value_enum)]
        preset: Option<preset::Preset>,

        /// Minimum chunk size in bytes (overrides preset)
        #[arg(long)]
        min_size: Option<usize>,

        /// Maximum chunk size in bytes (overrides preset)
        #[arg(long)]
        max_size: Option<usize>,

        /// Ignore syntax and split on line/whitespace boundaries only
        #[arg(long)]
        plain: bool,
    },

    /// Print machine-readable tool capabilities
    Describe,
}

impl Cli {
    /// Determine the effective output format.
    pub fn effective_format(&self) -> OutputFormat {
        match self.format {
            OutputFormat::Auto => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Human
                } else {
                    OutputFormat::Jsonl
                }
            }
            ref f => f.clone(),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Resolve the preset: explicit flag, then `CHUNKWISE_PRESET`, then medium.
    pub fn resolve_preset(&self, preset: Option<preset::Preset>) -> Result<preset::Preset> {
        if let Some(preset) = preset {
            return Ok(preset);
        }
        match std::env::var("CHUNKWISE_PRESET") {
            Ok(name) => preset::Preset::from_str(&name, true)
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("invalid CHUNKWISE_PRESET value: {name}")),
            Err(_) => Ok(preset::Preset::Medium),
        }
    }

    /// Build the size window from preset defaults and explicit overrides.
    pub fn size_window(
        &self,
        preset: Option<preset::Preset>,
        min_size: Option<usize>,
        max_size: Option<usize>,
    ) -> Result<SizeWindow> {
        let preset = self.resolve_preset(preset)?;
        let min = min_size.unwrap_or_else(|| preset.default_min_size());
        let max = max_size.unwrap_or_else(|| preset.default_max_size());
        Ok(SizeWindow::new(min, max)?)
    }
}

fn init_logging(cli: &Cli) {
    let default = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Some(Command::Chunk {
            ref file,
            language,
            preset,
            min_size,
            max_size,
            plain,
        }) => {
            let window = cli.size_window(preset, min_size, max_size)?;
            commands::chunk::run(&cli, file, language, window, plain)?;
        }
        Some(Command::Describe) => {
            commands::describe::run(&cli)?;
        }
        None => {
            // No subcommand: print version info
            if !cli.is_quiet() {
                println!("chunkwise v{}", env!("CARGO_PKG_VERSION"));
                println!("Run 'chunkwise --help' for usage information.");
            }
        }
    }

    Ok(())
}
