//! tyshape: flatten TypeScript type declarations into plain JSON shapes.
//!
//! Set the `TYSHAPE_LOG` environment variable to enable tracing:
//!
//! ```bash
//! TYSHAPE_LOG=debug tyshape convert api.d.ts
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tyshape_core::OutputShape;

mod config;
mod demo;
mod diagnostic;

use config::TyshapeConfig;
use diagnostic::report_parse_errors;

#[derive(Parser, Debug)]
#[command(
    name = "tyshape",
    version,
    about = "Flatten TypeScript type declarations into plain JSON shapes"
)]
struct Cli {
    /// Enable debug logging (overrides TYSHAPE_LOG)
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to a tyshape.toml (default: ./tyshape.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert declarations and print the shape as JSON
    Convert {
        /// Source file, or `-` for stdin
        #[arg(default_value = "-")]
        file: String,
        /// Write the JSON to this path instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Report parse errors without converting
    Check {
        /// Source file to check
        file: String,
    },
    /// Convert the built-in sample declarations
    Demo {
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
}

fn init_tracing(debug: bool, config: &TyshapeConfig) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TYSHAPE_LOG").unwrap_or_else(|_| EnvFilter::new(config.log.level()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = TyshapeConfig::load(cli.config.as_deref())?;
    init_tracing(cli.debug, &config);
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Convert { file, out, compact } => {
            run_convert(&file, out.as_deref(), !compact && config.output.pretty())
        }
        Command::Check { file } => run_check(&file),
        Command::Demo { compact } => {
            let mut stdout = StandardStream::stdout(ColorChoice::Auto);
            demo::run(&mut stdout, !compact && config.output.pretty())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Serialize a shape as JSON.
pub(crate) fn render(shape: &OutputShape, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(shape)
    } else {
        serde_json::to_string(shape)
    }
}

/// Read `file`, or stdin for `-`. Returns a display name and the contents.
fn read_source(file: &str) -> Result<(String, String)> {
    if file == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        return Ok(("<stdin>".to_string(), source));
    }
    let source = fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    Ok((file.to_string(), source))
}

fn run_convert(file: &str, out: Option<&Path>, pretty: bool) -> Result<ExitCode> {
    let (name, source) = read_source(file)?;
    info!(file = %name, bytes = source.len(), "converting");

    let conversion = tyshape_core::convert_with_diagnostics(&source);
    report_parse_errors(&name, &source, &conversion.errors);

    let json = render(&conversion.shape, pretty)?;
    match out {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote shape");
        }
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(file: &str) -> Result<ExitCode> {
    let (name, source) = read_source(file)?;
    let parsed = tyshape_syntax::parse(&source);
    if parsed.has_errors() {
        report_parse_errors(&name, &source, &parsed.errors);
        eprintln!("{name}: {} parse error(s)", parsed.errors.len());
        return Ok(ExitCode::FAILURE);
    }
    println!("{name}: ok ({} statements)", parsed.file.statements.len());
    Ok(ExitCode::SUCCESS)
}
