use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use crosslink_core::RunConfig;
use tracing_subscriber::EnvFilter;

/// Rewrite intra-repository module requirements to local path replace
/// directives.
#[derive(Debug, Parser)]
#[command(name = "crosslink", version)]
struct Cli {
    /// Repository root to scan (default: enclosing git repository root).
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Overwrite replace directives that point at a different location.
    #[arg(long)]
    overwrite: bool,

    /// Remove replace directives that are no longer required.
    #[arg(long)]
    prune: bool,

    /// Module names exempt from insert, overwrite, and prune
    /// (comma-separated, repeatable).
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Emit an informational log line for every reconciliation decision.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1,
        action = clap::ArgAction::Set
    )]
    verbose: bool,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rc = RunConfig {
        root_path: cli.root,
        excluded: cli.exclude.into_iter().collect(),
        overwrite: cli.overwrite,
        prune: cli.prune,
        verbose: cli.verbose,
    };
    crosslink_core::crosslink(&rc)
}

/// `RUST_LOG` wins when set; otherwise the filter level follows the
/// `--verbose` flag.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
