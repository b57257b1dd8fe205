use clap::Parser;
use mordm::{Command, default_data_dir, init_logging, run};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mordm")]
#[command(about = "Sampling, sensitivity analysis and robustness checks for many-objective problems")]
struct Args {
    /// Path to the data directory holding the log file (default: ~/.mordm/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Log to stderr instead of the data directory
    #[arg(long, global = true)]
    log_stderr: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level, args.log_stderr)?;
    tracing::debug!(command = ?args.command, "starting");

    let output = run(&args.command, args.json)?;
    print!("{output}");

    tracing::info!("done");
    Ok(())
}
