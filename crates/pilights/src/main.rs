//! pilights — play timed LED patterns on Raspberry Pi GPIO pins.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "pilights",
    version,
    about = "Play timed LED patterns on Raspberry Pi GPIO pins"
)]
struct Args {
    /// Output as JSON (for pins, config and dry-run summaries)
    #[arg(long, global = true)]
    json: bool,

    /// Echo every pin write and enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Play against an in-memory driver: no hardware, no waiting
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let opts = cli::Options {
        json: args.json,
        verbose: args.verbose,
        dry_run: args.dry_run,
        config: args.config,
    };

    if let Err(e) = cli::run(args.command, &opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
