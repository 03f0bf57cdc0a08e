use clap::Parser;
use tracing::Level;

mod cli;
mod commands;
mod config;
mod shell;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    // Logs go to stderr so `--format json` output stays parseable.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    commands::run_command(cli)
}
